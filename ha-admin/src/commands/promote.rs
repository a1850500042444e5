//! Promote a backup broker to primary

use super::options::Invocation;
use super::{Command, HaContext, Outcome};
use crate::error::Result;
use async_trait::async_trait;
use ha_common::{methods, Arguments};
use tracing::info;

/// Promote a backup broker to primary
pub struct Promote;

#[async_trait]
impl Command for Promote {
    fn name(&self) -> &'static str {
        "promote"
    }

    fn help(&self) -> &'static str {
        "Promote broker from backup to primary."
    }

    async fn execute(&self, ctx: &mut HaContext<'_>, _invocation: &Invocation) -> Result<Outcome> {
        info!(broker = ctx.broker.address(), status = %ctx.state.status, "requesting promotion");
        ctx.broker.invoke(methods::PROMOTE, Arguments::new()).await?;
        Ok(Outcome::Success)
    }
}
