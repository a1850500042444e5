//! Start replicating a queue from a remote broker

use super::options::Invocation;
use super::{Command, HaContext, Outcome};
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use ha_common::{methods, Arguments};
use serde_json::Value;
use tracing::info;

/// Replicate a queue from a remote broker
pub struct Replicate;

#[async_trait]
impl Command for Replicate {
    fn name(&self) -> &'static str {
        "replicate"
    }

    fn help(&self) -> &'static str {
        "Set up replication from <queue> on <remote-broker> to <queue> on the current broker."
    }

    fn arg_names(&self) -> &'static [&'static str] {
        &["queue", "remote-broker"]
    }

    async fn execute(&self, ctx: &mut HaContext<'_>, invocation: &Invocation) -> Result<Outcome> {
        let [queue, remote] = invocation.positional() else {
            return Err(AdminError::usage("Wrong number of arguments", None));
        };

        info!(broker = ctx.broker.address(), queue = %queue, remote = %remote, "requesting queue replication");
        let mut args = Arguments::new();
        args.insert("broker".to_string(), Value::String(remote.clone()));
        args.insert("queue".to_string(), Value::String(queue.clone()));
        ctx.broker.invoke(methods::REPLICATE, args).await?;
        Ok(Outcome::Success)
    }
}
