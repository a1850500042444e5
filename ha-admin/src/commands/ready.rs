//! Readiness check and the status poller behind `ready --wait`

use super::client::HaBroker;
use super::options::{Invocation, OptionSpec};
use super::{Command, HaContext, Outcome};
use crate::clock::Clock;
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use ha_common::{HaBrokerState, HaStatus};
use std::time::Duration;
use tracing::debug;

const WAIT: &str = "wait";

/// First delay between status checks
const INITIAL_DELAY: Duration = Duration::from_millis(100);
/// Delays double after every check up to this cap
const MAX_DELAY: Duration = Duration::from_secs(1);

/// Check whether a backup broker is ready, optionally waiting for it
pub struct Ready;

#[async_trait]
impl Command for Ready {
    fn name(&self) -> &'static str {
        "ready"
    }

    fn help(&self) -> &'static str {
        "Test if a backup broker is ready.\nReturn 0 if broker is a ready backup, non-0 otherwise."
    }

    fn options(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::integer(
            WAIT,
            "SECONDS",
            "Wait up to <seconds> for broker to be ready. 0 means wait forever.",
        )]
    }

    async fn execute(&self, ctx: &mut HaContext<'_>, invocation: &Invocation) -> Result<Outcome> {
        ReadinessPoller::new(ctx.clock)
            .check(&mut ctx.broker, &ctx.state, invocation.integer(WAIT))
            .await
    }
}

/// Polls a broker's HA status until it reports `backup`.
///
/// The deadline is only checked before each sleep, so a wait can overrun it by
/// at most one delay.
pub struct ReadinessPoller<'a> {
    clock: &'a dyn Clock,
}

impl<'a> ReadinessPoller<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// Classify `state`, polling for up to `wait_secs` (0 is unbounded) while the
    /// broker is catching up.
    pub async fn check(
        &self,
        broker: &mut HaBroker<'_>,
        state: &HaBrokerState,
        wait_secs: Option<u64>,
    ) -> Result<Outcome> {
        match &state.status {
            HaStatus::Backup => return Ok(Outcome::Success),
            HaStatus::CatchUp => {}
            other => {
                return Err(AdminError::UnexpectedState {
                    status: other.clone(),
                })
            }
        }

        match wait_secs {
            None => Ok(Outcome::NotReady),
            Some(secs) => self.poll(broker, secs).await,
        }
    }

    async fn poll(&self, broker: &mut HaBroker<'_>, wait_secs: u64) -> Result<Outcome> {
        // No deadline means wait forever.
        let deadline = match wait_secs {
            0 => None,
            secs => Some(
                self.clock
                    .now()
                    .checked_add(Duration::from_secs(secs))
                    .ok_or_else(|| {
                        AdminError::usage(format!("Wait of {} seconds is too long", secs), None)
                    })?,
            ),
        };
        let mut delay = INITIAL_DELAY;

        while deadline.map_or(true, |deadline| self.clock.now() < deadline) {
            self.clock.sleep(delay).await;
            delay = (delay * 2).min(MAX_DELAY);

            let state = broker.fetch().await?;
            debug!(broker = broker.address(), status = %state.status, "polled HA status");
            if state.status == HaStatus::Backup {
                return Ok(Outcome::Success);
            }
        }

        debug!(broker = broker.address(), wait_secs, "broker did not become ready in time");
        Ok(Outcome::NotReady)
    }
}
