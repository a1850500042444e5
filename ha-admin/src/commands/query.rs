//! Print a broker's HA status

use super::options::Invocation;
use super::{Command, HaContext, Outcome};
use crate::error::Result;
use async_trait::async_trait;
use ha_common::HaBrokerState;
use std::io::Write;

/// Print HA configuration and status
pub struct Query;

#[async_trait]
impl Command for Query {
    fn name(&self) -> &'static str {
        "query"
    }

    fn help(&self) -> &'static str {
        "Print HA configuration settings."
    }

    async fn execute(&self, ctx: &mut HaContext<'_>, _invocation: &Invocation) -> Result<Outcome> {
        print_state(&ctx.state, &mut *ctx.out)?;
        Ok(Outcome::Success)
    }
}

fn print_state(state: &HaBrokerState, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{:<20} {}", "Status:", state.status)?;
    writeln!(out, "{:<20} {}", "Brokers URL:", state.brokers)?;
    writeln!(out, "{:<20} {}", "Public URL:", state.public_brokers)?;
    writeln!(out, "{:<20} {}", "Expected Backups:", state.expected_backups)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run, FakeClient, FakeClock};
    use ha_common::HaStatus;

    #[tokio::test]
    async fn test_query_prints_labeled_fields() {
        let client = FakeClient::with_state(HaBrokerState {
            status: HaStatus::Primary,
            brokers: "b-url".into(),
            public_brokers: "p-url".into(),
            expected_backups: 2,
        });
        let clock = FakeClock::new();
        let (result, out) = run(&Query, &client, &clock, Invocation::default()).await;

        assert_eq!(result.unwrap(), Outcome::Success);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "Status:              primary",
                "Brokers URL:         b-url",
                "Public URL:          p-url",
                "Expected Backups:    2",
            ]
        );
        let record = client.record();
        assert_eq!(record.fetches, 1);
        assert!(record.calls.is_empty());
    }
}
