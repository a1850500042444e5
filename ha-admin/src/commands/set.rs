//! Change HA configuration settings

use super::options::{Invocation, OptionSpec};
use super::{Command, HaContext, Outcome};
use crate::error::Result;
use async_trait::async_trait;
use ha_common::{methods, Arguments};
use serde_json::Value;
use tracing::info;

const BROKERS: &str = "brokers";
const PUBLIC_BROKERS: &str = "public-brokers";
const BACKUPS: &str = "backups";

/// Change HA configuration settings
pub struct Set;

#[async_trait]
impl Command for Set {
    fn name(&self) -> &'static str {
        "set"
    }

    fn help(&self) -> &'static str {
        "Set HA configuration settings."
    }

    fn options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::string(BROKERS, "URL", "HA brokers use this URL to connect to each other"),
            OptionSpec::string(PUBLIC_BROKERS, "URL", "Clients use this URL to connect to the cluster"),
            OptionSpec::integer(BACKUPS, "N", "Expect <n> backups to be running"),
        ]
    }

    async fn execute(&self, ctx: &mut HaContext<'_>, invocation: &Invocation) -> Result<Outcome> {
        let mut calls = Vec::new();
        if let Some(url) = invocation.string(BROKERS) {
            calls.push((methods::SET_BROKERS, "url", Value::from(url)));
        }
        if let Some(url) = invocation.string(PUBLIC_BROKERS) {
            calls.push((methods::SET_PUBLIC_BROKERS, "url", Value::from(url)));
        }
        if let Some(backups) = invocation.integer(BACKUPS) {
            calls.push((methods::SET_EXPECTED_BACKUPS, "expectedBackups", Value::from(backups)));
        }

        for (method, name, value) in calls {
            info!(broker = ctx.broker.address(), method, %value, "updating HA setting");
            let mut args = Arguments::new();
            args.insert(name.to_string(), value);
            ctx.broker.invoke(method, args).await?;
        }
        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::options::OptionValue;
    use crate::testing::{run, FakeClient, FakeClock};
    use serde_json::json;

    #[tokio::test]
    async fn test_only_supplied_settings_are_sent() {
        let client = FakeClient::with_statuses(["primary"]);
        let clock = FakeClock::new();
        let invocation = Invocation::default().with_option(BACKUPS, OptionValue::Integer(3));
        let (result, _) = run(&Set, &client, &clock, invocation).await;

        assert_eq!(result.unwrap(), Outcome::Success);
        let record = client.record();
        assert_eq!(record.calls.len(), 1);
        let (method, args) = &record.calls[0];
        assert_eq!(method, "setExpectedBackups");
        assert_eq!(Value::Object(args.clone()), json!({ "expectedBackups": 3 }));
    }

    #[tokio::test]
    async fn test_all_settings_in_order() {
        let client = FakeClient::with_statuses(["primary"]);
        let clock = FakeClock::new();
        let invocation = Invocation::default()
            .with_option(PUBLIC_BROKERS, OptionValue::String("amqp:tcp:vip:5672".into()))
            .with_option(BACKUPS, OptionValue::Integer(2))
            .with_option(BROKERS, OptionValue::String("amqp:tcp:n1,tcp:n2".into()));
        let (result, _) = run(&Set, &client, &clock, invocation).await;

        assert_eq!(result.unwrap(), Outcome::Success);
        let record = client.record();
        let names: Vec<_> = record.calls.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(names, ["setBrokers", "setPublicBrokers", "setExpectedBackups"]);
        assert_eq!(Value::Object(record.calls[0].1.clone()), json!({ "url": "amqp:tcp:n1,tcp:n2" }));
        assert_eq!(Value::Object(record.calls[1].1.clone()), json!({ "url": "amqp:tcp:vip:5672" }));
    }

    #[tokio::test]
    async fn test_nothing_supplied_is_noop() {
        let client = FakeClient::with_statuses(["backup"]);
        let clock = FakeClock::new();
        let (result, _) = run(&Set, &client, &clock, Invocation::default()).await;

        assert_eq!(result.unwrap(), Outcome::Success);
        let record = client.record();
        assert!(record.calls.is_empty());
        assert_eq!(record.closes, 1);
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_settings() {
        let client = FakeClient::with_statuses(["primary"]).failing(methods::SET_BROKERS);
        let clock = FakeClock::new();
        let invocation = Invocation::default()
            .with_option(BROKERS, OptionValue::String("amqp:tcp:n1".into()))
            .with_option(BACKUPS, OptionValue::Integer(1));
        let (result, _) = run(&Set, &client, &clock, invocation).await;

        assert!(result.is_err());
        assert_eq!(client.record().calls.len(), 1);
    }
}
