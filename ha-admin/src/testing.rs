//! Test doubles for the management client and the clock

use crate::clock::Clock;
use crate::commands::client::{ConnectOptions, ManagementClient, Session};
use crate::commands::options::Invocation;
use crate::commands::{run_command, Command, Environment, Outcome};
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use ha_common::{Arguments, HaBrokerState, HaStatus, ObjectRef};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What a [`FakeClient`] observed
#[derive(Clone, Debug, Default)]
pub struct Record {
    pub connects: Vec<ConnectOptions>,
    pub closes: usize,
    pub fetches: usize,
    pub calls: Vec<(String, Arguments)>,
}

struct FakeBroker {
    ha_loaded: bool,
    /// Status returned by each successive fetch; fetching past the end fails
    statuses: VecDeque<HaStatus>,
    template: HaBrokerState,
    failing_method: Option<String>,
    failing_close: bool,
    record: Record,
}

/// Management client backed by an in-memory broker
#[derive(Clone)]
pub struct FakeClient {
    broker: Arc<Mutex<FakeBroker>>,
}

impl FakeClient {
    fn from_broker(broker: FakeBroker) -> Self {
        Self {
            broker: Arc::new(Mutex::new(broker)),
        }
    }

    pub fn with_state(state: HaBrokerState) -> Self {
        Self::from_broker(FakeBroker {
            ha_loaded: true,
            statuses: VecDeque::from([state.status.clone()]),
            template: state,
            failing_method: None,
            failing_close: false,
            record: Record::default(),
        })
    }

    pub fn with_statuses<'a>(statuses: impl IntoIterator<Item = &'a str>) -> Self {
        let client = Self::with_state(HaBrokerState {
            status: HaStatus::Backup,
            brokers: String::new(),
            public_brokers: String::new(),
            expected_backups: 0,
        });
        client.lock().statuses = statuses.into_iter().map(HaStatus::from).collect();
        client
    }

    /// A broker without the HA module
    pub fn without_ha() -> Self {
        let client = Self::with_statuses(["backup"]);
        client.lock().ha_loaded = false;
        client
    }

    /// Make every invocation of `method` fail
    pub fn failing(self, method: &str) -> Self {
        self.lock().failing_method = Some(method.to_string());
        self
    }

    pub fn failing_close(self) -> Self {
        self.lock().failing_close = true;
        self
    }

    pub fn record(&self) -> Record {
        self.lock().record.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeBroker> {
        self.broker.lock().unwrap()
    }
}

#[async_trait]
impl ManagementClient for FakeClient {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Session>> {
        self.lock().record.connects.push(options.clone());
        Ok(Box::new(FakeSession {
            client: self.clone(),
        }))
    }
}

struct FakeSession {
    client: FakeClient,
}

#[async_trait]
impl Session for FakeSession {
    async fn get_object(&mut self, _object: &ObjectRef) -> Result<Option<serde_json::Value>> {
        let mut broker = self.client.lock();
        broker.record.fetches += 1;
        if !broker.ha_loaded {
            return Ok(None);
        }
        let status = broker.statuses.pop_front().ok_or(AdminError::Closed)?;
        let state = HaBrokerState {
            status,
            ..broker.template.clone()
        };
        Ok(Some(serde_json::to_value(state)?))
    }

    async fn invoke(
        &mut self,
        _object: &ObjectRef,
        method: &str,
        args: Arguments,
    ) -> Result<serde_json::Value> {
        let mut broker = self.client.lock();
        broker.record.calls.push((method.to_string(), args));
        if broker.failing_method.as_deref() == Some(method) {
            return Err(AdminError::Remote {
                method: method.to_string(),
                message: "rejected by fake broker".to_string(),
            });
        }
        Ok(serde_json::Value::Null)
    }

    async fn close(&mut self) -> Result<()> {
        let mut broker = self.client.lock();
        broker.record.closes += 1;
        if broker.failing_close {
            return Err(AdminError::Closed);
        }
        Ok(())
    }
}

/// Clock that advances only when slept on
pub struct FakeClock {
    origin: Instant,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.origin + self.sleeps.lock().unwrap().iter().sum::<Duration>()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Run `command` against the fakes, returning its result and everything it printed
pub async fn run(
    command: &dyn Command,
    client: &FakeClient,
    clock: &FakeClock,
    invocation: Invocation,
) -> (Result<Outcome>, String) {
    let env = Environment { client, clock };
    let mut out = Vec::new();
    let result = run_command(command, env, &invocation, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}
