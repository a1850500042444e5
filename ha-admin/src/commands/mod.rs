//! CLI command implementations

pub mod client;
pub mod options;
mod promote;
mod query;
mod ready;
mod replicate;
mod set;

pub use promote::Promote;
pub use query::Query;
pub use ready::{Ready, ReadinessPoller};
pub use replicate::Replicate;
pub use set::Set;

use crate::clock::Clock;
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use client::{HaBroker, ManagementClient, Session};
use ha_common::HaBrokerState;
use options::{Invocation, OptionSpec};
use std::io::Write;
use tracing::{debug, warn};

/// Successful result of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The broker is a backup that has not caught up yet
    NotReady,
}

/// Everything a command body works with once the HA object has been located
pub struct HaContext<'a> {
    /// Handle used for re-fetching state and invoking methods
    pub broker: HaBroker<'a>,
    /// Snapshot fetched when the session was opened
    pub state: HaBrokerState,
    pub clock: &'a dyn Clock,
    pub out: &'a mut (dyn Write + Send),
}

/// A named subcommand
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    /// Help text; the first line doubles as the one-line summary
    fn help(&self) -> &'static str;

    /// Names of the positional arguments, which also fixes their number
    fn arg_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Command specific options; the connection options are added for every command
    fn options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    async fn execute(&self, ctx: &mut HaContext<'_>, invocation: &Invocation) -> Result<Outcome>;

    fn summary(&self) -> &'static str {
        self.help().lines().next().unwrap_or_default()
    }
}

/// Collaborators shared by every command run
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    pub client: &'a dyn ManagementClient,
    pub clock: &'a dyn Clock,
}

/// Run a command against the broker named in its options.
///
/// The session is closed once the command finishes, whatever the result.
pub async fn run_command(
    command: &dyn Command,
    env: Environment<'_>,
    invocation: &Invocation,
    out: &mut (dyn Write + Send),
) -> Result<Outcome> {
    if invocation.positional().len() != command.arg_names().len() {
        return Err(AdminError::usage("Wrong number of arguments", None));
    }

    let options = invocation.connect_options();
    debug!(command = command.name(), broker = %options.broker, "connecting");
    let mut session = env.client.connect(&options).await?;

    let result = execute(
        command,
        session.as_mut(),
        &options.broker,
        env.clock,
        invocation,
        out,
    )
    .await;

    if let Err(e) = session.close().await {
        warn!(broker = %options.broker, error = %e, "failed to close management session");
    }
    result
}

async fn execute(
    command: &dyn Command,
    session: &mut dyn Session,
    address: &str,
    clock: &dyn Clock,
    invocation: &Invocation,
    out: &mut (dyn Write + Send),
) -> Result<Outcome> {
    let mut broker = HaBroker::new(session, address);
    let state = broker.fetch().await?;
    debug!(broker = address, status = %state.status, "located HA broker object");

    let mut ctx = HaContext {
        broker,
        state,
        clock,
        out,
    };
    command.execute(&mut ctx, invocation).await
}

/// Table of the commands the tool understands
#[derive(Default)]
pub struct Registry {
    commands: Vec<Box<dyn Command>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in commands, in help order
    pub fn builtin() -> Self {
        Self {
            commands: vec![
                Box::new(Promote),
                Box::new(Ready),
                Box::new(Replicate),
                Box::new(Set),
                Box::new(Query),
            ],
        }
    }

    /// Add a command. A name that is already taken is rejected and the registry is unchanged.
    pub fn register(&mut self, command: Box<dyn Command>) -> Result<()> {
        if self.lookup(command.name()).is_some() {
            return Err(AdminError::DuplicateCommand(command.name().to_string()));
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .map(|command| command.as_ref())
    }

    /// Commands in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> + '_ {
        self.commands.iter().map(|command| command.as_ref())
    }
}
