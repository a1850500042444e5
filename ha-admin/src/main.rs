//! HA broker administration CLI

use anyhow::{anyhow, Context, Result};
use ha_admin::clock::TokioClock;
use ha_admin::commands::client::TcpManagementClient;
use ha_admin::commands::{Environment, Registry};
use ha_admin::config::Config;
use ha_admin::dispatch::{wants_help, Dispatcher};
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Load configuration, falling back to the defaults when only help is requested
fn load_config(args: &[String]) -> Result<(Config, Option<anyhow::Error>)> {
    match Config::discover().context("loading configuration") {
        Ok(config) => Ok((config, None)),
        Err(e) if wants_help(args) => Ok((Config::default(), Some(e))),
        Err(e) => Err(e),
    }
}

/// Install the log subscriber
fn init_logging(config: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.logging.level)
            .with_context(|| format!("invalid log level '{}'", config.logging.level))?,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn setup(args: &[String]) -> Result<Config> {
    let (config, ignored) = load_config(args)?;
    init_logging(&config)?;
    if let Some(e) = ignored {
        warn!("showing help with default settings: {:#}", e);
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut args = std::env::args();
    let program = args
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or("ha-admin")
        .to_string();
    let args: Vec<String> = args.collect();

    let config = match setup(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = Registry::builtin();
    let client = TcpManagementClient;
    let clock = TokioClock;
    let env = Environment {
        client: &client,
        clock: &clock,
    };
    let dispatcher = Dispatcher::new(program, &registry, env, &config.connection);

    let code = dispatcher
        .run(&args, &mut std::io::stdout(), &mut std::io::stderr())
        .await;
    ExitCode::from(code)
}
