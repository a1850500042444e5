//! Command-line dispatch: find the command, parse its options, run it and
//! turn the result into an exit status.

use crate::commands::options::{self, Parsed};
use crate::commands::{run_command, Command, Environment, Outcome, Registry};
use crate::config::ConnectionConfig;
use crate::error::{AdminError, ErrorKind, Result};
use std::io::Write;
use tracing::{debug, info};

/// Flag printing the help of every command
pub const HELP_ALL: &str = "--help-all";

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

pub struct Dispatcher<'a> {
    program: String,
    registry: &'a Registry,
    env: Environment<'a>,
    defaults: &'a ConnectionConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        program: impl Into<String>,
        registry: &'a Registry,
        env: Environment<'a>,
        defaults: &'a ConnectionConfig,
    ) -> Self {
        Self {
            program: program.into(),
            registry,
            env,
            defaults,
        }
    }

    /// One line per registered command
    pub fn usage(&self) -> String {
        let width = self
            .registry
            .iter()
            .map(|command| command.name().len())
            .max()
            .unwrap_or_default();

        let mut usage = format!(
            "usage: {} <command> [<arguments>]\n\nCommands are:\n\n",
            self.program
        );
        for command in self.registry.iter() {
            usage.push_str(&format!(
                "  {:<width$}  {}\n",
                command.name(),
                command.summary(),
                width = width
            ));
        }
        usage.push_str(&format!(
            "\nFor help with a command type: {} <command> --help\n",
            self.program
        ));
        usage
    }

    /// Full help of every registered command
    pub fn help_all(&self) -> String {
        let mut help = String::new();
        for command in self.registry.iter() {
            let text = self.help(command);
            help.push_str(&format!("== {} ==\n\n{}\n", command.name(), text.trim_end()));
        }
        help
    }

    fn help(&self, command: &dyn Command) -> String {
        options::parser(command, &self.program, self.defaults)
            .render_help()
            .to_string()
    }

    /// Find and run the command named in `args` (program name excluded).
    ///
    /// The first argument matching a registered command name selects it, wherever
    /// it appears; every other argument is parsed by that command.
    pub async fn dispatch(
        &self,
        args: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<Outcome> {
        if args.iter().any(|arg| arg == HELP_ALL) {
            out.write_all(self.help_all().as_bytes())?;
            return Ok(Outcome::Success);
        }

        let found = args
            .iter()
            .enumerate()
            .find_map(|(position, arg)| self.registry.lookup(arg).map(|c| (position, c)));
        let Some((position, command)) = found else {
            if wants_help(args) {
                out.write_all(self.usage().as_bytes())?;
                return Ok(Outcome::Success);
            }
            let message = if args.is_empty() {
                "No command given"
            } else {
                "No valid command given"
            };
            return Err(AdminError::usage(message, Some(self.usage())));
        };

        let rest: Vec<String> = args[..position]
            .iter()
            .chain(&args[position + 1..])
            .cloned()
            .collect();
        debug!(command = command.name(), args = ?rest, "dispatching");

        let invocation = match options::parse(command, &self.program, self.defaults, &rest)? {
            Parsed::Help(text) => {
                out.write_all(text.as_bytes())?;
                return Ok(Outcome::Success);
            }
            Parsed::Run(invocation) => invocation,
        };

        run_command(command, self.env, &invocation, out)
            .await
            .map_err(|e| match e {
                AdminError::Usage {
                    message,
                    usage: None,
                } => AdminError::Usage {
                    message,
                    usage: Some(self.help(command)),
                },
                e => e,
            })
    }

    /// Dispatch, report any failure on `err` and return the process exit status
    pub async fn run(
        &self,
        args: &[String],
        out: &mut (dyn Write + Send),
        err: &mut dyn Write,
    ) -> u8 {
        let result = self.dispatch(args, out).await;
        report(&result, err);
        exit_code(&result)
    }
}

/// Whether `args` ask for help, which renders without a configuration file
pub fn wants_help(args: &[String]) -> bool {
    args.iter()
        .any(|arg| arg == HELP_ALL || arg == "-h" || arg == "--help")
}

fn report(result: &Result<Outcome>, err: &mut dyn Write) {
    // Nothing sensible is left to do if stderr itself fails.
    let _ = match result {
        Ok(Outcome::Success) => Ok(()),
        Ok(Outcome::NotReady) => {
            info!("broker is not ready");
            Ok(())
        }
        Err(AdminError::Usage {
            message,
            usage: Some(usage),
        }) => writeln!(err, "{}\n{}", usage.trim_end(), message),
        Err(e) => writeln!(err, "{}", e),
    };
}

/// Exit status for a command result
pub fn exit_code(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Success) => EXIT_SUCCESS,
        Ok(Outcome::NotReady) => EXIT_FAILURE,
        Err(e) => match e.kind() {
            ErrorKind::Usage
            | ErrorKind::Capability
            | ErrorKind::State
            | ErrorKind::Transport
            | ErrorKind::Config => EXIT_FAILURE,
        },
    }
}
