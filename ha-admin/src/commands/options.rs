//! Option schemas and parsed invocations

use super::client::ConnectOptions;
use super::Command;
use crate::config::ConnectionConfig;
use crate::error::{AdminError, Result};
use clap::{error::ErrorKind as ClapErrorKind, Arg, ArgAction};
use ha_common::DEFAULT_BROKER;
use std::collections::BTreeMap;
use std::time::Duration;

/// Target broker, common to every command
pub const BROKER: &str = "broker";
/// Connect and request timeout in seconds, common to every command
pub const TIMEOUT: &str = "timeout";
/// SASL mechanism, common to every command
pub const SASL_MECHANISM: &str = "sasl-mechanism";

const POSITIONAL: &str = "positional-args";

/// Largest value an integer option accepts; counts and seconds travel as 32-bit values
pub const INTEGER_MAX: u64 = u32::MAX as u64;

/// Type tag of an option's value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Flag,
}

/// One named option in a command's schema
#[derive(Clone, Debug)]
pub struct OptionSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub kind: OptionKind,
    pub value_name: &'static str,
    pub default: Option<String>,
    pub help: &'static str,
}

impl OptionSpec {
    fn new(name: &'static str, kind: OptionKind, value_name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            short: None,
            kind,
            value_name,
            default: None,
            help,
        }
    }

    pub fn string(name: &'static str, value_name: &'static str, help: &'static str) -> Self {
        Self::new(name, OptionKind::String, value_name, help)
    }

    pub fn integer(name: &'static str, value_name: &'static str, help: &'static str) -> Self {
        Self::new(name, OptionKind::Integer, value_name, help)
    }

    pub fn flag(name: &'static str, help: &'static str) -> Self {
        Self::new(name, OptionKind::Flag, "", help)
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name).long(self.name).help(self.help);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        arg = match self.kind {
            OptionKind::String => arg
                .value_name(self.value_name)
                .value_parser(clap::value_parser!(String)),
            OptionKind::Integer => arg
                .value_name(self.value_name)
                .value_parser(clap::value_parser!(u64).range(..=INTEGER_MAX)),
            OptionKind::Flag => arg.action(ArgAction::SetTrue),
        };
        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }
        arg
    }
}

/// Connection options every command accepts, with defaults from configuration
pub fn common_options(defaults: &ConnectionConfig) -> Vec<OptionSpec> {
    let mut options = vec![
        OptionSpec::string(BROKER, "ADDRESS", "Connect to broker at <address>")
            .short('b')
            .default_value(defaults.broker.clone()),
        OptionSpec::integer(
            TIMEOUT,
            "SECONDS",
            "Give up on the broker after <seconds>, 0 waits indefinitely",
        )
        .default_value(defaults.timeout_secs.to_string()),
    ];
    let sasl = OptionSpec::string(
        SASL_MECHANISM,
        "MECHANISM",
        "SASL mechanism for authentication",
    );
    options.push(match &defaults.sasl_mechanism {
        Some(mechanism) => sasl.default_value(mechanism.clone()),
        None => sasl,
    });
    options
}

/// Typed value of a parsed option
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Integer(u64),
    Flag(bool),
}

/// A command's parsed options and positional arguments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    options: BTreeMap<String, OptionValue>,
    positional: Vec<String>,
}

impl Invocation {
    pub fn new(options: BTreeMap<String, OptionValue>, positional: Vec<String>) -> Self {
        Self {
            options,
            positional,
        }
    }

    pub fn with_option(mut self, name: &str, value: OptionValue) -> Self {
        self.options.insert(name.to_string(), value);
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positional = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<u64> {
        match self.options.get(name) {
            Some(OptionValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.options.get(name), Some(OptionValue::Flag(true)))
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Session parameters from the common options
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            broker: self.string(BROKER).unwrap_or(DEFAULT_BROKER).to_string(),
            timeout: self
                .integer(TIMEOUT)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            sasl_mechanism: self.string(SASL_MECHANISM).map(str::to_string),
        }
    }
}

/// Result of parsing a command line
#[derive(Debug)]
pub enum Parsed {
    Run(Invocation),
    /// `--help` was requested; carries the rendered help
    Help(String),
}

/// Usage line for a command, e.g. `ha-admin replicate [options] <queue> <remote-broker>`
pub fn usage_line(command: &dyn Command, program: &str) -> String {
    let mut usage = format!("{} {} [options]", program, command.name());
    for name in command.arg_names() {
        usage.push_str(&format!(" <{}>", name));
    }
    usage
}

/// Argument parser for a command's full schema
pub fn parser(command: &dyn Command, program: &str, defaults: &ConnectionConfig) -> clap::Command {
    let mut parser = clap::Command::new(command.name())
        .no_binary_name(true)
        .about(command.help())
        .override_usage(usage_line(command, program))
        .arg(
            Arg::new(POSITIONAL)
                .num_args(0..)
                .value_parser(clap::value_parser!(String))
                .hide(true),
        );
    for spec in command.options().iter().chain(&common_options(defaults)) {
        parser = parser.arg(spec.to_arg());
    }
    parser
}

/// Parse `args` (without program or command name) against a command's schema.
///
/// Arity is not checked here; that happens when the command runs.
pub fn parse(
    command: &dyn Command,
    program: &str,
    defaults: &ConnectionConfig,
    args: &[String],
) -> Result<Parsed> {
    let mut parser = parser(command, program, defaults);
    let matches = match parser.try_get_matches_from_mut(args) {
        Ok(matches) => matches,
        Err(e) if e.kind() == ClapErrorKind::DisplayHelp => {
            return Ok(Parsed::Help(e.render().to_string()));
        }
        Err(e) => {
            let rendered = e.render().to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string();
            return Err(AdminError::usage(
                message,
                Some(parser.render_usage().to_string()),
            ));
        }
    };

    let mut options = BTreeMap::new();
    for spec in command.options().iter().chain(&common_options(defaults)) {
        let value = match spec.kind {
            OptionKind::String => matches
                .get_one::<String>(spec.name)
                .map(|v| OptionValue::String(v.clone())),
            OptionKind::Integer => matches
                .get_one::<u64>(spec.name)
                .map(|v| OptionValue::Integer(*v)),
            OptionKind::Flag => matches
                .get_flag(spec.name)
                .then_some(OptionValue::Flag(true)),
        };
        if let Some(value) = value {
            options.insert(spec.name.to_string(), value);
        }
    }

    let positional = matches
        .get_many::<String>(POSITIONAL)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    Ok(Parsed::Run(Invocation::new(options, positional)))
}
