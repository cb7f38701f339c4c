// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Declarative option schemas.
//
// Each engine lists the options it accepts as a static table of
// `OptionSpec`s. One generic clap command is built from that table, so CLI
// tokens and config-file sections go through the same validation.

use std::ffi::OsString;

use clap::builder::PossibleValuesParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;

use scalewerk_core::error::{DriverError, Result};
use scalewerk_core::types::{DriverSettings, EXECUTABLE_KEY, OptionValue};

use crate::argv;

/// Value type and constraint for one option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionKind {
    /// Flag with no value.
    Switch,
    /// Integer, optionally bounded (inclusive).
    Int { min: Option<i64>, max: Option<i64> },
    Float,
    Text,
    /// One of a fixed set of strings.
    Choice(&'static [&'static str]),
}

/// One option an engine accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSpec {
    /// Settings key. One character renders as `-k`, longer as `--key`.
    pub key: &'static str,
    /// Extra short alias for a long key.
    pub short: Option<char>,
    pub kind: OptionKind,
    pub help: &'static str,
}

impl OptionSpec {
    pub const fn switch(key: &'static str, help: &'static str) -> Self {
        Self { key, short: None, kind: OptionKind::Switch, help }
    }

    pub const fn int(key: &'static str, help: &'static str) -> Self {
        Self { key, short: None, kind: OptionKind::Int { min: None, max: None }, help }
    }

    pub const fn int_range(key: &'static str, min: i64, max: i64, help: &'static str) -> Self {
        Self { key, short: None, kind: OptionKind::Int { min: Some(min), max: Some(max) }, help }
    }

    pub const fn float(key: &'static str, help: &'static str) -> Self {
        Self { key, short: None, kind: OptionKind::Float, help }
    }

    pub const fn text(key: &'static str, help: &'static str) -> Self {
        Self { key, short: None, kind: OptionKind::Text, help }
    }

    pub const fn choice(
        key: &'static str,
        choices: &'static [&'static str],
        help: &'static str,
    ) -> Self {
        Self { key, short: None, kind: OptionKind::Choice(choices), help }
    }

    pub const fn alias(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    fn is_short_key(&self) -> bool {
        self.key.chars().count() == 1
    }

    fn to_arg(self) -> Arg {
        let mut arg = Arg::new(self.key).help(self.help);
        if self.is_short_key() {
            if let Some(c) = self.key.chars().next() {
                arg = arg.short(c);
            }
        } else {
            arg = arg.long(self.key);
            if let Some(c) = self.short {
                arg = arg.short(c);
            }
        }

        match self.kind {
            OptionKind::Switch => arg.action(ArgAction::SetTrue),
            OptionKind::Int { min, max } => {
                let parser = clap::value_parser!(i64);
                let parser = match (min, max) {
                    (Some(lo), Some(hi)) => parser.range(lo..=hi),
                    (Some(lo), None) => parser.range(lo..),
                    (None, Some(hi)) => parser.range(..=hi),
                    (None, None) => parser,
                };
                arg.action(ArgAction::Set)
                    .allow_negative_numbers(true)
                    .value_parser(parser)
            }
            OptionKind::Float => arg
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
            // Paths and thread specs may legitimately begin with `-`.
            OptionKind::Text => arg
                .action(ArgAction::Set)
                .allow_hyphen_values(true)
                .value_parser(clap::value_parser!(String)),
            OptionKind::Choice(choices) => arg
                .action(ArgAction::Set)
                .allow_hyphen_values(true)
                .value_parser(PossibleValuesParser::new(choices.iter().copied())),
        }
    }

    fn extract(&self, matches: &ArgMatches) -> Option<OptionValue> {
        match self.kind {
            OptionKind::Switch => matches.get_flag(self.key).then_some(OptionValue::Switch(true)),
            OptionKind::Int { .. } => matches.get_one::<i64>(self.key).map(|i| OptionValue::Int(*i)),
            OptionKind::Float => matches.get_one::<f64>(self.key).map(|x| OptionValue::Float(*x)),
            OptionKind::Text | OptionKind::Choice(_) => matches
                .get_one::<String>(self.key)
                .map(|s| OptionValue::Text(s.clone())),
        }
    }
}

/// Build the clap command for an option table.
///
/// The automatic `-h` is disabled because some engines use `-h` for their
/// own options; `--help` is registered explicitly instead.
pub fn command(engine: &'static str, specs: &[OptionSpec]) -> Command {
    let help = Arg::new("help")
        .long("help")
        .action(ArgAction::Help)
        .help("show this help message and exit");

    specs.iter().fold(
        Command::new(engine)
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(help),
        |cmd, spec| cmd.arg(spec.to_arg()),
    )
}

/// Parse CLI-style tokens into settings.
///
/// The result lists every schema key in schema order; options that were
/// not given are `None`.
pub fn parse<I, T>(engine: &'static str, specs: &[OptionSpec], args: I) -> Result<DriverSettings>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(engine, specs)
        .try_get_matches_from(args)
        .map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp => DriverError::Help(e.render().to_string()),
            _ => DriverError::Usage(e.render().to_string()),
        })?;

    Ok(specs
        .iter()
        .map(|spec| (spec.key, spec.extract(&matches)))
        .collect())
}

/// Check a settings section against an option table.
///
/// `path` and any key in `passthrough` (options every call overwrites) are
/// skipped. Everything else is rendered back into tokens and run through
/// [`parse`], so a config file is held to the same rules as the command line.
pub fn validate(
    engine: &'static str,
    specs: &[OptionSpec],
    settings: &DriverSettings,
    passthrough: &[&str],
) -> Result<()> {
    let checked: DriverSettings = settings
        .iter()
        .filter(|(key, _)| *key != EXECUTABLE_KEY && !passthrough.contains(key))
        .map(|(key, value)| (key, value.cloned()))
        .collect();

    let tokens = argv::render_options(&checked);
    debug!(engine, tokens = tokens.len(), "validating driver settings");
    parse(engine, specs, tokens).map(|_| ())
}
