//! Option definitions and the clap-backed option parser.
//!
//! A command declares its flags as an [`OptionSet`]. At dispatch time the set
//! is turned into a throwaway `clap::Command` which consumes the flag tokens
//! and leaves everything else as positional arguments.

use std::collections::HashSet;
use std::fmt;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use indexmap::IndexMap;
use tracing::trace;

use crate::error::OptionError;

/// Internal id of the catch-all positional argument.
const POSITIONALS_ID: &str = "__switchyard_positionals";

/// The kind of value an option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    /// A boolean flag that takes no value (`--verbose`).
    #[default]
    Switch,
    /// Free-form text (`--name alice`).
    Text,
    /// A signed integer (`--count 3`).
    Integer,
    /// A floating point number (`--ratio 0.5`).
    Decimal,
}

impl ValueType {
    /// Placeholder shown in help when no explicit value name is set.
    fn default_value_name(self) -> &'static str {
        match self {
            ValueType::Switch => "",
            ValueType::Text => "VALUE",
            ValueType::Integer => "N",
            ValueType::Decimal => "NUMBER",
        }
    }
}

/// Definition of a single option flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Long name, used as `--name` and as the key in [`ParsedOptions`].
    pub name: String,
    /// Optional single-character alias (`-n`).
    pub short: Option<char>,
    /// Value kind.
    pub value_type: ValueType,
    /// Whether the option may be given several times (values accumulate).
    pub repeated: bool,
    /// Whether dispatch fails when the option is absent.
    pub required: bool,
    /// Placeholder shown in help (`--name=NAME`).
    pub value_name: Option<String>,
    /// Help text.
    pub description: String,
}

impl OptionSpec {
    fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            short: None,
            value_type,
            repeated: false,
            required: false,
            value_name: None,
            description: String::new(),
        }
    }

    /// A boolean flag.
    pub fn switch(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Switch)
    }

    /// An option taking a text value.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Text)
    }

    /// An option taking an integer value.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Integer)
    }

    /// An option taking a decimal value.
    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Decimal)
    }

    /// Set the short alias.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Set the help text.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the option as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow the option to be given more than once.
    ///
    /// Has no effect on switches.
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Set the value placeholder used in help.
    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Check if the option consumes a value.
    pub fn takes_value(&self) -> bool {
        self.value_type != ValueType::Switch
    }

    /// Flag syntax as shown in help, e.g. `-n, --name=VALUE`.
    pub fn usage(&self) -> String {
        let mut usage = match self.short {
            Some(short) => format!("-{short}, --{}", self.name),
            None => format!("    --{}", self.name),
        };
        if self.takes_value() {
            let value_name = self
                .value_name
                .as_deref()
                .unwrap_or(self.value_type.default_value_name());
            usage.push('=');
            usage.push_str(value_name);
        }
        usage
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone()).long(self.name.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if !self.takes_value() {
            return arg.action(ArgAction::SetTrue);
        }

        let action = if self.repeated {
            ArgAction::Append
        } else {
            ArgAction::Set
        };
        arg = arg.num_args(1).action(action);
        if let Some(value_name) = &self.value_name {
            arg = arg.value_name(value_name.clone());
        }
        match self.value_type {
            ValueType::Integer => arg
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true),
            ValueType::Decimal => arg
                .value_parser(value_parser!(f64))
                .allow_negative_numbers(true),
            ValueType::Text | ValueType::Switch => arg.value_parser(value_parser!(String)),
        }
    }
}

/// Ordered collection of option definitions owned by a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    specs: Vec<OptionSpec>,
}

impl OptionSet {
    /// Create an empty option set.
    pub const fn new() -> Self {
        Self { specs: Vec::new() }
    }

    /// Add an option, builder style.
    pub fn with(mut self, spec: OptionSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Add an option.
    pub fn push(&mut self, spec: OptionSpec) {
        self.specs.push(spec);
    }

    /// Look up a definition by long name.
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Iterate over definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    /// Iterate over mandatory definitions in declaration order.
    pub fn required(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter().filter(|spec| spec.required)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if the set has no definitions.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Parse `tokens` against this set.
    ///
    /// Recognized flags are bound into [`ParsedOptions`]; all other tokens
    /// are returned as positionals in their original order. Required options
    /// are not checked here.
    pub fn parse<S: AsRef<str>>(
        &self,
        command_name: &str,
        tokens: &[S],
    ) -> Result<ParsedArgs, OptionError> {
        self.check_definitions()?;

        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        trace!(command = command_name, ?tokens, "parsing options");

        let matches = self.build_parser(command_name).try_get_matches_from(tokens)?;

        let mut options = ParsedOptions::default();
        for spec in &self.specs {
            if matches.value_source(&spec.name) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(value) = extract_value(&matches, spec) {
                options.insert(spec.name.clone(), value);
            }
        }

        let positionals = matches
            .get_many::<String>(POSITIONALS_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(ParsedArgs {
            options,
            positionals,
        })
    }

    /// Reject sets that clap would refuse to build.
    fn check_definitions(&self) -> Result<(), OptionError> {
        let mut longs = HashSet::new();
        let mut shorts = HashSet::new();
        for spec in &self.specs {
            if !is_usable_long(&spec.name) || !longs.insert(spec.name.as_str()) {
                return Err(OptionError::Definition(spec.name.clone()));
            }
            if let Some(short) = spec.short {
                if !is_usable_short(short) || !shorts.insert(short) {
                    return Err(OptionError::Definition(format!("-{short}")));
                }
            }
        }
        Ok(())
    }

    fn build_parser(&self, command_name: &str) -> clap::Command {
        let parser = clap::Command::new(command_name.to_string())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .color(clap::ColorChoice::Never);

        let parser = self
            .specs
            .iter()
            .fold(parser, |parser, spec| parser.arg(spec.to_arg()));

        parser.arg(
            Arg::new(POSITIONALS_ID)
                .num_args(1..)
                .action(ArgAction::Append)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(String)),
        )
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a OptionSpec;
    type IntoIter = std::slice::Iter<'a, OptionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

impl FromIterator<OptionSpec> for OptionSet {
    fn from_iter<I: IntoIterator<Item = OptionSpec>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}

fn is_usable_long(name: &str) -> bool {
    !name.is_empty()
        && name != POSITIONALS_ID
        && !name.starts_with('-')
        && !name.contains('=')
        && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

fn is_usable_short(short: char) -> bool {
    short != '-' && short != '=' && !short.is_whitespace() && !short.is_control()
}

fn extract_value(matches: &ArgMatches, spec: &OptionSpec) -> Option<OptionValue> {
    match spec.value_type {
        ValueType::Switch => Some(OptionValue::Switch(matches.get_flag(&spec.name))),
        ValueType::Text => collect_typed(matches, spec, OptionValue::Text),
        ValueType::Integer => collect_typed(matches, spec, OptionValue::Integer),
        ValueType::Decimal => collect_typed(matches, spec, OptionValue::Decimal),
    }
}

fn collect_typed<T>(
    matches: &ArgMatches,
    spec: &OptionSpec,
    wrap: fn(T) -> OptionValue,
) -> Option<OptionValue>
where
    T: Clone + Send + Sync + 'static,
{
    if spec.repeated {
        let values: Vec<OptionValue> = matches
            .get_many::<T>(&spec.name)?
            .cloned()
            .map(wrap)
            .collect();
        Some(OptionValue::List(values))
    } else {
        matches.get_one::<T>(&spec.name).cloned().map(wrap)
    }
}

/// A bound option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Switch state.
    Switch(bool),
    /// Text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Decimal value.
    Decimal(f64),
    /// All values of a repeated option, in command-line order.
    List(Vec<OptionValue>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Switch(value) => write!(f, "{value}"),
            OptionValue::Text(value) => write!(f, "{value}"),
            OptionValue::Integer(value) => write!(f, "{value}"),
            OptionValue::Decimal(value) => write!(f, "{value}"),
            OptionValue::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Option values bound during parsing, keyed by long name.
///
/// Only options present on the command line have an entry; iteration follows
/// the declaration order of the [`OptionSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOptions {
    values: IndexMap<String, OptionValue>,
}

impl ParsedOptions {
    /// Bind a value.
    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw value of an option.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Check if an option was supplied.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// State of a switch; `false` when absent.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Switch(true)))
    }

    /// Value of a text option.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            OptionValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Value of an integer option.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            OptionValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Value of a decimal option.
    pub fn decimal(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            OptionValue::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    /// All text values of an option, repeated or not.
    pub fn texts(&self, name: &str) -> Vec<&str> {
        match self.values.get(name) {
            Some(OptionValue::Text(value)) => vec![value.as_str()],
            Some(OptionValue::List(values)) => values
                .iter()
                .filter_map(|value| match value {
                    OptionValue::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// All integer values of an option, repeated or not.
    pub fn integers(&self, name: &str) -> Vec<i64> {
        match self.values.get(name) {
            Some(OptionValue::Integer(value)) => vec![*value],
            Some(OptionValue::List(values)) => values
                .iter()
                .filter_map(|value| match value {
                    OptionValue::Integer(number) => Some(*number),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of supplied options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no option was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of option parsing: bound values plus leftover positionals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    /// Bound option values.
    pub options: ParsedOptions,
    /// Tokens that were not consumed as flags or flag values.
    pub positionals: Vec<String>,
}
