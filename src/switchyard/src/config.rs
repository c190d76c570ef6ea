//! Dispatcher configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default width used to wrap help text.
pub const DEFAULT_HELP_WIDTH: usize = 80;

/// Narrowest width help text is wrapped to.
pub const MIN_HELP_WIDTH: usize = 40;

/// Default prompt for console mode.
pub const DEFAULT_CONSOLE_PROMPT: &str = "> ";

/// Settings that shape help output and console mode.
///
/// The struct is deserializable so hosts can embed it in their own
/// configuration files; every field is optional there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Program name shown in usage lines. Derived from the process
    /// arguments when unset.
    pub program_name: Option<String>,

    /// Leave the program name out of usage lines.
    pub skip_program_name_in_usage: bool,

    /// Write the "Executing ..." line before running a command.
    pub echo_parsed: bool,

    /// Column width help text is wrapped to.
    pub help_width: usize,

    /// Prompt written before each console-mode line.
    pub console_prompt: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            program_name: None,
            skip_program_name_in_usage: false,
            echo_parsed: true,
            help_width: DEFAULT_HELP_WIDTH,
            console_prompt: DEFAULT_CONSOLE_PROMPT.to_string(),
        }
    }
}

impl DispatchConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the program name.
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    /// Leave the program name out of usage lines.
    pub fn with_skip_program_name(mut self, skip: bool) -> Self {
        self.skip_program_name_in_usage = skip;
        self
    }

    /// Enable or disable the parsed-command echo.
    pub fn with_echo_parsed(mut self, echo: bool) -> Self {
        self.echo_parsed = echo;
        self
    }

    /// Set the help wrap width.
    pub fn with_help_width(mut self, width: usize) -> Self {
        self.help_width = width;
        self
    }

    /// Set the console prompt.
    pub fn with_console_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.console_prompt = prompt.into();
        self
    }

    /// Width actually used for wrapping.
    pub fn effective_help_width(&self) -> usize {
        self.help_width.max(MIN_HELP_WIDTH)
    }

    /// Program name for usage lines.
    pub fn resolved_program_name(&self) -> String {
        if let Some(name) = &self.program_name {
            return name.clone();
        }
        std::env::args()
            .next()
            .as_deref()
            .and_then(|arg0| Path::new(arg0).file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
