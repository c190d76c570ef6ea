//! Error types for command registration and dispatch.

use thiserror::Error;

/// Errors in how commands were declared.
///
/// These indicate a programming error in the host program rather than bad
/// user input, so they are returned from [`Dispatcher`](crate::Dispatcher)
/// construction instead of being rendered as help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command set handed to the dispatcher was empty.
    #[error("No commands were registered; at least one command is required")]
    NoCommands,

    /// A command was registered without a name.
    #[error(
        "Command at position {position} has an empty name; every command must declare its name and description"
    )]
    EmptyName {
        /// Zero-based registration position of the offending command.
        position: usize,
    },
}

/// Errors produced by the option parser adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// The tokens were rejected (unknown flag, missing value, bad number...).
    #[error("{0}")]
    Rejected(String),

    /// An option definition has an unusable name, or shares its long or
    /// short name with another definition in the same set.
    #[error("Invalid or duplicate option definition: '{0}'")]
    Definition(String),
}

impl From<clap::Error> for OptionError {
    fn from(err: clap::Error) -> Self {
        // clap renders a multi-line report with usage; the first line is the
        // actual complaint.
        let rendered = err.render().to_string();
        let message = rendered
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("invalid options")
            .trim_start_matches("error: ")
            .to_string();
        OptionError::Rejected(message)
    }
}

/// Raised by a command that wants dispatch to show its help instead of an
/// exit code, typically after finding a bad argument value while running.
///
/// The message is printed on the error stream, followed by the command's
/// detailed help, and dispatch returns [`HELP_EXIT_CODE`](crate::HELP_EXIT_CODE).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HelpRequest {
    message: String,
}

impl HelpRequest {
    /// Request help with an explanation for the user.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The explanation shown above the help text.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Recoverable failures during dispatch.
///
/// None of these reach the caller of [`Dispatcher::dispatch`](crate::Dispatcher::dispatch):
/// they are rendered as help text and turned into [`HELP_EXIT_CODE`](crate::HELP_EXIT_CODE).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Multi-command mode was invoked without any argument.
    #[error("No arguments specified.")]
    NoArguments,

    /// The first token does not name any registered command.
    #[error("Command name not recognized: {0}")]
    UnrecognizedCommand(String),

    /// The option parser rejected the tokens.
    #[error(transparent)]
    Options(#[from] OptionError),

    /// A mandatory option was not supplied.
    #[error("Missing option: --{0} is required.")]
    MissingRequiredOption(String),

    /// Fewer positional arguments than the command requires.
    #[error("Invalid number of arguments: expected {expected}, got {actual}.")]
    TooFewArguments {
        /// Required positional count.
        expected: usize,
        /// Positional count actually supplied.
        actual: usize,
    },

    /// More positional arguments than the command accepts.
    #[error("Extra parameters specified: {} (expected {expected}, got {actual}).", .extra.join(", "))]
    ExtraArguments {
        /// Required positional count.
        expected: usize,
        /// Positional count actually supplied.
        actual: usize,
        /// The surplus tokens.
        extra: Vec<String>,
    },

    /// The command asked for its help from a pre-run hook or from `run`.
    #[error(transparent)]
    HelpRequested(#[from] HelpRequest),
}
