//! Command dispatch for multi-command CLIs.
//!
//! This crate turns a raw argument vector into a call to one of a set of
//! declared commands. It selects the command, parses its options, checks
//! required options and positional arguments, and runs it. When any of that
//! fails it prints usage help instead.
//!
//! # Dispatch Modes
//!
//! - **Single command**: with exactly one registered command, that command
//!   is always selected. A leading token equal to its name is optional.
//! - **Multiple commands**: the first token names the command. The reserved
//!   `help [name]` pseudo-command prints the summary or one command's help.
//!
//! # Exit Codes
//!
//! [`Dispatcher::dispatch`] returns the command's own exit code, or
//! [`HELP_EXIT_CODE`] (`-1`) whenever help was shown instead of running a
//! command. Commands should not use `-1` themselves; to show their own help
//! they return a [`HelpRequest`] or [`PreRun::Help`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use switchyard::{CommandRegistry, CommandSpec, Dispatcher, OptionSpec};
//!
//! let registry = CommandRegistry::new()
//!     .with(
//!         CommandSpec::new("greet", |inv| {
//!             println!("Hello, {}!", inv.options.text("name").unwrap_or("world"));
//!             0
//!         })
//!         .with_description("Say hello")
//!         .with_option(OptionSpec::text("name").short('n')),
//!     )
//!     .with(CommandSpec::new("version", |_| 0).with_description("Print the version"));
//!
//! let dispatcher = Dispatcher::new(registry)?;
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! let code = dispatcher.dispatch(&args, &mut std::io::stdout(), &mut std::io::stderr());
//! ```
//!
//! # Console Mode
//!
//! [`Dispatcher::run_console`] reads lines from any `BufRead` and dispatches
//! each of them, which gives a small interactive shell over the same
//! commands.

mod command;
mod config;
mod console;
mod dispatch;
mod error;
mod help;
mod matcher;
mod options;
mod registry;

pub use command::{Command, CommandSpec, HELP_EXIT_CODE, Invocation, PreRun, validate_commands};
pub use config::{DEFAULT_CONSOLE_PROMPT, DEFAULT_HELP_WIDTH, DispatchConfig, MIN_HELP_WIDTH};
pub use dispatch::{
    Dispatcher, HELP_COMMAND, check_argument_count, dispatch_command, parse_and_validate,
};
pub use error::{CommandError, DispatchError, HelpRequest, OptionError};
pub use help::HelpRenderer;
pub use matcher::{match_command, names_match};
pub use options::{OptionSet, OptionSpec, OptionValue, ParsedArgs, ParsedOptions, ValueType};
pub use registry::CommandRegistry;

/// Re-export common types for convenience.
pub mod prelude {
    pub use crate::{
        Command, CommandRegistry, CommandSpec, DispatchConfig, Dispatcher, HELP_EXIT_CODE,
        HelpRequest, Invocation, OptionSet, OptionSpec, PreRun,
    };
}
