//! Sample commands and process setup for the `switchyard-demo` binary.
//!
//! The binary itself only wires these pieces together: logging from the
//! environment, a [`DispatchConfig`] from the environment, and the
//! registry built by [`build_registry`].

use std::io::{self, Write};

use anyhow::{Context, Result};
use switchyard::{
    CommandRegistry, CommandSpec, DispatchConfig, Dispatcher, HelpRequest, Invocation, OptionSpec,
    PreRun,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Program name shown in usage lines.
pub const PROGRAM_NAME: &str = "switchyard-demo";

/// Environment variable selecting the log level.
pub const LOG_LEVEL_ENV: &str = "SWITCHYARD_LOG_LEVEL";

/// Environment variable overriding the help wrap width.
pub const HELP_WIDTH_ENV: &str = "SWITCHYARD_HELP_WIDTH";

/// Filter directive for a `SWITCHYARD_LOG_LEVEL` value.
///
/// Level names are matched case-insensitively; anything else, or no value,
/// keeps warnings and errors only.
pub fn level_filter(value: Option<&str>) -> &'static str {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("error") => "error",
        Some("info") => "info",
        Some("debug") => "debug",
        Some("trace") => "trace",
        _ => "warn",
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level comes from
/// `SWITCHYARD_LOG_LEVEL`, falling back to warnings only.
pub fn init_logging() -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env().context("invalid RUST_LOG filter")?
    } else {
        let level = std::env::var(LOG_LEVEL_ENV).ok();
        EnvFilter::new(level_filter(level.as_deref()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

/// Parse a help width value. Zero and garbage are rejected.
pub fn parse_help_width(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|width| *width > 0)
}

/// Build the dispatcher settings from the environment.
pub fn load_config() -> DispatchConfig {
    let mut config = DispatchConfig::new().with_program_name(PROGRAM_NAME);

    if let Ok(raw) = std::env::var(HELP_WIDTH_ENV) {
        match parse_help_width(&raw) {
            Some(width) => config = config.with_help_width(width),
            None => warn!(value = %raw, "ignoring invalid {HELP_WIDTH_ENV}"),
        }
    }
    config
}

// ============================================================================
// Sample commands
// ============================================================================

/// The sample commands, without the interactive shell.
pub fn sample_commands() -> CommandRegistry {
    CommandRegistry::new()
        .with(greet_command())
        .with(sum_command())
        .with(repeat_command())
}

/// Every command the demo binary exposes.
pub fn build_registry() -> CommandRegistry {
    sample_commands().with(shell_command())
}

fn greet_command() -> CommandSpec {
    CommandSpec::new("greet", |inv| {
        println!("{}", greeting(inv));
        0
    })
    .with_description("Print a greeting")
    .with_long_description("Greets the given name, or the whole world when no name is passed.")
    .with_option(OptionSpec::text("name").short('n').help("Who to greet"))
    .with_option(OptionSpec::switch("loud").help("Shout the greeting"))
}

/// Text printed by `greet`.
pub fn greeting(inv: &Invocation) -> String {
    let text = format!("Hello, {}!", inv.options.text("name").unwrap_or("world"));
    if inv.options.flag("loud") {
        text.to_uppercase()
    } else {
        text
    }
}

fn sum_command() -> CommandSpec {
    CommandSpec::fallible("sum", |inv| {
        println!("{}", total(inv)?);
        Ok(0)
    })
    .with_description("Add numbers together")
    .with_arguments_help("<number>...")
    .with_option(
        OptionSpec::decimal("scale")
            .short('s')
            .value_name("FACTOR")
            .help("Multiply the total by this factor"),
    )
}

/// Sum of the positional numbers, scaled. A token that is not a number
/// asks for the command's help.
pub fn total(inv: &Invocation) -> std::result::Result<f64, HelpRequest> {
    let mut sum = 0.0;
    for value in &inv.positionals {
        sum += value
            .parse::<f64>()
            .map_err(|_| HelpRequest::new(format!("Not a number: {value}")))?;
    }
    Ok(sum * inv.options.decimal("scale").unwrap_or(1.0))
}

fn repeat_command() -> CommandSpec {
    CommandSpec::new("repeat", |inv| {
        let times = inv.options.integer("count").unwrap_or(1);
        let text = inv.arg(0).unwrap_or_default();
        for _ in 0..times {
            println!("{text}");
        }
        0
    })
    .with_description("Print a line several times")
    .with_required_arguments(1)
    .with_arguments_help("<text>")
    .with_option(
        OptionSpec::integer("count")
            .short('c')
            .value_name("TIMES")
            .required()
            .help("How many times to print the line"),
    )
    .on_pre_run(check_count)
}

/// Pre-run check for `repeat`: the count must be positive.
pub fn check_count(inv: &Invocation) -> PreRun {
    match inv.options.integer("count") {
        Some(count) if count < 1 => {
            eprintln!("--count must be at least 1, got {count}");
            PreRun::Exit(2)
        }
        _ => PreRun::Continue,
    }
}

fn shell_command() -> CommandSpec {
    CommandSpec::new("shell", |_| {
        let config = load_config().with_skip_program_name(true);
        match Dispatcher::with_config(sample_commands(), config) {
            Ok(dispatcher) => {
                let stdin = io::stdin();
                let code =
                    dispatcher.run_console(stdin.lock(), &mut io::stdout(), &mut io::stderr());
                if let Err(e) = io::stdout().flush() {
                    warn!(error = %e, "failed to flush stdout");
                }
                code
            }
            Err(e) => {
                eprintln!("{e}");
                1
            }
        }
    })
    .with_description("Run the sample commands interactively")
    .with_long_description(
        "Reads one command per line from standard input. Type 'exit' or 'quit' to leave.",
    )
    .with_required_arguments(0)
    .skip_parsed_echo()
}
