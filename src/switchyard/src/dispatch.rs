//! The dispatch engine.
//!
//! Dispatch runs in two phases. The first phase selects a command, parses
//! its options and validates the result. It returns either a ready
//! invocation, a request to show help, or a [`Failure`] that remembers which
//! command (if any) had been selected when things went wrong. The second
//! phase runs the command or turns the failure into help text on the error
//! stream. A command can still ask for its help from its pre-run hook or
//! from `run`; that request is reported like any other failure. Either way
//! the caller only ever sees an exit code.

use std::io::{self, Write};

use tracing::{debug, trace, warn};

use crate::command::{Command, HELP_EXIT_CODE, Invocation, PreRun, validate_commands};
use crate::config::DispatchConfig;
use crate::error::{CommandError, DispatchError, HelpRequest};
use crate::help::HelpRenderer;
use crate::matcher::{match_command, names_match};
use crate::registry::CommandRegistry;

/// Name of the reserved help pseudo-command in multi-command mode.
pub const HELP_COMMAND: &str = "help";

/// Routes argument vectors to a fixed set of commands.
#[derive(Debug)]
pub struct Dispatcher {
    registry: CommandRegistry,
    config: DispatchConfig,
    renderer: HelpRenderer,
}

/// What the first phase decided.
enum Prepared<'a> {
    /// `help [name]` was requested.
    Help(Option<&'a dyn Command>),
    /// A command is ready to run.
    Ready {
        command: &'a dyn Command,
        invocation: Invocation,
    },
}

/// A recoverable dispatch failure and the command selected before it.
struct Failure<'a> {
    selected: Option<&'a dyn Command>,
    error: DispatchError,
}

impl<'a> Failure<'a> {
    fn general(error: DispatchError) -> Self {
        Self {
            selected: None,
            error,
        }
    }
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration.
    ///
    /// Fails when no command is registered or a command has an empty name.
    pub fn new(commands: impl Into<CommandRegistry>) -> Result<Self, CommandError> {
        Self::with_config(commands, DispatchConfig::default())
    }

    /// Create a dispatcher with an explicit configuration.
    pub fn with_config(
        commands: impl Into<CommandRegistry>,
        config: DispatchConfig,
    ) -> Result<Self, CommandError> {
        let registry = commands.into();
        validate_commands(registry.iter())?;

        let renderer = HelpRenderer::from_config(&config);
        debug!(
            commands = registry.len(),
            program = renderer.program_name(),
            "dispatcher ready"
        );
        Ok(Self {
            registry,
            config,
            renderer,
        })
    }

    /// The registered commands.
    pub fn commands(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Check if the dispatcher runs in single-command mode.
    pub fn is_single_command(&self) -> bool {
        self.registry.len() == 1
    }

    /// Select, parse, validate and run a command.
    ///
    /// Returns the command's exit code, or [`HELP_EXIT_CODE`] when help was
    /// shown instead (explicit `help`, bad arguments or an unknown command).
    /// Normal help goes to `out`; help caused by an error goes to `err`.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        args: &[S],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32 {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        trace!(?args, "dispatching");

        match self.prepare(&args) {
            Ok(Prepared::Help(selected)) => {
                self.show_help(selected, out);
                HELP_EXIT_CODE
            }
            Ok(Prepared::Ready {
                command,
                invocation,
            }) => self.invoke(command, &invocation, out, err),
            Err(failure) => self.report(failure, err),
        }
    }

    fn prepare<'a>(&'a self, args: &[&str]) -> Result<Prepared<'a>, Failure<'a>> {
        let commands = self.registry.as_slice();

        let (command, tokens) = if let [only] = commands {
            let only: &dyn Command = &**only;
            let tokens = match args.split_first() {
                Some((first, rest)) if names_match(only.name(), first) => rest,
                _ => args,
            };
            debug!(command = only.name(), "single-command mode");
            (only, tokens)
        } else {
            let Some((first, rest)) = args.split_first() else {
                return Err(Failure::general(DispatchError::NoArguments));
            };

            if names_match(first, HELP_COMMAND) {
                let selected = match_command(commands, rest.first().copied());
                debug!(
                    command = selected.map(|command| command.name()),
                    "help requested"
                );
                return Ok(Prepared::Help(selected));
            }

            let Some(command) = match_command(commands, Some(*first)) else {
                debug!(token = *first, "command not recognized");
                return Err(Failure::general(DispatchError::UnrecognizedCommand(
                    first.to_string(),
                )));
            };
            debug!(command = command.name(), "command selected");
            (command, rest)
        };

        match parse_and_validate(command, tokens) {
            Ok(invocation) => Ok(Prepared::Ready {
                command,
                invocation,
            }),
            Err(error) => Err(Failure {
                selected: Some(command),
                error,
            }),
        }
    }

    fn invoke(
        &self,
        command: &dyn Command,
        invocation: &Invocation,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32 {
        match command.pre_run(invocation) {
            PreRun::Continue => {}
            PreRun::Exit(code) => {
                debug!(command = command.name(), code, "pre-run hook short-circuited");
                return code;
            }
            PreRun::Help(message) => {
                return self.report(
                    Failure {
                        selected: Some(command),
                        error: HelpRequest::new(message).into(),
                    },
                    err,
                );
            }
        }

        if self.config.echo_parsed && !command.skips_parsed_echo() {
            log_write_failure(HelpRenderer::render_parsed_echo(
                command,
                &invocation.options,
                out,
            ));
        }

        match command.run(invocation) {
            Ok(code) => {
                debug!(command = command.name(), code, "command finished");
                code
            }
            Err(request) => self.report(
                Failure {
                    selected: Some(command),
                    error: request.into(),
                },
                err,
            ),
        }
    }

    fn show_help(&self, selected: Option<&dyn Command>, out: &mut dyn Write) {
        let result = match selected {
            Some(command) => self.renderer.render_command_detail(
                command,
                out,
                self.config.skip_program_name_in_usage,
            ),
            None => self.renderer.render_summary(self.registry.as_slice(), out),
        };
        log_write_failure(result);
    }

    fn report(&self, failure: Failure<'_>, err: &mut dyn Write) -> i32 {
        debug!(
            command = failure.selected.map(|command| command.name()),
            error = %failure.error,
            "dispatch failed"
        );

        let result = match failure.selected {
            Some(command) => self.write_command_error(command, &failure.error, err),
            None => self.renderer.render_summary(self.registry.as_slice(), err),
        };
        log_write_failure(result);
        HELP_EXIT_CODE
    }

    fn write_command_error(
        &self,
        command: &dyn Command,
        error: &DispatchError,
        err: &mut dyn Write,
    ) -> io::Result<()> {
        writeln!(err)?;
        let message = error.to_string();
        if !message.is_empty() {
            writeln!(err, "{message}")?;
        }
        self.renderer.render_command_detail(
            command,
            err,
            self.config.skip_program_name_in_usage,
        )
    }
}

/// Dispatch once over `commands` without keeping a [`Dispatcher`] around.
///
/// Invalid command declarations are the only error returned; everything else
/// is reported through the streams and the exit code.
pub fn dispatch_command<S: AsRef<str>>(
    commands: impl Into<CommandRegistry>,
    args: &[S],
    out: &mut dyn Write,
    err: &mut dyn Write,
    skip_program_name_in_usage: bool,
) -> Result<i32, CommandError> {
    let config = DispatchConfig::default().with_skip_program_name(skip_program_name_in_usage);
    let dispatcher = Dispatcher::with_config(commands, config)?;
    Ok(dispatcher.dispatch(args, out, err))
}

/// Parse `tokens` for `command` and check required options and arity.
pub fn parse_and_validate(
    command: &dyn Command,
    tokens: &[&str],
) -> Result<Invocation, DispatchError> {
    let parsed = command.options().parse(command.name(), tokens)?;

    if let Some(missing) = command
        .options()
        .required()
        .find(|spec| !parsed.options.contains(&spec.name))
    {
        return Err(DispatchError::MissingRequiredOption(missing.name.clone()));
    }

    check_argument_count(&parsed.positionals, command.required_argument_count())?;

    Ok(Invocation::new(command.name(), parsed))
}

/// Verify the positional count when the command declares one.
pub fn check_argument_count(
    positionals: &[String],
    required: Option<usize>,
) -> Result<(), DispatchError> {
    let Some(expected) = required else {
        return Ok(());
    };
    let actual = positionals.len();

    if actual < expected {
        return Err(DispatchError::TooFewArguments { expected, actual });
    }
    if actual > expected {
        return Err(DispatchError::ExtraArguments {
            expected,
            actual,
            extra: positionals[expected..].to_vec(),
        });
    }
    Ok(())
}

fn log_write_failure(result: io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "failed to write dispatch output");
    }
}
