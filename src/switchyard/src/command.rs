//! The command capability and its closure-backed implementation.

use std::fmt;

use crate::error::{CommandError, HelpRequest};
use crate::options::{OptionSet, OptionSpec, ParsedArgs, ParsedOptions};

/// Exit code returned whenever dispatch shows help instead of running a command.
pub const HELP_EXIT_CODE: i32 = -1;

static NO_OPTIONS: OptionSet = OptionSet::new();

/// Everything a command receives once its arguments were parsed and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Name of the selected command.
    pub command: String,
    /// Bound option values.
    pub options: ParsedOptions,
    /// Positional tokens left after option parsing.
    pub positionals: Vec<String>,
}

impl Invocation {
    /// Create an invocation from parser output.
    pub fn new(command: impl Into<String>, parsed: ParsedArgs) -> Self {
        Self {
            command: command.into(),
            options: parsed.options,
            positionals: parsed.positionals,
        }
    }

    /// Positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }
}

/// Outcome of [`Command::pre_run`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreRun {
    /// Go on and call [`Command::run`].
    #[default]
    Continue,
    /// Stop here; dispatch returns this code.
    Exit(i32),
    /// Stop here and show the command's help on the error stream, preceded
    /// by this message. Dispatch returns [`HELP_EXIT_CODE`].
    Help(String),
}

/// A command that can be selected and invoked by the dispatcher.
///
/// Commands are used through `&self` only; the dispatcher never mutates them.
pub trait Command {
    /// Name used to select the command (matched case-insensitively).
    fn name(&self) -> &str;

    /// One-line description shown in the command summary.
    fn description(&self) -> &str {
        ""
    }

    /// Additional text shown in the command's detailed help.
    fn long_description(&self) -> Option<&str> {
        None
    }

    /// Option flags accepted by the command.
    fn options(&self) -> &OptionSet {
        &NO_OPTIONS
    }

    /// Exact number of positional arguments required, if checked at all.
    fn required_argument_count(&self) -> Option<usize> {
        None
    }

    /// Usage text for the positional arguments, e.g. `<source> <target>`.
    fn arguments_help(&self) -> Option<&str> {
        None
    }

    /// Suppress the "Executing ..." line written before [`Command::run`].
    fn skips_parsed_echo(&self) -> bool {
        false
    }

    /// Hook invoked after validation and before [`Command::run`].
    fn pre_run(&self, _invocation: &Invocation) -> PreRun {
        PreRun::Continue
    }

    /// Execute the command and return its exit code.
    ///
    /// An `Err` shows the request's message and the command's help on the
    /// error stream, and dispatch returns [`HELP_EXIT_CODE`]. Returning
    /// `Ok(HELP_EXIT_CODE)` is allowed but callers cannot tell it apart from
    /// a dispatch failure.
    fn run(&self, invocation: &Invocation) -> Result<i32, HelpRequest>;
}

impl fmt::Debug for dyn Command + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name())
            .field("description", &self.description())
            .finish_non_exhaustive()
    }
}

/// Check that a set of commands can be dispatched over.
pub fn validate_commands<'a, I>(commands: I) -> Result<(), CommandError>
where
    I: IntoIterator<Item = &'a dyn Command>,
{
    let mut count = 0;
    for (position, command) in commands.into_iter().enumerate() {
        if command.name().trim().is_empty() {
            return Err(CommandError::EmptyName { position });
        }
        count += 1;
    }
    if count == 0 {
        return Err(CommandError::NoCommands);
    }
    Ok(())
}

type RunFn = Box<dyn Fn(&Invocation) -> Result<i32, HelpRequest>>;
type PreRunFn = Box<dyn Fn(&Invocation) -> PreRun>;

/// A command assembled from closures instead of a dedicated type.
///
/// ```rust,ignore
/// use switchyard::{CommandSpec, OptionSpec};
///
/// let copy = CommandSpec::new("copy", |inv| {
///     println!("{} -> {}", inv.positionals[0], inv.positionals[1]);
///     0
/// })
/// .with_description("Copy a file")
/// .with_option(OptionSpec::switch("force").short('f'))
/// .with_required_arguments(2)
/// .with_arguments_help("<source> <target>");
/// ```
pub struct CommandSpec {
    name: String,
    description: String,
    long_description: Option<String>,
    options: OptionSet,
    required_argument_count: Option<usize>,
    arguments_help: Option<String>,
    skips_parsed_echo: bool,
    pre_run: Option<PreRunFn>,
    run: RunFn,
}

impl CommandSpec {
    /// Create a command with its name and run behavior.
    pub fn new(name: impl Into<String>, run: impl Fn(&Invocation) -> i32 + 'static) -> Self {
        Self::fallible(name, move |invocation| Ok(run(invocation)))
    }

    /// Create a command whose run behavior may ask for its help instead of
    /// returning an exit code.
    pub fn fallible(
        name: impl Into<String>,
        run: impl Fn(&Invocation) -> Result<i32, HelpRequest> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            long_description: None,
            options: OptionSet::new(),
            required_argument_count: None,
            arguments_help: None,
            skips_parsed_echo: false,
            pre_run: None,
            run: Box::new(run),
        }
    }

    /// Set the one-line description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the long description.
    pub fn with_long_description(mut self, text: impl Into<String>) -> Self {
        self.long_description = Some(text.into());
        self
    }

    /// Add an option definition.
    pub fn with_option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    /// Replace the whole option set.
    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    /// Require exactly `count` positional arguments.
    pub fn with_required_arguments(mut self, count: usize) -> Self {
        self.required_argument_count = Some(count);
        self
    }

    /// Set the usage text for positional arguments.
    pub fn with_arguments_help(mut self, text: impl Into<String>) -> Self {
        self.arguments_help = Some(text.into());
        self
    }

    /// Do not echo the parsed command before running.
    pub fn skip_parsed_echo(mut self) -> Self {
        self.skips_parsed_echo = true;
        self
    }

    /// Install a pre-run hook.
    pub fn on_pre_run(mut self, hook: impl Fn(&Invocation) -> PreRun + 'static) -> Self {
        self.pre_run = Some(Box::new(hook));
        self
    }

    /// Box the command for registration.
    pub fn boxed(self) -> Box<dyn Command> {
        Box::new(self)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("required_argument_count", &self.required_argument_count)
            .field("has_pre_run", &self.pre_run.is_some())
            .finish_non_exhaustive()
    }
}

impl Command for CommandSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }

    fn options(&self) -> &OptionSet {
        &self.options
    }

    fn required_argument_count(&self) -> Option<usize> {
        self.required_argument_count
    }

    fn arguments_help(&self) -> Option<&str> {
        self.arguments_help.as_deref()
    }

    fn skips_parsed_echo(&self) -> bool {
        self.skips_parsed_echo
    }

    fn pre_run(&self, invocation: &Invocation) -> PreRun {
        match &self.pre_run {
            Some(hook) => hook(invocation),
            None => PreRun::Continue,
        }
    }

    fn run(&self, invocation: &Invocation) -> Result<i32, HelpRequest> {
        (self.run)(invocation)
    }
}
