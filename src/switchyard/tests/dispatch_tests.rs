//! Integration tests for the switchyard dispatch engine.
//!
//! These exercise the public API end to end: command selection in both
//! modes, the help pseudo-command, failure routing between the two output
//! streams, pre-run hooks and the parsed-command echo.

use std::cell::Cell;
use std::rc::Rc;

use switchyard::{
    Command, CommandError, CommandRegistry, CommandSpec, DispatchConfig, Dispatcher,
    HELP_EXIT_CODE, HelpRenderer, HelpRequest, Invocation, OptionSpec, PreRun, dispatch_command,
};

// ============================================================================
// HELPERS
// ============================================================================

/// Output captured from a single dispatch.
struct Captured {
    code: i32,
    out: String,
    err: String,
}

fn run(dispatcher: &Dispatcher, args: &[&str]) -> Captured {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = dispatcher.dispatch(args, &mut out, &mut err);
    Captured {
        code,
        out: String::from_utf8(out).expect("utf-8 output"),
        err: String::from_utf8(err).expect("utf-8 error output"),
    }
}

fn config() -> DispatchConfig {
    DispatchConfig::new().with_program_name("app")
}

fn summary_of(dispatcher: &Dispatcher) -> String {
    let mut buffer = Vec::new();
    HelpRenderer::new("app", 80)
        .render_summary(dispatcher.commands().as_slice(), &mut buffer)
        .expect("render summary");
    String::from_utf8(buffer).expect("utf-8 summary")
}

fn detail_of(dispatcher: &Dispatcher, name: &str) -> String {
    let command = dispatcher.commands().find(name).expect("command exists");
    let mut buffer = Vec::new();
    HelpRenderer::new("app", 80)
        .render_command_detail(command, &mut buffer, false)
        .expect("render detail");
    String::from_utf8(buffer).expect("utf-8 detail")
}

/// A command that counts its runs and returns a fixed code.
fn counting(name: &str, code: i32, runs: &Rc<Cell<usize>>) -> CommandSpec {
    let runs = Rc::clone(runs);
    CommandSpec::new(name, move |_| {
        runs.set(runs.get() + 1);
        code
    })
}

/// Multi-command set used by most tests.
fn multi(runs: &Rc<Cell<usize>>) -> Dispatcher {
    let registry = CommandRegistry::new()
        .with(
            counting("add", 0, runs)
                .with_description("Add numbers")
                .with_option(OptionSpec::integer("base").short('b').help("Starting value")),
        )
        .with(
            counting("cmd", 7, runs)
                .with_description("Needs two arguments")
                .with_required_arguments(2)
                .with_arguments_help("<first> <second>"),
        )
        .with(
            counting("deploy", 3, runs)
                .with_description("Ship it")
                .with_option(OptionSpec::text("env").required().help("Target environment"))
                .with_option(OptionSpec::switch("dry-run")),
        );
    Dispatcher::with_config(registry, config()).expect("valid commands")
}

// ============================================================================
// SINGLE-COMMAND MODE
// ============================================================================

mod single_command_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pure_single() -> Dispatcher {
        let command = CommandSpec::new("cmd", |inv: &Invocation| {
            inv.positionals.len() as i32 * 10 + i32::from(inv.options.flag("verbose"))
        })
        .with_description("The only command")
        .with_option(OptionSpec::switch("verbose").short('v'));
        Dispatcher::with_config(CommandRegistry::new().with(command), config()).unwrap()
    }

    #[test]
    fn test_name_token_is_optional() {
        let dispatcher = pure_single();

        let with_name = run(&dispatcher, &["cmd", "--verbose", "x", "y"]);
        let without_name = run(&dispatcher, &["--verbose", "x", "y"]);

        assert_eq!(with_name.code, 21);
        assert_eq!(with_name.code, without_name.code);
        assert_eq!(with_name.out, without_name.out);
        assert_eq!(with_name.err, without_name.err);
    }

    #[test]
    fn test_name_token_matches_case_insensitively() {
        let dispatcher = pure_single();

        assert_eq!(run(&dispatcher, &["CMD", "a"]).code, 10);
    }

    #[test]
    fn test_empty_args_run_the_command() {
        let dispatcher = pure_single();

        let captured = run(&dispatcher, &[]);

        assert_eq!(captured.code, 0);
        assert_eq!(captured.out, "Executing cmd\n");
        assert!(captured.err.is_empty());
    }

    #[test]
    fn test_help_is_an_ordinary_token() {
        let dispatcher = pure_single();

        let captured = run(&dispatcher, &["help"]);

        assert_eq!(captured.code, 10);
        assert!(!captured.out.contains("Available commands"));
    }

    #[test]
    fn test_failure_shows_command_help() {
        let runs = Rc::new(Cell::new(0));
        let command = counting("copy", 0, &runs)
            .with_description("Copy a file")
            .with_required_arguments(2);
        let dispatcher =
            Dispatcher::with_config(CommandRegistry::new().with(command), config()).unwrap();

        let captured = run(&dispatcher, &["copy", "only-one"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(captured.out.is_empty());
        assert_eq!(
            captured.err,
            format!(
                "\nInvalid number of arguments: expected 2, got 1.\n{}",
                detail_of(&dispatcher, "copy")
            )
        );
        assert_eq!(runs.get(), 0);
    }
}

// ============================================================================
// MULTI-COMMAND MODE
// ============================================================================

mod multi_command_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_arguments_shows_summary_on_err() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &[]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(captured.out.is_empty());
        assert_eq!(captured.err, summary_of(&dispatcher));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_help_shows_summary_on_out() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["help"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(captured.out, summary_of(&dispatcher));
        assert!(captured.err.is_empty());
    }

    #[test]
    fn test_help_is_case_insensitive() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["HeLp"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(captured.out, summary_of(&dispatcher));
    }

    #[test]
    fn test_help_for_known_command_shows_detail() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["help", "DEPLOY"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(captured.out, detail_of(&dispatcher, "deploy"));
        assert!(captured.out.contains("Expected usage: app deploy <options>"));
        assert!(captured.out.contains("--env=VALUE"));
        assert!(captured.err.is_empty());
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_help_for_unknown_command_shows_summary() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["help", "nope", "extra"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(captured.out, summary_of(&dispatcher));
        assert!(captured.err.is_empty());
    }

    #[test]
    fn test_help_never_parses_options() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["help", "deploy", "--bogus"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(captured.err.is_empty());
    }

    #[test]
    fn test_unknown_command_shows_summary_on_err() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["launch", "--now"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(captured.out.is_empty());
        assert_eq!(captured.err, summary_of(&dispatcher));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_required_argument_count() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let ok = run(&dispatcher, &["cmd", "a", "b"]);
        assert_eq!(ok.code, 7);
        assert_eq!(runs.get(), 1);

        let short = run(&dispatcher, &["cmd", "a"]);
        assert_eq!(short.code, HELP_EXIT_CODE);
        assert!(short.err.contains("expected 2, got 1"));
        assert!(short.err.contains(&detail_of(&dispatcher, "cmd")));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_extra_arguments_are_named() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["cmd", "a", "b", "c", "d"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(
            captured
                .err
                .starts_with("\nExtra parameters specified: c, d (expected 2, got 4).\n")
        );
    }

    #[test]
    fn test_command_name_is_case_insensitive() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["CMD", "a", "b"]);

        assert_eq!(captured.code, 7);
        assert_eq!(captured.out, "Executing cmd\n");
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let registry = CommandRegistry::new()
            .with(CommandSpec::new("twin", |_| 1))
            .with(CommandSpec::new("TWIN", |_| 2));
        let dispatcher = Dispatcher::with_config(registry, config()).unwrap();

        assert_eq!(run(&dispatcher, &["twin"]).code, 1);
        assert_eq!(run(&dispatcher, &["TWIN"]).code, 1);
    }
}

// ============================================================================
// OPTION VALIDATION
// ============================================================================

mod option_validation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_required_option_names_it() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["deploy", "--dry-run"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(
            captured.err,
            format!(
                "\nMissing option: --env is required.\n{}",
                detail_of(&dispatcher, "deploy")
            )
        );
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_unknown_option_shows_command_help() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["add", "--bogus"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(captured.err.contains("--bogus"));
        assert!(captured.err.contains("'add' - Add numbers"));
        assert!(captured.out.is_empty());
    }

    #[test]
    fn test_bad_integer_value_is_a_parse_error() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["add", "--base", "ten"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(captured.err.contains("ten"));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_bad_option_definition_becomes_help() {
        let runs = Rc::new(Cell::new(0));
        let command = counting("odd", 0, &runs)
            .with_description("Declares an unusable flag")
            .with_option(OptionSpec::switch("dash").short('-'));
        let dispatcher =
            Dispatcher::with_config(CommandRegistry::new().with(command), config()).unwrap();

        let captured = run(&dispatcher, &["odd", "a"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert!(captured.err.contains("Invalid or duplicate option definition: '--'"));
        assert!(captured.err.contains("'odd' - Declares an unusable flag"));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_repeated_single_option_keeps_last_value() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        let captured = run(&dispatcher, &["add", "-b", "1", "--base", "5"]);

        assert_eq!(captured.code, 0);
        assert_eq!(captured.out, "Executing add (base=5)\n");
    }

    #[test]
    fn test_resolved_options_reach_the_command() {
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        let registry = CommandRegistry::new()
            .with(
                CommandSpec::new("sum", move |inv| {
                    let total: i64 = inv.options.integer("base").unwrap_or(0)
                        + inv
                            .positionals
                            .iter()
                            .filter_map(|value| value.parse::<i64>().ok())
                            .sum::<i64>();
                    sink.set(Some(total));
                    0
                })
                .with_option(OptionSpec::integer("base").short('b')),
            )
            .with(CommandSpec::new("other", |_| 0));
        let dispatcher = Dispatcher::with_config(registry, config()).unwrap();

        let captured = run(&dispatcher, &["sum", "1", "-b", "10", "2", "-3"]);

        assert_eq!(captured.code, 0);
        assert_eq!(seen.get(), Some(10));
        assert_eq!(captured.out, "Executing sum (base=10)\n");
    }
}

// ============================================================================
// PRE-RUN HOOK AND ECHO
// ============================================================================

mod pre_run_and_echo {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pre_run_exit_skips_run() {
        let runs = Rc::new(Cell::new(0));
        let command = counting("check", 0, &runs).on_pre_run(|_| PreRun::Exit(42));
        let dispatcher =
            Dispatcher::with_config(CommandRegistry::new().with(command), config()).unwrap();

        let captured = run(&dispatcher, &["check"]);

        assert_eq!(captured.code, 42);
        assert_eq!(runs.get(), 0);
        assert!(captured.out.is_empty());
    }

    #[test]
    fn test_pre_run_continue_runs() {
        let runs = Rc::new(Cell::new(0));
        let command = counting("check", 5, &runs).on_pre_run(|inv| {
            if inv.positionals.is_empty() {
                PreRun::Exit(1)
            } else {
                PreRun::Continue
            }
        });
        let dispatcher =
            Dispatcher::with_config(CommandRegistry::new().with(command), config()).unwrap();

        assert_eq!(run(&dispatcher, &["check"]).code, 1);
        assert_eq!(runs.get(), 0);
        assert_eq!(run(&dispatcher, &["check", "x"]).code, 5);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_pre_run_sees_validated_arguments_only() {
        let runs = Rc::new(Cell::new(0));
        let hooks = Rc::new(Cell::new(0));
        let hook_counter = Rc::clone(&hooks);
        let command = counting("pair", 0, &runs)
            .with_required_arguments(2)
            .on_pre_run(move |_| {
                hook_counter.set(hook_counter.get() + 1);
                PreRun::Continue
            });
        let dispatcher =
            Dispatcher::with_config(CommandRegistry::new().with(command), config()).unwrap();

        assert_eq!(run(&dispatcher, &["pair", "one"]).code, HELP_EXIT_CODE);
        assert_eq!(hooks.get(), 0);
    }

    /// A hand-written command type, as opposed to a closure-backed spec.
    struct Quiet {
        runs: Rc<Cell<usize>>,
    }

    impl Command for Quiet {
        fn name(&self) -> &str {
            "quiet"
        }

        fn description(&self) -> &str {
            "Runs without the echo line"
        }

        fn skips_parsed_echo(&self) -> bool {
            true
        }

        fn run(&self, _invocation: &Invocation) -> Result<i32, HelpRequest> {
            self.runs.set(self.runs.get() + 1);
            Ok(0)
        }
    }

    #[test]
    fn test_command_can_skip_echo() {
        let runs = Rc::new(Cell::new(0));
        let registry = CommandRegistry::new().with(Quiet {
            runs: Rc::clone(&runs),
        });
        let dispatcher = Dispatcher::with_config(registry, config()).unwrap();

        let captured = run(&dispatcher, &["quiet"]);

        assert_eq!(captured.code, 0);
        assert_eq!(runs.get(), 1);
        assert!(captured.out.is_empty());
    }

    #[test]
    fn test_config_can_disable_echo() {
        let runs = Rc::new(Cell::new(0));
        let registry = CommandRegistry::new().with(counting("loud", 0, &runs));
        let dispatcher =
            Dispatcher::with_config(registry, config().with_echo_parsed(false)).unwrap();

        let captured = run(&dispatcher, &["loud"]);

        assert_eq!(captured.code, 0);
        assert!(captured.out.is_empty());
    }
}

// ============================================================================
// HELP REQUESTED BY A COMMAND
// ============================================================================

mod help_requests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn colour_dispatcher(runs: &Rc<Cell<usize>>) -> Dispatcher {
        let counter = Rc::clone(runs);
        let paint = CommandSpec::fallible("paint", move |inv| {
            counter.set(counter.get() + 1);
            match inv.arg(0) {
                Some("red" | "green") => Ok(0),
                Some(other) => Err(HelpRequest::new(format!("Unknown colour: {other}"))),
                None => Ok(1),
            }
        })
        .with_description("Paint the fence")
        .with_arguments_help("<colour>");
        let registry = CommandRegistry::new()
            .with(paint)
            .with(CommandSpec::new("other", |_| 0));
        Dispatcher::with_config(registry, config()).unwrap()
    }

    #[test]
    fn test_run_can_request_help() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = colour_dispatcher(&runs);

        let captured = run(&dispatcher, &["paint", "mauve"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(runs.get(), 1);
        assert_eq!(captured.out, "Executing paint\n");
        assert_eq!(
            captured.err,
            format!(
                "\nUnknown colour: mauve\n{}",
                detail_of(&dispatcher, "paint")
            )
        );
    }

    #[test]
    fn test_run_succeeds_without_request() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = colour_dispatcher(&runs);

        let captured = run(&dispatcher, &["paint", "red"]);

        assert_eq!(captured.code, 0);
        assert!(captured.err.is_empty());
    }

    #[test]
    fn test_pre_run_can_request_help() {
        let runs = Rc::new(Cell::new(0));
        let command = counting("deploy", 0, &runs)
            .with_description("Ship it")
            .on_pre_run(|inv| match inv.arg(0) {
                Some("prod" | "staging") => PreRun::Continue,
                _ => PreRun::Help("Pick an environment: prod or staging".to_string()),
            });
        let dispatcher =
            Dispatcher::with_config(CommandRegistry::new().with(command), config()).unwrap();

        let captured = run(&dispatcher, &["deploy", "moon"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(runs.get(), 0);
        assert!(captured.out.is_empty());
        assert_eq!(
            captured.err,
            format!(
                "\nPick an environment: prod or staging\n{}",
                detail_of(&dispatcher, "deploy")
            )
        );

        assert_eq!(run(&dispatcher, &["deploy", "prod"]).code, 0);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_empty_help_message_shows_only_help() {
        let command = CommandSpec::fallible("bare", |_| Err(HelpRequest::new("")))
            .with_description("Always needs help");
        let dispatcher = Dispatcher::with_config(
            CommandRegistry::new().with(command),
            config().with_echo_parsed(false),
        )
        .unwrap();

        let captured = run(&dispatcher, &["bare"]);

        assert_eq!(captured.code, HELP_EXIT_CODE);
        assert_eq!(captured.err, format!("\n{}", detail_of(&dispatcher, "bare")));
    }
}

// ============================================================================
// CONSTRUCTION AND IDEMPOTENCE
// ============================================================================

mod construction {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_name_is_rejected_before_dispatch() {
        let runs = Rc::new(Cell::new(0));
        let registry = CommandRegistry::new()
            .with(counting("fine", 0, &runs))
            .with(counting("", 0, &runs));

        let err = Dispatcher::new(registry).unwrap_err();

        assert_eq!(err, CommandError::EmptyName { position: 1 });
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert_eq!(
            Dispatcher::new(CommandRegistry::new()).unwrap_err(),
            CommandError::NoCommands
        );
    }

    #[test]
    fn test_dispatch_command_helper() {
        let commands: Vec<Box<dyn Command>> = vec![
            CommandSpec::new("one", |_| 1).with_required_arguments(1).boxed(),
            CommandSpec::new("two", |_| 2).boxed(),
        ];
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = dispatch_command(commands, &["one"], &mut out, &mut err, true).unwrap();

        assert_eq!(code, HELP_EXIT_CODE);
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("Expected usage: one\n"), "{err}");
    }

    #[test]
    fn test_dispatch_command_helper_rejects_empty_name() {
        let commands: Vec<Box<dyn Command>> = vec![CommandSpec::new("", |_| 0).boxed()];
        let mut out = Vec::new();
        let mut err = Vec::new();
        let args: [&str; 0] = [];

        assert_eq!(
            dispatch_command(commands, &args, &mut out, &mut err, false),
            Err(CommandError::EmptyName { position: 0 })
        );
        assert!(out.is_empty() && err.is_empty());
    }

    #[test]
    fn test_repeated_dispatch_is_idempotent() {
        let runs = Rc::new(Cell::new(0));
        let dispatcher = multi(&runs);

        for args in [
            vec!["cmd", "a", "b"],
            vec!["add", "-b", "2"],
            vec!["help", "add"],
            vec!["deploy"],
            vec!["nope"],
            vec![],
        ] {
            let first = run(&dispatcher, &args);
            let second = run(&dispatcher, &args);

            assert_eq!(first.code, second.code, "args: {args:?}");
            assert_eq!(first.out, second.out, "args: {args:?}");
            assert_eq!(first.err, second.err, "args: {args:?}");
        }
    }
}
