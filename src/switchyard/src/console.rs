//! Interactive console mode.
//!
//! Reads command lines from an input stream and dispatches each one over the
//! same command set, until `exit`/`quit` or end of input.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::dispatch::Dispatcher;
use crate::matcher::names_match;

/// Words that end a console session.
const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

impl Dispatcher {
    /// Run an interactive session reading lines from `input`.
    ///
    /// Each non-empty line is split like a shell would split it and then
    /// dispatched. Returns the exit code of the last dispatched line, or `0`
    /// if no line was dispatched.
    pub fn run_console<R: BufRead>(
        &self,
        mut input: R,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32 {
        let mut last_code = 0;
        let mut line = String::new();

        loop {
            if let Err(e) = write!(out, "{}", self.config().console_prompt).and_then(|()| out.flush())
            {
                warn!(error = %e, "failed to write console prompt");
            }

            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "failed to read console input");
                    break;
                }
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if EXIT_WORDS.iter().any(|word| names_match(trimmed, word)) {
                debug!("console session ended by user");
                break;
            }

            let Some(tokens) = shlex::split(trimmed) else {
                if let Err(e) = writeln!(err, "Unbalanced quotes in input: {trimmed}") {
                    warn!(error = %e, "failed to write console error");
                }
                continue;
            };
            if tokens.is_empty() {
                continue;
            }

            last_code = self.dispatch(&tokens, out, err);
            debug!(code = last_code, "console line dispatched");
        }

        last_code
    }
}
