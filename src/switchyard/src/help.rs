//! Help and usage rendering.
//!
//! Three views are produced:
//!
//! - the summary of all commands (general help),
//! - the detailed help of one command (usage line plus option table),
//! - the one-line echo written right before a command runs.

use std::io::{self, Write};

use textwrap::Options;
use textwrap::core::display_width;

use crate::command::Command;
use crate::config::DispatchConfig;
use crate::options::ParsedOptions;

/// Label of the help pseudo-command row in the summary.
const HELP_ROW: &str = "help <name>";
const HELP_ROW_DESCRIPTION: &str = "For help with one of the above commands";

/// Renders help text with a fixed program name and wrap width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRenderer {
    program_name: String,
    width: usize,
}

impl HelpRenderer {
    /// Create a renderer.
    pub fn new(program_name: impl Into<String>, width: usize) -> Self {
        Self {
            program_name: program_name.into(),
            width,
        }
    }

    /// Create a renderer from dispatcher settings.
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(
            config.resolved_program_name(),
            config.effective_help_width(),
        )
    }

    /// Program name used in usage lines.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// List every command with its one-line description.
    pub fn render_summary(
        &self,
        commands: &[Box<dyn Command>],
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let column = commands
            .iter()
            .map(|command| display_width(command.name()))
            .chain(std::iter::once(display_width(HELP_ROW)))
            .max()
            .unwrap_or_default()
            + 1;

        writeln!(out)?;
        writeln!(out, "Available commands are:")?;
        writeln!(out)?;
        for command in commands {
            self.write_row(out, command.name(), command.description(), column)?;
        }
        writeln!(out)?;
        self.write_row(out, HELP_ROW, HELP_ROW_DESCRIPTION, column)?;
        writeln!(out)
    }

    /// Show the usage line, long description and options of one command.
    pub fn render_command_detail(
        &self,
        command: &dyn Command,
        out: &mut dyn Write,
        skip_program_name: bool,
    ) -> io::Result<()> {
        let has_options = !command.options().is_empty();

        writeln!(out)?;
        if command.description().is_empty() {
            writeln!(out, "'{}'", command.name())?;
        } else {
            writeln!(out, "'{}' - {}", command.name(), command.description())?;
        }
        writeln!(out)?;

        if let Some(long) = command.long_description().filter(|text| !text.trim().is_empty()) {
            for paragraph in long.trim().lines() {
                if paragraph.trim().is_empty() {
                    writeln!(out)?;
                    continue;
                }
                for line in textwrap::wrap(paragraph, self.width) {
                    writeln!(out, "{line}")?;
                }
            }
            writeln!(out)?;
        }

        let mut usage = String::from("Expected usage:");
        if !skip_program_name && !self.program_name.is_empty() {
            usage.push(' ');
            usage.push_str(&self.program_name);
        }
        usage.push(' ');
        usage.push_str(command.name());
        if has_options {
            usage.push_str(" <options>");
        }
        if let Some(arguments) = command.arguments_help() {
            usage.push(' ');
            usage.push_str(arguments);
        }
        writeln!(out, "{usage}")?;

        match command.required_argument_count() {
            Some(1) => writeln!(out, "Requires exactly 1 positional argument.")?,
            Some(count) => writeln!(out, "Requires exactly {count} positional arguments.")?,
            None => {}
        }

        if has_options {
            writeln!(out, "<options> available:")?;
            self.write_option_table(command, out)?;
        }
        writeln!(out)
    }

    /// Write the one-line echo of the command about to run.
    pub fn render_parsed_echo(
        command: &dyn Command,
        options: &ParsedOptions,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        if options.is_empty() {
            return writeln!(out, "Executing {}", command.name());
        }
        let resolved: Vec<String> = options
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        writeln!(out, "Executing {} ({})", command.name(), resolved.join(", "))
    }

    fn write_row(
        &self,
        out: &mut dyn Write,
        label: &str,
        description: &str,
        column: usize,
    ) -> io::Result<()> {
        let padding = column.saturating_sub(display_width(label));
        let prefix = format!("    {label}{}- ", " ".repeat(padding));
        if description.is_empty() {
            return writeln!(out, "{}", prefix.trim_end());
        }
        let indent = " ".repeat(display_width(&prefix));
        self.write_wrapped(out, description, &prefix, &indent)
    }

    fn write_option_table(&self, command: &dyn Command, out: &mut dyn Write) -> io::Result<()> {
        let labels: Vec<String> = command
            .options()
            .iter()
            .map(|spec| format!("  {}", spec.usage()))
            .collect();
        let widest = labels
            .iter()
            .map(|label| display_width(label))
            .max()
            .unwrap_or_default();
        let column = (widest + 2).min(self.width / 2);
        let indent = " ".repeat(column);

        for (spec, label) in command.options().iter().zip(&labels) {
            let mut text = spec.description.trim().to_string();
            if spec.required {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str("(required)");
            }
            if text.is_empty() {
                writeln!(out, "{label}")?;
                continue;
            }

            let label_width = display_width(label);
            if label_width + 2 > column {
                writeln!(out, "{label}")?;
                self.write_wrapped(out, &text, &indent, &indent)?;
            } else {
                let prefix = format!("{label}{}", " ".repeat(column - label_width));
                self.write_wrapped(out, &text, &prefix, &indent)?;
            }
        }
        Ok(())
    }

    fn write_wrapped(
        &self,
        out: &mut dyn Write,
        text: &str,
        initial_indent: &str,
        subsequent_indent: &str,
    ) -> io::Result<()> {
        let options = Options::new(self.width)
            .initial_indent(initial_indent)
            .subsequent_indent(subsequent_indent);
        for line in textwrap::wrap(text, options) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
