//! Command name matching.

use crate::command::Command;

/// Find the first command whose name equals `token`, ignoring case.
///
/// Returns `None` when `token` is absent or nothing matches. Duplicate names
/// are not an error: the earliest command in `commands` wins.
pub fn match_command<'a>(
    commands: &'a [Box<dyn Command>],
    token: Option<&str>,
) -> Option<&'a dyn Command> {
    let token = token?;
    commands
        .iter()
        .map(|command| &**command)
        .find(|command| names_match(command.name(), token))
}

/// Case-insensitive name comparison.
pub fn names_match(name: &str, token: &str) -> bool {
    name.to_lowercase() == token.to_lowercase()
}
