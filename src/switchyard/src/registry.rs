//! Ordered registry of commands.

use crate::command::Command;
use crate::matcher::{match_command, names_match};

/// Registry of commands available to a dispatcher.
///
/// Commands are kept in registration order, which is also the order used for
/// matching and for the help summary. Names are not required to be unique;
/// lookups return the first registered match.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command, builder style.
    pub fn with(mut self, command: impl Command + 'static) -> Self {
        self.register(command);
        self
    }

    /// Register a command at the end of the registry.
    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands.push(Box::new(command));
    }

    /// Register several boxed commands, keeping their order.
    pub fn register_all(&mut self, commands: impl IntoIterator<Item = Box<dyn Command>>) {
        self.commands.extend(commands);
    }

    /// Get a command by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&dyn Command> {
        match_command(&self.commands, Some(name))
    }

    /// Check if a command exists by name, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.commands
            .iter()
            .any(|command| names_match(command.name(), name))
    }

    /// Get all command names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|command| command.name()).collect()
    }

    /// Get the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove all commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Reorder commands alphabetically by lowercase name.
    ///
    /// The sort is stable, so duplicate names keep their relative order.
    pub fn sort_by_name(&mut self) {
        self.commands
            .sort_by_cached_key(|command| command.name().to_lowercase());
    }

    /// Create an iterator over all commands.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|command| &**command as &dyn Command)
    }

    /// Borrow the commands as a slice.
    pub fn as_slice(&self) -> &[Box<dyn Command>] {
        &self.commands
    }
}

impl IntoIterator for CommandRegistry {
    type Item = Box<dyn Command>;
    type IntoIter = std::vec::IntoIter<Box<dyn Command>>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl FromIterator<Box<dyn Command>> for CommandRegistry {
    fn from_iter<I: IntoIterator<Item = Box<dyn Command>>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.register_all(iter);
        registry
    }
}

impl From<Vec<Box<dyn Command>>> for CommandRegistry {
    fn from(commands: Vec<Box<dyn Command>>) -> Self {
        Self { commands }
    }
}
