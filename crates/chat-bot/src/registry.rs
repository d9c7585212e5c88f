//! Command registry built from bot modules.

use crate::command::Command;
use crate::error::CommandResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the built-in command that lists every registered command.
pub const HELP_COMMAND: &str = "?";

/// Handler bound to a command name.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command. Replies go through [`Command::reply`].
    async fn execute(&self, command: &Command) -> CommandResult;
}

/// A command contributed by a module.
#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: Option<String>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A pluggable set of commands.
pub trait BotModule: Send + Sync {
    /// Module name (e.g., "notes").
    fn name(&self) -> &str;

    /// One-line summary for the startup log.
    fn description(&self) -> &str;

    /// Commands this module registers.
    fn commands(&self) -> Vec<CommandSpec>;
}

/// Registered command.
#[derive(Clone)]
pub struct CommandEntry {
    pub name: String,
    pub description: Option<String>,
    pub handler: Arc<dyn CommandHandler>,
    /// Module that registered the command.
    pub module: String,
}

impl CommandEntry {
    /// Line used by the command listing.
    pub fn help_line(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} : {}", self.name, desc),
            None => self.name.clone(),
        }
    }
}

/// Flat lookup table of every module's commands.
///
/// Built once at startup and read-only afterwards. When two modules register
/// the same name, the module loaded later wins and the entry keeps the
/// position of the first registration.
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Merge the commands of `modules` in load order.
    pub fn build(modules: &[Box<dyn BotModule>]) -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };

        for module in modules {
            info!("Loaded commands for module {}", module.name());
            info!("\t>{}", module.description());

            for spec in module.commands() {
                registry.insert(module.name(), spec);
            }
        }

        registry
    }

    fn insert(&mut self, module: &str, spec: CommandSpec) {
        let name = spec.name.trim().to_lowercase();
        if name.is_empty() || name == HELP_COMMAND {
            warn!(module = %module, command = %spec.name, "Skipping reserved command name");
            return;
        }

        let entry = CommandEntry {
            name: name.clone(),
            description: spec.description,
            handler: spec.handler,
            module: module.to_string(),
        };

        match self.index.get(&name) {
            Some(&slot) => {
                warn!(
                    command = %name,
                    previous = %self.entries[slot].module,
                    module = %module,
                    "Command registered twice, later module wins"
                );
                self.entries[slot] = entry;
            }
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Look up a command by its lowercase name.
    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn execute(&self, _command: &Command) -> CommandResult {
            Ok(())
        }
    }

    struct TestModule {
        name: &'static str,
        commands: Vec<(&'static str, Option<&'static str>)>,
    }

    impl BotModule for TestModule {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test module"
        }

        fn commands(&self) -> Vec<CommandSpec> {
            self.commands
                .iter()
                .map(|(name, desc)| {
                    let spec = CommandSpec::new(*name, Noop);
                    match desc {
                        Some(d) => spec.with_description(*d),
                        None => spec,
                    }
                })
                .collect()
        }
    }

    fn module(
        name: &'static str,
        commands: Vec<(&'static str, Option<&'static str>)>,
    ) -> Box<dyn BotModule> {
        Box::new(TestModule { name, commands })
    }

    #[test]
    fn test_build_merges_modules_in_order() {
        let registry = CommandRegistry::build(&[
            module("first", vec![("ping", Some("Replies pong")), ("echo", None)]),
            module("second", vec![("note", Some("Save a note"))]),
        ]);

        assert_eq!(registry.len(), 3);
        let names: Vec<&str> = registry.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ping", "echo", "note"]);
        assert_eq!(registry.get("note").unwrap().module, "second");
    }

    #[test]
    fn test_later_module_wins_collision() {
        let registry = CommandRegistry::build(&[
            module("first", vec![("ping", Some("first ping")), ("echo", None)]),
            module("second", vec![("ping", None)]),
        ]);

        assert_eq!(registry.len(), 2);
        let entry = registry.get("ping").unwrap();
        assert_eq!(entry.module, "second");
        assert!(entry.description.is_none());

        // Overwritten entry keeps its original position
        let names: Vec<&str> = registry.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ping", "echo"]);
    }

    #[test]
    fn test_names_are_lowercased() {
        let registry = CommandRegistry::build(&[module("m", vec![("Ping", None)])]);

        assert!(registry.contains("ping"));
        assert!(!registry.contains("Ping"));
    }

    #[test]
    fn test_reserved_names_skipped() {
        let registry =
            CommandRegistry::build(&[module("m", vec![("?", None), ("  ", None), ("ok", None)])]);

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("?"));
        assert!(registry.contains("ok"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = CommandRegistry::build(&[]);
        assert!(registry.is_empty());
        assert!(registry.get("ping").is_none());
    }

    #[test]
    fn test_help_line() {
        let registry = CommandRegistry::build(&[module(
            "m",
            vec![("ping", Some("Replies pong")), ("echo", None)],
        )]);

        assert_eq!(registry.get("ping").unwrap().help_line(), "ping : Replies pong");
        assert_eq!(registry.get("echo").unwrap().help_line(), "echo");
    }
}
