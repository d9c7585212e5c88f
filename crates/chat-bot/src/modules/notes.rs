//! Personal notes kept in the note store.

use crate::command::Command;
use crate::error::{CommandError, CommandResult};
use crate::registry::{BotModule, CommandHandler, CommandSpec};
use async_trait::async_trait;
use bot_store::NoteStore;
use std::sync::Arc;
use tracing::info;

/// Store scope for the author of `command`, separate per server.
pub fn scope_for(command: &Command) -> String {
    let server = command.server().map(|s| s.id.as_str()).unwrap_or("dm");
    format!("{}:{}", server, command.author().id)
}

pub struct NotesModule {
    store: Arc<NoteStore>,
}

impl NotesModule {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }
}

impl BotModule for NotesModule {
    fn name(&self) -> &str {
        "notes"
    }

    fn description(&self) -> &str {
        "Keep short personal notes"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("note", NoteHandler::new(self.store.clone()))
                .with_description("Save a note"),
            CommandSpec::new("notes", ListNotesHandler::new(self.store.clone()))
                .with_description("List your notes"),
            CommandSpec::new("forget", ForgetHandler::new(self.store.clone()))
                .with_description("Delete all your notes"),
        ]
    }
}

pub struct NoteHandler {
    store: Arc<NoteStore>,
}

impl NoteHandler {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for NoteHandler {
    async fn execute(&self, command: &Command) -> CommandResult {
        let text = command.argument();
        if text.is_empty() {
            return Err(CommandError::InvalidArguments("note needs some text".into()));
        }

        let count = self
            .store
            .add_note(&scope_for(command), &command.author().tag, &text)
            .await?;

        command.reply(&format!("Noted. You have {} note(s).", count)).await?;
        Ok(())
    }
}

pub struct ListNotesHandler {
    store: Arc<NoteStore>,
}

impl ListNotesHandler {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for ListNotesHandler {
    async fn execute(&self, command: &Command) -> CommandResult {
        let reply = match self.store.get(&scope_for(command)).await? {
            Some(book) if !book.notes.is_empty() => book
                .notes
                .iter()
                .enumerate()
                .map(|(i, note)| format!("{}. {}", i + 1, note.content))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => "You have no notes.".to_string(),
        };

        command.reply(&reply).await?;
        Ok(())
    }
}

pub struct ForgetHandler {
    store: Arc<NoteStore>,
}

impl ForgetHandler {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for ForgetHandler {
    async fn execute(&self, command: &Command) -> CommandResult {
        let scope = scope_for(command);
        let reply = if self.store.clear(&scope).await? {
            info!("Forgot notes for {}", command.author().tag);
            "Your notes are gone."
        } else {
            "You have no notes."
        };

        command.reply(reply).await?;
        Ok(())
    }
}
