//! Modules bundled with the bot.

mod general;
mod notes;

pub use general::{AboutHandler, EchoHandler, GeneralModule, PingHandler};
pub use notes::{ForgetHandler, ListNotesHandler, NoteHandler, NotesModule};
