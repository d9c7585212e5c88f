//! Note storage shared with bot modules.
//!
//! The bot core never touches this crate; it only opens the store at
//! startup and hands it to the modules that need it.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::NoteStore;
pub use types::*;
