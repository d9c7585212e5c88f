//! In-memory note storage with TTL expiration.

use crate::error::StoreError;
use crate::types::*;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Entry in the store with expiration tracking.
struct NoteBookEntry {
    book: NoteBook,
    expires_at: std::time::Instant,
}

type Books = RwLock<HashMap<String, NoteBookEntry>>;

/// Note store handed to bot modules.
///
/// Scopes that see no activity for the configured TTL are dropped by a
/// background task.
#[derive(Clone)]
pub struct NoteStore {
    books: Arc<Books>,
    location: Option<StoreLocation>,
    max_notes: usize,
    ttl: Duration,
}

impl NoteStore {
    /// Open the store at `url`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(url: &str, max_notes: usize, ttl: Duration) -> Result<Self, StoreError> {
        let location = StoreLocation::parse(url)?;
        let StoreLocation::Memory { name } = &location;
        info!(
            "Note store '{}' ready (max_notes={}, ttl={:?})",
            name, max_notes, ttl
        );
        Ok(Self::build(Some(location), max_notes, ttl))
    }

    /// A store with no verified backing location.
    ///
    /// Used when [`NoteStore::connect`] failed and the bot keeps running.
    pub fn detached(max_notes: usize, ttl: Duration) -> Self {
        info!("Note store running detached (max_notes={}, ttl={:?})", max_notes, ttl);
        Self::build(None, max_notes, ttl)
    }

    fn build(location: Option<StoreLocation>, max_notes: usize, ttl: Duration) -> Self {
        let store = Self {
            books: Arc::new(RwLock::new(HashMap::new())),
            location,
            max_notes,
            ttl,
        };

        // Spawn cleanup task; it ends once the last store handle is dropped
        tokio::spawn(Self::cleanup_loop(Arc::downgrade(&store.books)));

        store
    }

    /// Background task that periodically removes expired scopes.
    async fn cleanup_loop(weak: Weak<Books>) {
        let cleanup_interval = Duration::from_secs(60);

        loop {
            tokio::time::sleep(cleanup_interval).await;

            let Some(shared) = weak.upgrade() else {
                debug!("Note store dropped, stopping cleanup");
                return;
            };

            let now = std::time::Instant::now();
            let mut books = shared.write().await;
            let before_count = books.len();

            books.retain(|_, entry| entry.expires_at > now);

            let removed = before_count - books.len();
            if removed > 0 {
                debug!("Cleaned up {} expired note scopes", removed);
            }
        }
    }

    /// Whether the store was opened from a valid location.
    pub fn is_verified(&self) -> bool {
        self.location.is_some()
    }

    /// Get the notes for a scope.
    #[instrument(skip(self))]
    pub async fn get(&self, scope: &str) -> Result<Option<NoteBook>, StoreError> {
        let books = self.books.read().await;
        let now = std::time::Instant::now();

        Ok(books
            .get(scope)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.book.clone()))
    }

    /// Add a note to a scope, creating it if needed. Returns the note count.
    #[instrument(skip(self, content))]
    pub async fn add_note(
        &self,
        scope: &str,
        author_tag: &str,
        content: &str,
    ) -> Result<usize, StoreError> {
        let mut books = self.books.write().await;
        let now = std::time::Instant::now();
        let expires_at = now + self.ttl;

        let entry = books
            .entry(scope.to_string())
            .or_insert_with(|| NoteBookEntry {
                book: NoteBook::new(scope),
                expires_at,
            });

        // An expired scope that the cleanup task has not reached yet starts over.
        if entry.expires_at <= now {
            entry.book = NoteBook::new(scope);
        }
        entry.expires_at = expires_at;

        entry.book.push(Note::new(content, author_tag));
        entry.book.trim(self.max_notes);

        debug!("Added note for {} (total: {})", scope, entry.book.notes.len());

        Ok(entry.book.notes.len())
    }

    /// Remove all notes in a scope.
    #[instrument(skip(self))]
    pub async fn clear(&self, scope: &str) -> Result<bool, StoreError> {
        let mut books = self.books.write().await;
        let removed = books.remove(scope).is_some();

        if removed {
            info!("Cleared notes for {}", scope);
        }

        Ok(removed)
    }

}
