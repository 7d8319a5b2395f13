//! Note storage.
//!
//! Every backing medium implements [`NoteStore`]. The helpers in this module
//! hold the allocation rules shared by all of them: ids are the smallest free
//! non-negative integer, secrets are assigned once and kept forever after.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use derive_more::Display;
use rand::{rngs::OsRng, RngCore};
use std::{collections::BTreeMap, path::Path, sync::Arc, time::Duration};

use crate::{config::BackendKind, models::note::Note};

pub mod file;
pub mod memory;
pub mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::SessionStores;

pub const SECRET_BYTES: usize = 64;

pub type NoteMap = BTreeMap<u64, Note>;
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "note storage io error: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "note storage is not valid json: {}", _0)]
    Serde(serde_json::Error),
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> StoreError {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> StoreError {
        StoreError::Serde(err)
    }
}

/// CRUD access to one collection of notes.
///
/// Implementations hold one lock over the whole read-modify-persist sequence
/// of `set`, `put_message` and `remove`, so concurrent callers never race on
/// id allocation or on create-versus-update.
pub trait NoteStore: Send + Sync {
    /// Up to `limit` notes with `id >= start`, ascending by id.
    fn fetch(&self, start: u64, limit: usize) -> StoreResult<NoteMap>;
    fn get(&self, id: u64) -> StoreResult<Option<Note>>;
    /// Inserts or overwrites `note`, filling in a missing id or secret, and
    /// returns the id it was stored under.
    fn set(&self, note: Note) -> StoreResult<u64>;
    /// Replaces the message of the note at `id`, or creates the note there
    /// when the id is free. Returns `true` when a note was created.
    fn put_message(&self, id: u64, message: String) -> StoreResult<bool>;
    /// Returns whether a note was actually removed.
    fn remove(&self, id: u64) -> StoreResult<bool>;
}

/// The storage wired into the server.
pub enum Backend {
    /// One collection for every client.
    Shared(Arc<dyn NoteStore>),
    /// One collection per session cookie.
    Session(Arc<SessionStores>),
}

impl Backend {
    pub fn open(
        kind: BackendKind,
        data_path: &Path,
        session_idle_timeout: Duration,
    ) -> StoreResult<Backend> {
        match kind {
            BackendKind::File => Ok(Backend::Shared(Arc::new(FileStore::open(data_path)?))),
            BackendKind::Memory => Ok(Backend::Shared(Arc::new(MemoryStore::default()))),
            BackendKind::Session => Ok(Backend::Session(Arc::new(SessionStores::new(
                session_idle_timeout,
            )))),
        }
    }
}

pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Smallest non-negative id with no note stored under it.
pub(crate) fn next_free_id(notes: &NoteMap) -> u64 {
    let mut candidate = 0;
    for id in notes.keys() {
        if *id != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

pub(crate) fn slice(notes: &NoteMap, start: u64, limit: usize) -> NoteMap {
    notes
        .range(start..)
        .take(limit)
        .map(|(id, note)| (*id, note.clone()))
        .collect()
}

/// Fills in id and secret before `note` goes into `notes`.
///
/// A note overwriting an existing entry keeps that entry's secret.
pub(crate) fn prepare(notes: &NoteMap, mut note: Note) -> (u64, Note) {
    let id = match note.id {
        Some(id) => id,
        None => next_free_id(notes),
    };
    note.id = Some(id);

    if note.secret.is_none() {
        note.secret = match notes.get(&id).and_then(|stored| stored.secret.clone()) {
            Some(secret) => Some(secret),
            None => Some(generate_secret()),
        };
    }

    (id, note)
}

/// Create-or-update of one note inside a single lock holder.
pub(crate) fn put_message(notes: &mut NoteMap, id: u64, message: String) -> bool {
    match notes.get_mut(&id) {
        Some(note) => {
            note.message = message;
            false
        }
        None => {
            let (id, note) = prepare(notes, Note::with_id(id, message));
            notes.insert(id, note);
            true
        }
    }
}
