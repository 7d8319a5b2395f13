use parking_lot::Mutex;

use super::{prepare, put_message, slice, NoteMap, NoteStore, StoreResult};
use crate::models::note::Note;

/// Notes kept in process memory only.
#[derive(Default)]
pub struct MemoryStore {
    notes: Mutex<NoteMap>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.notes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.lock().is_empty()
    }
}

impl NoteStore for MemoryStore {
    fn fetch(&self, start: u64, limit: usize) -> StoreResult<NoteMap> {
        Ok(slice(&self.notes.lock(), start, limit))
    }

    fn get(&self, id: u64) -> StoreResult<Option<Note>> {
        Ok(self.notes.lock().get(&id).cloned())
    }

    fn set(&self, note: Note) -> StoreResult<u64> {
        let mut notes = self.notes.lock();
        let (id, note) = prepare(&notes, note);
        notes.insert(id, note);
        log::debug!("stored note {} in memory", id);
        Ok(id)
    }

    fn put_message(&self, id: u64, message: String) -> StoreResult<bool> {
        Ok(put_message(&mut self.notes.lock(), id, message))
    }

    fn remove(&self, id: u64) -> StoreResult<bool> {
        Ok(self.notes.lock().remove(&id).is_some())
    }
}
