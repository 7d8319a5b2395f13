use parking_lot::Mutex;
use std::{fs, io, path::PathBuf};

use super::{prepare, put_message, slice, NoteMap, NoteStore, StoreResult};
use crate::models::note::Note;

/// Notes persisted as a single json snapshot, rewritten on every mutation.
pub struct FileStore {
    path: PathBuf,
    notes: Mutex<NoteMap>,
}

impl FileStore {
    /// Loads the snapshot at `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<FileStore> {
        let path = path.into();
        let notes = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<NoteMap>(&bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => NoteMap::new(),
            Err(err) => return Err(err.into()),
        };
        log::info!("loaded {} notes from {}", notes.len(), path.display());

        Ok(FileStore {
            path,
            notes: Mutex::new(notes),
        })
    }

    fn flush(&self, notes: &NoteMap) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec(notes)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies `mutate` to a copy of the notes and swaps it in only once the
    /// copy is on disk.
    fn commit<T>(&self, mutate: impl FnOnce(&mut NoteMap) -> T) -> StoreResult<T> {
        let mut notes = self.notes.lock();
        let mut next = notes.clone();
        let out = mutate(&mut next);

        if let Err(err) = self.flush(&next) {
            log::error!("failed to write {}: {}", self.path.display(), err);
            return Err(err);
        }

        *notes = next;
        Ok(out)
    }
}

impl NoteStore for FileStore {
    fn fetch(&self, start: u64, limit: usize) -> StoreResult<NoteMap> {
        Ok(slice(&self.notes.lock(), start, limit))
    }

    fn get(&self, id: u64) -> StoreResult<Option<Note>> {
        Ok(self.notes.lock().get(&id).cloned())
    }

    fn set(&self, note: Note) -> StoreResult<u64> {
        let id = self.commit(|notes| {
            let (id, note) = prepare(notes, note);
            notes.insert(id, note);
            id
        })?;
        log::debug!("stored note {} in {}", id, self.path.display());
        Ok(id)
    }

    fn put_message(&self, id: u64, message: String) -> StoreResult<bool> {
        self.commit(|notes| put_message(notes, id, message))
    }

    fn remove(&self, id: u64) -> StoreResult<bool> {
        if !self.notes.lock().contains_key(&id) {
            return Ok(false);
        }
        self.commit(|notes| notes.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    #[test]
    fn missing_snapshot_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let store = FileStore::open(&path).unwrap();

        assert!(store.fetch(0, 10).unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn reopened_store_sees_every_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let secret = {
            let store = FileStore::open(&path).unwrap();
            store.set(Note::new("first".to_string())).unwrap();
            store.set(Note::new("second".to_string())).unwrap();
            store.set(Note::new("third".to_string())).unwrap();
            store.remove(1).unwrap();
            store.get(0).unwrap().unwrap().secret
        };

        let store = FileStore::open(&path).unwrap();
        let notes = store.fetch(0, 10).unwrap();
        assert_eq!(notes.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(notes[&0].message, "first");
        assert_eq!(notes[&0].secret, secret);
        assert_eq!(notes[&2].message, "third");

        assert_eq!(store.set(Note::new("refill".to_string())).unwrap(), 1);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, b"definitely not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Serde(_))));
    }

    #[test]
    fn failed_write_leaves_notes_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("blocked").join("notes.json")).unwrap();
        let id = store.set(Note::new("kept".to_string())).unwrap();

        // a plain file where the snapshot directory should be
        fs::remove_dir_all(dir.path().join("blocked")).unwrap();
        fs::write(dir.path().join("blocked"), b"").unwrap();

        assert!(matches!(
            store.set(Note::new("lost".to_string())),
            Err(StoreError::Io(_))
        ));
        assert!(store.remove(id).is_err());

        let notes = store.fetch(0, 10).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[&id].message, "kept");
    }

    #[test]
    fn removing_a_missing_note_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let store = FileStore::open(&path).unwrap();

        assert!(!store.remove(3).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn racing_put_and_delete_persist_the_same_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        for _ in 0..50 {
            let store = Arc::new(FileStore::open(&path).unwrap());
            store.set(Note::with_id(0, "original".to_string())).unwrap();
            let barrier = Arc::new(Barrier::new(2));

            let put = {
                let (store, barrier) = (store.clone(), barrier.clone());
                thread::spawn(move || {
                    barrier.wait();
                    store.put_message(0, "upd".to_string()).unwrap()
                })
            };
            let delete = {
                let (store, barrier) = (store.clone(), barrier.clone());
                thread::spawn(move || {
                    barrier.wait();
                    store.remove(0).unwrap()
                })
            };

            let created = put.join().unwrap();
            assert!(delete.join().unwrap());

            let live = store.get(0).unwrap();
            let on_disk = FileStore::open(&path).unwrap().get(0).unwrap();
            assert_eq!(live, on_disk);
            assert_eq!(live.is_some(), created);

            store.remove(0).unwrap();
        }
    }
}
