use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::KeyValueStorage;
use crate::entity::{sort_by_last_modified, Collection, Note};
use crate::error::{MarknoteError, Result};

/// Version written into every persisted blob
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PersistedRef<'a> {
    version: u32,
    notes: &'a Collection,
}

/// Accepted blob shapes. `Legacy` is the bare `id -> note` map written before
/// the envelope existed.
#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedBlob {
    Versioned { version: u32, notes: Collection },
    Legacy(Collection),
}

fn parse_blob(raw: &str) -> std::result::Result<Collection, String> {
    let blob: Option<PersistedBlob> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    match blob {
        None => Ok(Collection::new()),
        Some(PersistedBlob::Versioned { version, notes }) if version == FORMAT_VERSION => Ok(notes),
        Some(PersistedBlob::Versioned { version, .. }) => {
            Err(format!("unsupported format version {}", version))
        }
        Some(PersistedBlob::Legacy(notes)) => Ok(notes),
    }
}

/// The note collection, persisted as one serialized blob in one storage slot.
///
/// Every write replaces the whole collection, so each mutating call is a
/// load-modify-save over the full blob.
pub struct NoteStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> NoteStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Slot that receives the first copy of an unreadable blob
    pub fn backup_key(&self) -> String {
        format!("{}.corrupt", self.key)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the collection, reporting unreadable data as `CorruptData`.
    ///
    /// The unreadable bytes are copied to a backup slot before the error is
    /// returned. The error's `backup` names that slot, or is `None` when the
    /// copy failed. Any other storage error is returned as is.
    pub fn load_checked(&self) -> Result<Collection> {
        let reason = match self.storage.get_item(&self.key) {
            Ok(None) => return Ok(Collection::new()),
            Ok(Some(raw)) => match parse_blob(&raw) {
                Ok(notes) => {
                    tracing::debug!(key = %self.key, count = notes.len(), "loaded notes");
                    return Ok(notes);
                }
                Err(reason) => reason,
            },
            Err(MarknoteError::CorruptData { reason, .. }) => reason,
            Err(e) => return Err(e),
        };

        let backup = match self.backup_corrupt() {
            Ok(backup) => {
                tracing::warn!(key = %self.key, backup = %backup, "stored notes are corrupt; kept a copy");
                Some(backup)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to back up corrupt notes");
                None
            }
        };
        Err(MarknoteError::CorruptData {
            key: self.key.clone(),
            reason,
            backup,
        })
    }

    /// Load the collection. Missing, unreadable or corrupt data yields an
    /// empty collection.
    pub fn load_all(&self) -> Collection {
        match self.load_checked() {
            Ok(notes) => notes,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "treating stored notes as empty");
                Collection::new()
            }
        }
    }

    /// Load ahead of a write. Corrupt data counts as empty only once a copy of
    /// it exists; every other failure stops the write.
    fn load_for_write(&self) -> Result<Collection> {
        match self.load_checked() {
            Err(MarknoteError::CorruptData {
                backup: Some(_), ..
            }) => Ok(Collection::new()),
            other => other,
        }
    }

    /// Overwrite the persisted collection
    pub fn save_all(&self, notes: &Collection) -> Result<()> {
        let blob = serde_json::to_string(&PersistedRef {
            version: FORMAT_VERSION,
            notes,
        })?;
        self.storage.set_item(&self.key, &blob)?;
        tracing::debug!(key = %self.key, count = notes.len(), "saved notes");
        Ok(())
    }

    /// Insert or replace the note stored under `note.id`
    pub fn upsert(&self, note: Note) -> Result<()> {
        let mut notes = self.load_for_write()?;
        notes.insert(note.id.clone(), note);
        self.save_all(&notes)
    }

    /// Replace a stored note only if its revision is still `expected`.
    ///
    /// The written note gets revision `expected + 1`.
    pub fn update_if_current(&self, mut note: Note, expected: u64) -> Result<Note> {
        let mut notes = self.load_for_write()?;
        let found = match notes.get(&note.id) {
            Some(stored) => stored.revision,
            None => return Err(MarknoteError::NoteNotFound(note.id)),
        };
        if found != expected {
            return Err(MarknoteError::Conflict {
                id: note.id,
                expected,
                found,
            });
        }

        note.revision = expected + 1;
        notes.insert(note.id.clone(), note.clone());
        self.save_all(&notes)?;
        Ok(note)
    }

    /// Delete a note. Returns whether it existed; an absent id is not an error.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut notes = self.load_for_write()?;
        if notes.remove(id).is_none() {
            tracing::debug!(id, "remove: note already absent");
            return Ok(false);
        }
        self.save_all(&notes)?;
        tracing::info!(id, "removed note");
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.load_all().remove(id)
    }

    /// All notes, most recently modified first
    pub fn list(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.load_all().into_values().collect();
        sort_by_last_modified(&mut notes);
        notes
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let notes = self.load_all();
        if notes.contains_key(input) {
            return Ok(input.to_string());
        }

        let mut matches = notes.keys().filter(|id| id.starts_with(input));
        match (matches.next(), matches.next()) {
            (Some(id), None) if !input.is_empty() => Ok(id.clone()),
            (Some(_), _) => Err(MarknoteError::AmbiguousId(input.to_string())),
            (None, _) => Err(MarknoteError::NoteNotFound(input.to_string())),
        }
    }

    /// Copy the slot's bytes to a backup slot and return that slot's key.
    ///
    /// The first copy goes to [`backup_key`](Self::backup_key). A backup
    /// holding other bytes is never replaced: the copy then goes to a slot
    /// suffixed with a digest of its bytes, so repeated loads of the same
    /// data store it once.
    fn backup_corrupt(&self) -> Result<String> {
        let raw = self.storage.get_bytes(&self.key)?.unwrap_or_default();
        let primary = self.backup_key();
        let target = match self.storage.get_bytes(&primary)? {
            None => primary,
            Some(existing) if existing == raw => return Ok(primary),
            Some(_) => {
                let digest = hex::encode(Sha256::digest(&raw));
                format!("{}-{}", primary, &digest[..16])
            }
        };

        if self.storage.get_bytes(&target)?.as_deref() != Some(raw.as_slice()) {
            self.storage.set_bytes(&target, &raw)?;
        }
        Ok(target)
    }
}
