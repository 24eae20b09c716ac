use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarknoteError {
    #[error("Not in a marknote project. Run 'marknote init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .marknote/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Ambiguous note id '{0}' matches more than one note")]
    AmbiguousId(String),

    #[error("Note title must not be empty")]
    EmptyTitle,

    #[error("Note {id} was changed elsewhere (expected revision {expected}, found {found})")]
    Conflict { id: String, expected: u64, found: u64 },

    #[error("Use --force to delete in non-interactive mode")]
    ConfirmationRequired,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// `backup` names the slot holding a copy of the unreadable data, if one
    /// was made
    #[error("Corrupt data in storage slot '{key}': {reason}")]
    CorruptData {
        key: String,
        reason: String,
        backup: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarknoteError>;
