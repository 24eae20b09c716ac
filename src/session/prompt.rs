use std::fmt;

/// Messages shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved { title: String },
    Deleted { title: String },
    EmptyTitle,
    /// Stored notes were unreadable; the raw data was copied to `backup_key`
    StorageRecovered { backup_key: String },
    /// Stored notes could not be read at all; nothing is saved over them
    StorageUnavailable { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Saved { title } => write!(f, "Note saved: {}", title),
            Notice::Deleted { title } => write!(f, "Note deleted: {}", title),
            Notice::EmptyTitle => write!(f, "Please enter a note title."),
            Notice::StorageRecovered { backup_key } => write!(
                f,
                "Stored notes could not be read and were reset. The original data was kept in '{}'.",
                backup_key
            ),
            Notice::StorageUnavailable { reason } => write!(
                f,
                "Stored notes could not be read ({}). Changes cannot be saved until the storage is readable.",
                reason
            ),
        }
    }
}

/// Blocking user dialogs
pub trait Prompter {
    /// Ask a yes/no question. `false` cancels the pending action.
    fn confirm(&mut self, question: &str) -> bool;
    fn alert(&mut self, notice: &Notice);
}
