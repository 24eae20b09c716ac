// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown in lists for notes whose stored title is empty
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// Bumped on every save. Notes written before revisions existed read as 0.
    #[serde(default)]
    pub revision: u64,
}

impl Note {
    pub fn new(id: String, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            content,
            created_at: now,
            last_modified: now,
            revision: 1,
        }
    }

    /// Title for list display
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Copy of this note with new title/content, a fresh `last_modified`
    /// and the next revision. `created_at` and `id` are kept.
    pub fn revised(&self, title: String, content: String) -> Self {
        Self {
            id: self.id.clone(),
            title,
            content,
            created_at: self.created_at,
            last_modified: Utc::now(),
            revision: self.revision + 1,
        }
    }
}
