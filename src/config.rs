//! Project directory discovery and per-project configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MarknoteError, Result};
use crate::storage::{FileStorage, NoteStore};

pub const MARKNOTE_DIR: &str = ".marknote";
pub const CONFIG_FILE: &str = "config.json";
pub const STORAGE_DIR: &str = "storage";

/// Settings read from `.marknote/config.json`. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage slot holding the note collection
    pub storage_key: String,
    /// Text shown in the editor for a new, unsaved note
    pub placeholder: String,
    /// Body of the informational panel
    pub info_text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: "markdownNotes".to_string(),
            placeholder: "Start writing a new note!".to_string(),
            info_text: "marknote keeps markdown notes in this project's .marknote/ directory.\n\
                        Notes are listed newest first; edit them with `marknote edit`."
                .to_string(),
        }
    }
}

impl Config {
    /// Read the config file in `project_dir`, or defaults if there is none
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(project_dir.join(CONFIG_FILE), data)?;
        Ok(())
    }
}

/// An initialized `.marknote/` directory and its configuration
#[derive(Debug)]
pub struct Project {
    dir: PathBuf,
    pub config: Config,
}

impl Project {
    /// Create `.marknote/` under `root` with a default config
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(MARKNOTE_DIR);
        if dir.exists() {
            return Err(MarknoteError::AlreadyInitialized);
        }

        fs::create_dir_all(dir.join(STORAGE_DIR))?;
        let config = Config::default();
        config.save(&dir)?;
        tracing::info!(dir = %dir.display(), "initialized project");

        Ok(Self { dir, config })
    }

    /// Open the project rooted at `root`
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(MARKNOTE_DIR);
        if !dir.is_dir() {
            return Err(MarknoteError::NotInitialized);
        }
        let config = Config::load(&dir)?;
        Ok(Self { dir, config })
    }

    /// Walk up from `start` to the nearest directory containing `.marknote/`.
    /// Falls back to `start` itself.
    pub fn find_root(start: &Path) -> PathBuf {
        let mut current = start;
        loop {
            if current.join(MARKNOTE_DIR).is_dir() {
                return current.to_path_buf();
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return start.to_path_buf(),
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn note_store(&self) -> Result<NoteStore<FileStorage>> {
        let storage = FileStorage::open(&self.dir.join(STORAGE_DIR))?;
        Ok(NoteStore::new(storage, self.config.storage_key.clone()))
    }
}
