pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod render;
pub mod session;
pub mod storage;

pub use config::{Config, Project};
pub use entity::{Collection, Note};
pub use error::{MarknoteError, Result};
pub use render::{HtmlRenderer, MarkdownRenderer};
pub use session::SessionController;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, NoteStore};
