mod kv;
mod note_store;

pub use kv::{FileStorage, KeyValueStorage, MemoryStorage};
pub use note_store::{NoteStore, FORMAT_VERSION};
