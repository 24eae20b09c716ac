//! Editor session: which note is loaded, which view is visible, and the
//! new/select/save/delete protocol against the note store.

mod prompt;
mod surface;

pub use prompt::{Notice, Prompter};
pub use surface::{BufferSurface, ChangeListener, TextSurface};

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::{generate_id, Note};
use crate::error::{MarknoteError, Result};
use crate::render::MarkdownRenderer;
use crate::storage::{KeyValueStorage, NoteStore};

pub const DELETE_QUESTION: &str = "Do you really want to delete this note?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Editor,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Blank editing surface, nothing selected
    NoEditingSession,
    EditingExisting(String),
}

/// One row of the rendered note list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteListEntry {
    pub id: String,
    pub title: String,
    pub last_modified: DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Updated(String),
    /// Empty title; nothing was written
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(String),
    /// The user declined the confirmation
    Cancelled,
    /// No note is loaded
    NotPermitted,
}

struct Loaded {
    id: String,
    revision: u64,
}

struct Preview {
    renderer: Option<Box<dyn MarkdownRenderer>>,
    html: Option<String>,
}

impl Preview {
    fn refresh(&mut self, source: &str) {
        match &self.renderer {
            Some(renderer) => self.html = Some(renderer.render(source)),
            None => tracing::warn!("no markdown renderer; preview skipped"),
        }
    }
}

pub struct SessionController<S, T, P> {
    store: NoteStore<S>,
    surface: T,
    prompter: P,
    preview: Rc<RefCell<Preview>>,
    placeholder: String,
    title: String,
    current: Option<Loaded>,
    view: View,
    list: Vec<NoteListEntry>,
}

impl<S, T, P> SessionController<S, T, P>
where
    S: KeyValueStorage,
    T: TextSurface,
    P: Prompter,
{
    /// Start a session in the blank editor with `placeholder` as its text.
    ///
    /// Unreadable stored notes are reported once through the prompter and the
    /// session continues with an empty list. Saves stay refused until the
    /// stored data is either backed up or readable again.
    pub fn new(
        store: NoteStore<S>,
        mut surface: T,
        mut prompter: P,
        renderer: Option<Box<dyn MarkdownRenderer>>,
        placeholder: impl Into<String>,
    ) -> Self {
        match store.load_checked() {
            Ok(_) => {}
            Err(MarknoteError::CorruptData {
                backup: Some(backup_key),
                ..
            }) => prompter.alert(&Notice::StorageRecovered { backup_key }),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored notes");
                prompter.alert(&Notice::StorageUnavailable {
                    reason: e.to_string(),
                });
            }
        }

        let preview = Rc::new(RefCell::new(Preview {
            renderer,
            html: None,
        }));
        let listener_preview = Rc::clone(&preview);
        surface.on_change(Box::new(move |text: &str| {
            listener_preview.borrow_mut().refresh(text)
        }));

        let mut session = Self {
            store,
            surface,
            prompter,
            preview,
            placeholder: placeholder.into(),
            title: String::new(),
            current: None,
            view: View::Editor,
            list: Vec::new(),
        };
        session.new_note();
        session
    }

    /// Clear the editor for an unsaved note
    pub fn new_note(&mut self) {
        self.current = None;
        self.view = View::Editor;
        self.title.clear();
        let placeholder = self.placeholder.clone();
        self.surface.set_text(&placeholder);
        self.refresh_list();
        tracing::debug!("session: new note");
    }

    /// Load a stored note into the editor. An unknown id is ignored and
    /// returns `false`.
    pub fn select(&mut self, id: &str) -> bool {
        let note = match self.store.get(id) {
            Some(note) => note,
            None => {
                tracing::warn!(id, "select: note no longer exists");
                return false;
            }
        };

        self.current = Some(Loaded {
            id: note.id.clone(),
            revision: note.revision,
        });
        self.view = View::Editor;
        self.title = note.title;
        self.surface.set_text(&note.content);
        self.refresh_list();
        tracing::debug!(id, "session: selected note");
        true
    }

    /// Persist the editor contents, creating a note if none is loaded.
    ///
    /// On error the session is left as it was before the call.
    pub fn save(&mut self) -> Result<SaveOutcome> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            self.prompter.alert(&Notice::EmptyTitle);
            return Ok(SaveOutcome::Rejected);
        }
        let content = self.surface.text();

        let (saved, outcome) = match &self.current {
            Some(loaded) => {
                let stored = self
                    .store
                    .get(&loaded.id)
                    .ok_or_else(|| MarknoteError::NoteNotFound(loaded.id.clone()))?;
                let saved = self
                    .store
                    .update_if_current(stored.revised(title, content), loaded.revision)?;
                tracing::info!(id = %saved.id, revision = saved.revision, "updated note");
                let outcome = SaveOutcome::Updated(saved.id.clone());
                (saved, outcome)
            }
            None => {
                let note = Note::new(generate_id(), title, content);
                self.store.upsert(note.clone())?;
                tracing::info!(id = %note.id, "created note");
                let outcome = SaveOutcome::Created(note.id.clone());
                (note, outcome)
            }
        };

        self.current = Some(Loaded {
            id: saved.id.clone(),
            revision: saved.revision,
        });
        self.view = View::Editor;
        self.title = saved.title.clone();
        self.refresh_list();
        self.refresh_preview();
        self.prompter.alert(&Notice::Saved { title: saved.title });
        Ok(outcome)
    }

    /// Delete the loaded note after confirmation, then return to a blank editor
    pub fn delete(&mut self) -> Result<DeleteOutcome> {
        let id = match &self.current {
            Some(loaded) => loaded.id.clone(),
            None => return Ok(DeleteOutcome::NotPermitted),
        };

        if !self.prompter.confirm(DELETE_QUESTION) {
            tracing::debug!(id = %id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let title = self
            .store
            .get(&id)
            .map(|n| n.display_title().to_string())
            .unwrap_or_else(|| self.title.clone());
        self.store.remove(&id)?;

        self.new_note();
        self.prompter.alert(&Notice::Deleted { title });
        Ok(DeleteOutcome::Deleted(id))
    }

    /// Switch to the informational panel. The editor keeps its contents.
    pub fn show_info(&mut self) {
        self.view = View::Info;
        self.refresh_list();
    }

    pub fn show_editor(&mut self) {
        self.view = View::Editor;
        self.refresh_list();
        self.refresh_preview();
    }

    pub fn state(&self) -> SessionState {
        match &self.current {
            Some(loaded) => SessionState::EditingExisting(loaded.id.clone()),
            None => SessionState::NoEditingSession,
        }
    }

    pub fn current_note_id(&self) -> Option<&str> {
        self.current.as_ref().map(|l| l.id.as_str())
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Whether the delete action is available
    pub fn can_delete(&self) -> bool {
        self.current.is_some()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn content(&self) -> String {
        self.surface.text()
    }

    pub fn set_content(&mut self, content: &str) {
        self.surface.set_text(content);
    }

    pub fn surface_mut(&mut self) -> &mut T {
        &mut self.surface
    }

    /// Rendered preview of the editor text, `None` without a renderer
    pub fn preview_html(&self) -> Option<String> {
        self.preview.borrow().html.clone()
    }

    pub fn note_list(&self) -> &[NoteListEntry] {
        &self.list
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    fn refresh_list(&mut self) {
        let active = match (&self.current, self.view) {
            (Some(loaded), View::Editor) => Some(loaded.id.as_str()),
            _ => None,
        };
        self.list = self
            .store
            .list()
            .into_iter()
            .map(|n| NoteListEntry {
                active: active == Some(n.id.as_str()),
                title: n.display_title().to_string(),
                last_modified: n.last_modified,
                id: n.id,
            })
            .collect();
    }

    fn refresh_preview(&mut self) {
        if self.view != View::Editor {
            return;
        }
        let text = self.surface.text();
        self.preview.borrow_mut().refresh(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlRenderer;
    use crate::storage::test_support::FlakyStorage;
    use crate::storage::MemoryStorage;
    use chrono::Duration;
    use std::collections::VecDeque;

    const KEY: &str = "markdownNotes";
    const PLACEHOLDER: &str = "Start writing a new note!";

    #[derive(Default)]
    struct ScriptedPrompter {
        answers: VecDeque<bool>,
        questions: Vec<String>,
        notices: Vec<Notice>,
    }

    impl ScriptedPrompter {
        fn answering(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&mut self, question: &str) -> bool {
            self.questions.push(question.to_string());
            self.answers.pop_front().unwrap_or(false)
        }

        fn alert(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
    }

    type TestSession = SessionController<MemoryStorage, BufferSurface, ScriptedPrompter>;

    fn session_with(storage: MemoryStorage, prompter: ScriptedPrompter) -> TestSession {
        SessionController::new(
            NoteStore::new(storage, KEY),
            BufferSurface::new(),
            prompter,
            Some(Box::new(HtmlRenderer::new())),
            PLACEHOLDER,
        )
    }

    fn session() -> TestSession {
        session_with(MemoryStorage::new(), ScriptedPrompter::default())
    }

    fn seeded(notes: &[(&str, &str, i64)]) -> MemoryStorage {
        let storage = MemoryStorage::new();
        seed(&storage, notes);
        storage
    }

    fn seed(storage: &impl KeyValueStorage, notes: &[(&str, &str, i64)]) {
        let store = NoteStore::new(storage, KEY);
        for (id, title, age_minutes) in notes {
            let mut note = Note::new(id.to_string(), title.to_string(), format!("{} body", title));
            note.created_at = Utc::now() - Duration::minutes(*age_minutes);
            note.last_modified = note.created_at;
            store.upsert(note).unwrap();
        }
    }

    fn flaky_session(
        storage: FlakyStorage,
    ) -> SessionController<FlakyStorage, BufferSurface, ScriptedPrompter> {
        SessionController::new(
            NoteStore::new(storage, KEY),
            BufferSurface::new(),
            ScriptedPrompter::default(),
            Some(Box::new(HtmlRenderer::new())),
            PLACEHOLDER,
        )
    }

    #[test]
    fn test_initial_state() {
        let s = session();
        assert_eq!(s.state(), SessionState::NoEditingSession);
        assert_eq!(s.view(), View::Editor);
        assert_eq!(s.content(), PLACEHOLDER);
        assert!(!s.can_delete());
        assert!(s.preview_html().unwrap().contains(PLACEHOLDER));
    }

    #[test]
    fn test_create_note_from_empty_store() {
        let mut s = session();
        s.new_note();
        s.set_title("Hello");
        s.set_content("# Hi");

        let outcome = s.save().unwrap();

        let notes = s.store().load_all();
        assert_eq!(notes.len(), 1);
        let note = notes.values().next().unwrap();
        assert_eq!(note.title, "Hello");
        assert_eq!(note.content, "# Hi");
        assert_eq!(note.created_at, note.last_modified);
        assert_eq!(outcome, SaveOutcome::Created(note.id.clone()));
        assert_eq!(s.state(), SessionState::EditingExisting(note.id.clone()));
        assert!(s.can_delete());
        assert_eq!(
            s.prompter().notices,
            vec![Notice::Saved {
                title: "Hello".to_string()
            }]
        );
    }

    #[test]
    fn test_update_existing_note() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::default());

        assert!(s.select("1"));
        assert_eq!(s.title(), "A");
        s.set_content("new body");
        let outcome = s.save().unwrap();

        assert_eq!(outcome, SaveOutcome::Updated("1".to_string()));
        let note = s.store().get("1").unwrap();
        assert_eq!(note.content, "new body");
        assert_eq!(note.title, "A");
        assert!(note.last_modified > note.created_at);
        assert_eq!(s.store().load_all().len(), 1);
    }

    #[test]
    fn test_list_order_newest_first() {
        let s = session_with(
            seeded(&[("1", "older", 20), ("2", "newer", 5)]),
            ScriptedPrompter::default(),
        );
        let ids: Vec<&str> = s.note_list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_delete_selected_note() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::answering(&[true]));

        assert!(s.select("1"));
        let outcome = s.delete().unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted("1".to_string()));
        assert!(s.store().get("1").is_none());
        assert_eq!(s.state(), SessionState::NoEditingSession);
        assert_eq!(s.content(), PLACEHOLDER);
        assert_eq!(s.title(), "");
        assert!(s.note_list().is_empty());
        assert_eq!(s.prompter().questions, vec![DELETE_QUESTION.to_string()]);
        assert!(s.prompter().notices.contains(&Notice::Deleted {
            title: "A".to_string()
        }));
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::answering(&[true]));

        let outcome = s.delete().unwrap();

        assert_eq!(outcome, DeleteOutcome::NotPermitted);
        assert!(s.prompter().questions.is_empty());
        assert_eq!(s.store().load_all().len(), 1);
    }

    #[test]
    fn test_delete_cancelled_keeps_note() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::answering(&[false]));

        s.select("1");
        let outcome = s.delete().unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(s.store().get("1").is_some());
        assert_eq!(s.state(), SessionState::EditingExisting("1".to_string()));
    }

    #[test]
    fn test_save_with_blank_title_is_rejected() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::default());
        let before = s.store().load_all();

        s.set_title("   ");
        assert_eq!(s.save().unwrap(), SaveOutcome::Rejected);
        assert_eq!(s.store().load_all(), before);
        assert_eq!(s.current_note_id(), None);

        s.select("1");
        s.set_title("");
        s.set_content("changed");
        assert_eq!(s.save().unwrap(), SaveOutcome::Rejected);
        assert_eq!(s.store().load_all(), before);
        assert_eq!(s.current_note_id(), Some("1"));
        assert_eq!(
            s.prompter().notices,
            vec![Notice::EmptyTitle, Notice::EmptyTitle]
        );
    }

    #[test]
    fn test_two_creations_get_distinct_ids() {
        let mut s = session();

        s.new_note();
        s.set_title("First");
        let first = s.save().unwrap();

        s.new_note();
        s.set_title("Second");
        let second = s.save().unwrap();

        match (first, second) {
            (SaveOutcome::Created(a), SaveOutcome::Created(b)) => assert_ne!(a, b),
            other => panic!("Expected two creations, got {:?}", other),
        }
        assert_eq!(s.store().load_all().len(), 2);
    }

    #[test]
    fn test_select_missing_id_is_ignored() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::default());
        s.select("1");
        s.set_content("unsaved edit");

        assert!(!s.select("gone"));
        assert_eq!(s.current_note_id(), Some("1"));
        assert_eq!(s.content(), "unsaved edit");
        assert!(s.prompter().notices.is_empty());
    }

    #[test]
    fn test_title_is_trimmed_on_save() {
        let mut s = session();
        s.set_title("  Padded  ");
        s.save().unwrap();

        let note = s.store().list().remove(0);
        assert_eq!(note.title, "Padded");
        assert_eq!(s.title(), "Padded");
    }

    #[test]
    fn test_show_info_clears_highlight_but_keeps_editor() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::default());
        s.select("1");
        assert!(s.note_list()[0].active);

        s.show_info();
        assert_eq!(s.view(), View::Info);
        assert!(s.note_list().iter().all(|e| !e.active));
        assert_eq!(s.current_note_id(), Some("1"));
        assert_eq!(s.content(), "A body");

        s.show_editor();
        assert_eq!(s.view(), View::Editor);
        assert!(s.note_list()[0].active);
    }

    #[test]
    fn test_select_switches_back_to_editor() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::default());
        s.show_info();
        s.select("1");
        assert_eq!(s.view(), View::Editor);
    }

    #[test]
    fn test_preview_follows_edits() {
        let mut s = session();
        s.set_content("**bold**");
        assert!(s.preview_html().unwrap().contains("<strong>bold</strong>"));

        s.surface_mut().set_text("_em_");
        assert!(s.preview_html().unwrap().contains("<em>em</em>"));
    }

    #[test]
    fn test_missing_renderer_skips_preview() {
        let mut s = SessionController::new(
            NoteStore::new(MemoryStorage::new(), KEY),
            BufferSurface::new(),
            ScriptedPrompter::default(),
            None,
            PLACEHOLDER,
        );
        s.set_content("# Hi");
        s.set_title("Still works");
        assert!(s.preview_html().is_none());
        assert!(matches!(s.save().unwrap(), SaveOutcome::Created(_)));
    }

    #[test]
    fn test_corrupt_storage_is_reported_once() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY, "not json at all").unwrap();

        let s = session_with(storage, ScriptedPrompter::default());

        assert_eq!(
            s.prompter().notices,
            vec![Notice::StorageRecovered {
                backup_key: "markdownNotes.corrupt".to_string()
            }]
        );
        assert!(s.note_list().is_empty());
    }

    #[test]
    fn test_concurrent_edit_is_a_conflict() {
        let storage = seeded(&[("1", "A", 30)]);
        let mut s = session_with(storage, ScriptedPrompter::default());
        s.select("1");

        // Another session saves the same note in between
        let other = s.store().get("1").unwrap();
        s.store()
            .update_if_current(other.revised("A".to_string(), "theirs".to_string()), 1)
            .unwrap();

        s.set_content("mine");
        let result = s.save();
        assert!(matches!(result, Err(MarknoteError::Conflict { .. })));
        assert_eq!(s.store().get("1").unwrap().content, "theirs");
        assert_eq!(s.current_note_id(), Some("1"));
        assert!(s.prompter().notices.is_empty());
    }

    #[test]
    fn test_saving_note_deleted_elsewhere_fails() {
        let mut s = session_with(seeded(&[("1", "A", 30)]), ScriptedPrompter::default());
        s.select("1");
        s.store().remove("1").unwrap();

        let result = s.save();
        assert!(matches!(result, Err(MarknoteError::NoteNotFound(_))));
        assert_eq!(s.current_note_id(), Some("1"));
        assert!(s.store().load_all().is_empty());
    }

    #[test]
    fn test_repeated_saves_keep_revisions_in_step() {
        let mut s = session();
        s.set_title("Draft");
        s.save().unwrap();
        s.set_content("v2");
        s.save().unwrap();
        s.set_content("v3");
        s.save().unwrap();

        let note = s.store().list().remove(0);
        assert_eq!(note.content, "v3");
        assert_eq!(note.revision, 3);
    }

    #[test]
    fn test_unreadable_storage_is_reported_and_not_overwritten() {
        let storage = FlakyStorage::default();
        seed(&storage, &[("1", "Keep", 30)]);
        storage.fail_reads.set(true);

        let mut s = flaky_session(storage);
        assert!(matches!(
            s.prompter().notices.as_slice(),
            [Notice::StorageUnavailable { .. }]
        ));
        assert!(s.note_list().is_empty());

        s.set_title("Fresh");
        assert!(matches!(s.save(), Err(MarknoteError::Io(_))));
        assert_eq!(s.current_note_id(), None);

        s.store().storage().fail_reads.set(false);
        let notes = s.store().load_all();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes["1"].title, "Keep");
    }

    #[test]
    fn test_failed_write_leaves_session_unchanged() {
        let storage = FlakyStorage::default();
        seed(&storage, &[("1", "A", 30), ("2", "B", 10)]);
        let mut s = flaky_session(storage);
        s.select("1");
        let list_before = s.note_list().to_vec();
        s.store().storage().fail_writes.set(true);

        s.set_title("Renamed");
        s.set_content("edited");
        assert!(matches!(s.save(), Err(MarknoteError::Io(_))));
        assert_eq!(s.current_note_id(), Some("1"));
        assert_eq!(s.title(), "Renamed");
        assert_eq!(s.note_list(), list_before.as_slice());

        s.new_note();
        let list_before = s.note_list().to_vec();
        s.set_title("Never stored");
        assert!(matches!(s.save(), Err(MarknoteError::Io(_))));
        assert_eq!(s.state(), SessionState::NoEditingSession);
        assert_eq!(s.title(), "Never stored");
        assert_eq!(s.note_list(), list_before.as_slice());
        assert!(s.prompter().notices.is_empty());

        s.store().storage().fail_writes.set(false);
        assert_eq!(s.store().get("1").unwrap().title, "A");
        assert_eq!(s.store().load_all().len(), 2);
    }
}
