use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use super::TerminalPrompter;
use crate::config::Project;
use crate::entity::Note;
use crate::error::{MarknoteError, Result};
use crate::render::HtmlRenderer;
use crate::session::{BufferSurface, DeleteOutcome, SaveOutcome, SessionController};
use crate::storage::FileStorage;

type CliSession = SessionController<FileStorage, BufferSurface, TerminalPrompter>;

fn project_root(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(Project::find_root(&env::current_dir()?)),
    }
}

fn open_session(dir: Option<PathBuf>, assume_yes: bool) -> Result<(Project, CliSession)> {
    let project = Project::open(&project_root(dir)?)?;
    let session = SessionController::new(
        project.note_store()?,
        BufferSurface::new(),
        TerminalPrompter::new(assume_yes),
        Some(Box::new(HtmlRenderer::new())),
        project.config.placeholder.clone(),
    );
    Ok((project, session))
}

/// Resolve `id` and load that note into the editor
fn select(session: &mut CliSession, id: &str) -> Result<String> {
    let id = session.store().resolve_id(id)?;
    if !session.select(&id) {
        return Err(MarknoteError::NoteNotFound(id));
    }
    Ok(id)
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn saved_note(session: &CliSession, id: &str) -> Result<Note> {
    session
        .store()
        .get(id)
        .ok_or_else(|| MarknoteError::NoteNotFound(id.to_string()))
}

pub fn handle_init(dir: Option<PathBuf>) -> Result<()> {
    let root = match dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    Project::init(&root)?;
    println!("Initialized marknote project in {}", root.display());
    Ok(())
}

pub fn handle_new(dir: Option<PathBuf>, title: String, stdin: bool, json: bool) -> Result<()> {
    let (_project, mut session) = open_session(dir, false)?;

    session.new_note();
    session.set_title(title);
    let content = if stdin { read_stdin()? } else { String::new() };
    session.set_content(&content);

    let id = match session.save()? {
        SaveOutcome::Created(id) | SaveOutcome::Updated(id) => id,
        SaveOutcome::Rejected => return Err(MarknoteError::EmptyTitle),
    };
    let note = saved_note(&session, &id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Created note {} - {}", short_id(&note.id), note.title);
    }
    Ok(())
}

pub fn handle_list(dir: Option<PathBuf>, json: bool) -> Result<()> {
    let (_project, session) = open_session(dir, false)?;
    let entries = session.note_list();

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else if entries.is_empty() {
        println!("No notes found.");
    } else {
        println!("Notes:\n");
        for entry in entries {
            println!(
                "  {} {} {}",
                short_id(&entry.id),
                entry.last_modified.format("%Y-%m-%d %H:%M"),
                entry.title
            );
        }
    }
    Ok(())
}

pub fn handle_show(dir: Option<PathBuf>, id: String, json: bool, html: bool) -> Result<()> {
    let (_project, mut session) = open_session(dir, false)?;
    let id = select(&mut session, &id)?;
    let note = saved_note(&session, &id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else if html {
        print!("{}", session.preview_html().unwrap_or_default());
    } else {
        println!("Title: {}", note.display_title());
        println!("ID: {}", note.id);
        println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
        println!("Modified: {}", note.last_modified.format("%Y-%m-%d %H:%M"));
        if !note.content.is_empty() {
            println!("\n{}", note.content);
        }
    }
    Ok(())
}

pub fn handle_edit(
    dir: Option<PathBuf>,
    id: String,
    title: Option<String>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let (_project, mut session) = open_session(dir, false)?;
    let id = select(&mut session, &id)?;

    if title.is_none() && !stdin {
        eprintln!("Nothing to change; pass --title or --stdin");
        return Ok(());
    }
    if let Some(title) = title {
        session.set_title(title);
    }
    if stdin {
        let content = read_stdin()?;
        session.set_content(&content);
    }

    if session.save()? == SaveOutcome::Rejected {
        return Err(MarknoteError::EmptyTitle);
    }
    let note = saved_note(&session, &id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Updated note {} - {}", short_id(&note.id), note.title);
    }
    Ok(())
}

pub fn handle_delete(dir: Option<PathBuf>, id: String, force: bool) -> Result<()> {
    let (_project, mut session) = open_session(dir, force)?;
    let id = select(&mut session, &id)?;
    let title = session.title().to_string();

    if !force && !atty::is(atty::Stream::Stdin) {
        return Err(MarknoteError::ConfirmationRequired);
    }

    match session.delete()? {
        DeleteOutcome::Deleted(id) => println!("Deleted note {} - {}", short_id(&id), title),
        DeleteOutcome::Cancelled => println!("Cancelled."),
        DeleteOutcome::NotPermitted => return Err(MarknoteError::NoteNotFound(id)),
    }
    Ok(())
}

pub fn handle_info(dir: Option<PathBuf>) -> Result<()> {
    let (project, mut session) = open_session(dir, false)?;
    session.show_info();

    println!("marknote {}\n", env!("CARGO_PKG_VERSION"));
    println!("{}", project.config.info_text);
    println!("\nProject: {}", project.dir().display());
    println!("Notes: {}", session.note_list().len());
    Ok(())
}
