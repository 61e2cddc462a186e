//! Note command handlers
//!
//! Notes are the reader's annotations on chapters.

use anyhow::{anyhow, Context, Result};

use sahifa_core::{ContentStore, NoteDraft};

use crate::editor::{confirm, text_or_editor};
use crate::output::{short_id, truncate_line, Output};

fn resolve(store: &ContentStore, id: &str) -> Result<String> {
    super::resolve_id(
        "note",
        id,
        store
            .notes()
            .iter()
            .map(|n| (n.id.as_str(), truncate_line(&n.text, 30))),
    )
}

/// List notes, optionally for a single chapter
pub fn list(store: &ContentStore, chapter: Option<&str>, output: &Output) -> Result<()> {
    let chapter_id = chapter
        .map(|c| super::chapter::resolve(store, c))
        .transpose()?;

    let entries: Vec<_> = store
        .note_entries()
        .into_iter()
        .filter(|e| chapter_id.as_deref().map_or(true, |id| e.chapter.id == id))
        .collect();

    output.print_notes(&entries);
    Ok(())
}

/// Add a note to a chapter
pub async fn create(
    store: &mut ContentStore,
    chapter: &str,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let chapter_id = super::chapter::resolve(store, chapter)?;
    let title = store
        .chapter(&chapter_id)
        .map(|c| c.title.clone())
        .unwrap_or_default();

    let text = text_or_editor(
        text,
        &format!("# Note on: {}\n# Lines starting with # are ignored.", title),
    )
    .context("Failed to edit note")?;

    let note = store
        .add_note(NoteDraft::new(&chapter_id, text))
        .await
        .context("Failed to add note")?;

    output.success(&format!(
        "Added note {} to chapter: {}",
        short_id(&note.id),
        title
    ));
    Ok(())
}

/// Replace a note's text
pub async fn edit(
    store: &mut ContentStore,
    id: &str,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = resolve(store, id)?;
    let current = store
        .notes()
        .iter()
        .find(|n| n.id == id)
        .map(|n| n.text.clone())
        .ok_or_else(|| anyhow!("Note not found: {}", id))?;

    let text = match text {
        Some(text) => text,
        None => crate::editor::edit_text(&current).context("Failed to edit note")?,
    };

    let note = store
        .update_note(&id, &text)
        .await
        .context("Failed to update note")?;

    output.print_note(&note);
    Ok(())
}

/// Delete a note
pub async fn delete(store: &mut ContentStore, id: &str, output: &Output) -> Result<()> {
    let id = resolve(store, id)?;

    if output.should_prompt() {
        if let Some(note) = store.notes().iter().find(|n| n.id == id) {
            println!(
                "Delete note: {} - {}",
                short_id(&note.id),
                truncate_line(&note.text, 50)
            );
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.remove_note(&id).await.context("Failed to delete note")?;

    output.success(&format!("Deleted note: {}", short_id(&id)));
    Ok(())
}
