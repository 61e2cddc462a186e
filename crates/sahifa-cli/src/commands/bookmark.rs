//! Bookmark command handlers

use anyhow::{Context, Result};

use sahifa_core::ContentStore;

use crate::editor::confirm;
use crate::output::{short_id, truncate, Output};

fn resolve(store: &ContentStore, id: &str) -> Result<String> {
    super::resolve_id(
        "bookmark",
        id,
        store.bookmarks().iter().map(|b| {
            let label = store
                .chapter(&b.chapter_id)
                .map(|c| c.title.clone())
                .unwrap_or_else(|| format!("(missing chapter {})", b.chapter_id));
            (b.id.as_str(), label)
        }),
    )
}

/// List bookmarks, newest first
pub fn list(store: &ContentStore, output: &Output) -> Result<()> {
    output.print_bookmarks(&store.bookmark_entries());
    Ok(())
}

/// Bookmark a chapter, or remove its bookmark
pub async fn toggle(store: &mut ContentStore, chapter: &str, output: &Output) -> Result<()> {
    let chapter_id = super::chapter::resolve(store, chapter)?;
    let bookmarked = store
        .toggle_bookmark(&chapter_id)
        .await
        .context("Failed to update bookmark")?;

    let title = store
        .chapter(&chapter_id)
        .map(|c| c.title.clone())
        .unwrap_or_default();
    if bookmarked {
        output.success(&format!("Bookmarked: {}", title));
    } else {
        output.success(&format!("Removed bookmark: {}", title));
    }
    Ok(())
}

/// Set or clear a bookmark's note
pub async fn annotate(
    store: &mut ContentStore,
    id: &str,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = resolve(store, id)?;
    let bookmark = store
        .annotate_bookmark(&id, text)
        .await
        .context("Failed to update bookmark note")?;

    match bookmark.note {
        Some(ref note) => output.success(&format!(
            "Noted bookmark {}: {}",
            short_id(&bookmark.id),
            truncate(note, 50)
        )),
        None => output.success(&format!("Cleared note on bookmark {}", short_id(&bookmark.id))),
    }
    Ok(())
}

/// Delete a bookmark
pub async fn delete(store: &mut ContentStore, id: &str, output: &Output) -> Result<()> {
    let id = resolve(store, id)?;

    if output.should_prompt() {
        println!("Delete bookmark: {}", short_id(&id));
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .remove_bookmark(&id)
        .await
        .context("Failed to delete bookmark")?;

    output.success(&format!("Deleted bookmark: {}", short_id(&id)));
    Ok(())
}
