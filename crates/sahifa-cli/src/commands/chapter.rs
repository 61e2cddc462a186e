//! Chapter command handlers (reader side)

use anyhow::{anyhow, Result};

use sahifa_core::{ContentStore, Language};

use crate::output::Output;

/// Resolve a chapter id or prefix
pub fn resolve(store: &ContentStore, id: &str) -> Result<String> {
    super::resolve_id(
        "chapter",
        id,
        store
            .chapters()
            .iter()
            .map(|c| (c.id.as_str(), c.title.clone())),
    )
}

/// List chapters, optionally in one language
pub fn list(store: &ContentStore, language: Option<Language>, output: &Output) -> Result<()> {
    let chapters = match language {
        Some(language) => store.chapters_in(language),
        None => store.chapters().iter().collect(),
    };

    output.print_chapters(&chapters);
    Ok(())
}

/// Show a single chapter
pub fn show(store: &ContentStore, id: &str, output: &Output) -> Result<()> {
    let id = resolve(store, id)?;
    let chapter = store
        .chapter(&id)
        .ok_or_else(|| anyhow!("Chapter not found: {}", id))?;

    output.print_chapter(chapter);
    Ok(())
}

/// Search chapter titles and text
pub fn search(store: &ContentStore, query: &str, output: &Output) -> Result<()> {
    let results = store.search_chapters(query);
    output.print_chapters(&results);
    Ok(())
}
