//! Reader view
//!
//! Shows one chapter with the reader settings applied, its position within
//! the language, bookmark state and the reader's notes on it.

use anyhow::{anyhow, bail, Result};

use sahifa_core::{Chapter, ContentStore, Language, Note, Settings};

use crate::images;
use crate::output::{Output, OutputFormat};

/// Everything shown for one chapter
#[derive(Debug)]
struct Page {
    chapter: Chapter,
    index: usize,
    total: usize,
    previous: Option<String>,
    next: Option<String>,
    bookmarked: bool,
    notes: Vec<Note>,
}

/// Select the chapter and gather its neighbours, bookmark and notes
fn open_page(store: &mut ContentStore, language: Language, chapter: Option<&str>) -> Result<Page> {
    let id = match chapter {
        Some(id) => super::chapter::resolve(store, id)?,
        None => store
            .first_chapter(language)
            .map(|c| c.id.clone())
            .ok_or_else(|| anyhow!("No {} chapters available", language))?,
    };

    let chapter = store
        .select_chapter(&id)
        .ok_or_else(|| anyhow!("Chapter not found: {}", id))?
        .clone();
    if chapter.language != language {
        bail!(
            "Chapter {} is in {}, not {}",
            chapter.id,
            chapter.language,
            language
        );
    }

    let (index, total) = store.position_in_language(&id).unwrap_or((0, 1));
    Ok(Page {
        index,
        total,
        previous: store.previous_chapter(&id).map(|c| c.id.clone()),
        next: store.next_chapter(&id).map(|c| c.id.clone()),
        bookmarked: store.is_bookmarked(&id),
        notes: store.notes_for_chapter(&id).into_iter().cloned().collect(),
        chapter,
    })
}

/// Open a chapter in `language`, defaulting to the first one
pub fn read(
    store: &mut ContentStore,
    language: Language,
    chapter: Option<String>,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    let page = open_page(store, language, chapter.as_deref())?;

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "chapter": page.chapter,
            "position": page.index + 1,
            "total": page.total,
            "previous": page.previous,
            "next": page.next,
            "bookmarked": page.bookmarked,
            "notes": page.notes,
            "settings": settings,
        })),
        OutputFormat::Quiet => println!("{}", page.chapter.content),
        OutputFormat::Human => print_page(&page, settings),
    }

    Ok(())
}

fn print_page(page: &Page, settings: &Settings) {
    let chapter = &page.chapter;
    let rule = "═".repeat(48);
    println!("{}", rule);
    println!(
        "{}  {}",
        chapter.title,
        if page.bookmarked { "[bookmarked]" } else { "" }
    );
    println!(
        "Chapter {} of {} · {} · {}px · {}% · {}",
        page.index + 1,
        page.total,
        if chapter.language.is_rtl() { "rtl" } else { "ltr" },
        settings.font_size(),
        settings.brightness(),
        if settings.dark_mode() { "dark" } else { "light" }
    );
    println!("{}", rule);

    if chapter.has_images() {
        println!();
        for (i, url) in chapter.images.iter().enumerate() {
            println!("[Page {}] {}", i + 1, images::describe(url));
        }
    }

    if !chapter.content.is_empty() {
        println!();
        println!("{}", chapter.content);
    }

    if !page.notes.is_empty() {
        println!();
        println!("── Your notes ({}) ──", page.notes.len());
        for note in &page.notes {
            println!("[{}] {}", note.created_at.format("%Y-%m-%d"), note.text);
        }
    }

    println!();
    if let Some(ref id) = page.previous {
        println!("← previous: sahifa read {} {}", chapter.language, id);
    }
    if let Some(ref id) = page.next {
        println!("→ next:     sahifa read {} {}", chapter.language, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sahifa_core::{MemoryBackend, NoteDraft};

    async fn sample_store() -> ContentStore {
        let mut store = ContentStore::new(Arc::new(MemoryBackend::with_sample_content()));
        store.refresh().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_defaults_to_first_chapter() {
        let mut store = sample_store().await;

        let page = open_page(&mut store, Language::Urdu, None).unwrap();
        assert_eq!(page.chapter.id, "4");
        assert_eq!((page.index, page.total), (0, 2));
        assert_eq!(page.previous, None);
        assert_eq!(page.next.as_deref(), Some("5"));
        assert_eq!(store.current_chapter().map(|c| c.id.as_str()), Some("4"));
    }

    #[tokio::test]
    async fn test_neighbours_stay_in_language() {
        let mut store = sample_store().await;
        store.add_note(NoteDraft::new("3", "last page")).await.unwrap();

        let page = open_page(&mut store, Language::English, Some("3")).unwrap();
        assert_eq!(page.previous.as_deref(), Some("2"));
        assert_eq!(page.next, None);
        assert_eq!(page.notes.len(), 1);
        assert!(!page.bookmarked);
    }

    #[tokio::test]
    async fn test_wrong_language_is_error() {
        let mut store = sample_store().await;

        let err = open_page(&mut store, Language::English, Some("4")).unwrap_err();
        assert!(err.to_string().contains("urdu"));
    }
}
