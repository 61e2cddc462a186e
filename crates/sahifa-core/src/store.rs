//! Content store
//!
//! The `ContentStore` owns the four collections for a session and coordinates
//! between:
//! - a [`PersistenceClient`] (source of truth)
//! - the [`LocalCache`] (offline fallback and local-mode persistence)
//!
//! ## Update strategy
//!
//! Every mutation is pessimistic: the remote call is made first and local
//! state only changes once it succeeds. A failed call leaves the collections
//! untouched and is returned to the caller.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ContentStore::open(&config)?;
//! store.refresh().await?;
//!
//! let draft = NoteDraft::new(chapter_id, "Worth rereading");
//! store.add_note(draft).await?;
//!
//! for entry in store.note_entries() {
//!     println!("{}: {}", entry.chapter.title, entry.note.text);
//! }
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{
    Bookmark, BookmarkDraft, BookmarkPatch, Chapter, ChapterDraft, ChapterPatch, Language, Note,
    NoteDraft, NotePatch, Snapshot, Testimonial, TestimonialDraft, TestimonialPatch,
    ValidationError,
};
use crate::remote::collections::{BOOKMARKS, CHAPTERS, NOTES, TESTIMONIALS};
use crate::remote::{MemoryBackend, PersistenceClient, RemoteError, RemoteResult, RestClient};
use crate::storage::{CacheError, LocalCache};

/// Why a store operation failed
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Remote(RemoteError::NotFound { .. }))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Where the collections were loaded from by [`ContentStore::refresh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hydration {
    Remote,
    /// The data store was unreachable; the local cache was used instead
    Cache,
}

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub english_chapters: usize,
    pub urdu_chapters: usize,
    pub pending_testimonials: usize,
    pub approved_testimonials: usize,
    pub bookmarks: usize,
    pub notes: usize,
}

/// A bookmark together with the chapter it points at
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkEntry<'a> {
    pub bookmark: &'a Bookmark,
    pub chapter: &'a Chapter,
}

/// A note together with the chapter it annotates
#[derive(Debug, Clone, Serialize)]
pub struct NoteEntry<'a> {
    pub note: &'a Note,
    pub chapter: &'a Chapter,
}

/// In-memory owner of chapters, bookmarks, notes and testimonials
pub struct ContentStore {
    client: Arc<dyn PersistenceClient>,
    cache: Option<LocalCache>,
    /// Collections whose cache file could not be read; never overwritten
    unmirrored: Vec<&'static str>,
    chapters: Vec<Chapter>,
    bookmarks: Vec<Bookmark>,
    notes: Vec<Note>,
    testimonials: Vec<Testimonial>,
    current_chapter: Option<String>,
    loading: bool,
}

impl ContentStore {
    /// An empty store backed by `client`
    pub fn new(client: Arc<dyn PersistenceClient>) -> Self {
        Self {
            client,
            cache: None,
            unmirrored: Vec::new(),
            chapters: Vec::new(),
            bookmarks: Vec::new(),
            notes: Vec::new(),
            testimonials: Vec::new(),
            current_chapter: None,
            loading: false,
        }
    }

    /// Mirror every change to `cache` and fall back to it when offline
    pub fn with_cache(mut self, cache: LocalCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a store from configuration
    ///
    /// With a `remote_url` the store talks to the data store over HTTP.
    /// Without one it runs in local mode: an in-process backend seeded from
    /// the cache, or from the sample content when nothing has been cached.
    /// The collections stay empty until [`refresh`](Self::refresh) is called.
    ///
    /// In local mode a cache file that exists but cannot be read is never
    /// written over.
    pub fn open(config: &Config) -> Result<Self> {
        let cache = config
            .cache_enabled
            .then(|| LocalCache::from_config(config));

        let (client, unmirrored) = if config.is_remote() {
            let client: Arc<dyn PersistenceClient> = Arc::new(
                RestClient::from_config(config).context("Failed to create data store client")?,
            );
            (client, Vec::new())
        } else {
            let (backend, unread) = local_backend(cache.as_ref());
            let client: Arc<dyn PersistenceClient> = Arc::new(backend);
            (client, unread)
        };
        info!("Opened content store ({})", client.describe());

        let mut store = Self::new(client);
        store.unmirrored = unmirrored;
        Ok(match cache {
            Some(cache) => store.with_cache(cache),
            None => store,
        })
    }

    /// Label of the backend in use
    pub fn backend(&self) -> String {
        self.client.describe()
    }

    pub fn cache(&self) -> Option<&LocalCache> {
        self.cache.as_ref()
    }

    /// True only while a refresh is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // ==================== Hydration ====================

    /// Reload all four collections from the data store
    ///
    /// On failure the collections are hydrated from the cache when it holds
    /// data; otherwise they are left as they were and the error is returned.
    pub async fn refresh(&mut self) -> StoreResult<Hydration> {
        self.loading = true;
        let fetched = self.fetch_all().await;
        self.loading = false;

        match fetched {
            Ok(snapshot) => {
                info!(
                    "Loaded {} chapters, {} bookmarks, {} notes, {} testimonials",
                    snapshot.chapters.len(),
                    snapshot.bookmarks.len(),
                    snapshot.notes.len(),
                    snapshot.testimonials.len()
                );
                self.replace(snapshot);
                self.mirror_all();
                Ok(Hydration::Remote)
            }
            Err(e) => {
                if e.is_transient() {
                    warn!("Data store unreachable: {}", e);
                } else {
                    warn!("Failed to load content: {}", e);
                }
                match self.cached_snapshot() {
                    Some(snapshot) => {
                        info!("Using cached content");
                        self.replace(snapshot);
                        Ok(Hydration::Cache)
                    }
                    None => Err(e.into()),
                }
            }
        }
    }

    async fn fetch_all(&self) -> RemoteResult<Snapshot> {
        let (chapters, bookmarks, notes, testimonials) = tokio::try_join!(
            self.client.list_chapters(),
            self.client.list_bookmarks(),
            self.client.list_notes(),
            self.client.list_testimonials(),
        )?;
        Ok(Snapshot {
            chapters,
            bookmarks,
            notes,
            testimonials,
        })
    }

    fn cached_snapshot(&self) -> Option<Snapshot> {
        let load = self.cache.as_ref()?.load_snapshot();
        for (key, e) in &load.failed {
            warn_cache(&format!("read {} cache", key), e);
        }
        (!load.snapshot.is_empty()).then_some(load.snapshot)
    }

    fn replace(&mut self, snapshot: Snapshot) {
        self.chapters = snapshot.chapters;
        self.chapters.sort_by_key(|c| c.order);
        self.bookmarks = snapshot.bookmarks;
        self.notes = snapshot.notes;
        self.testimonials = snapshot.testimonials;

        if let Some(ref id) = self.current_chapter {
            if !self.chapters.iter().any(|c| &c.id == id) {
                self.current_chapter = None;
            }
        }
    }

    /// Copy of the current collections
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            chapters: self.chapters.clone(),
            bookmarks: self.bookmarks.clone(),
            notes: self.notes.clone(),
            testimonials: self.testimonials.clone(),
        }
    }

    fn mirror<T: Serialize>(&self, key: &str, items: &[T]) {
        if self.unmirrored.iter().any(|k| *k == key) {
            debug!("Leaving unreadable {} cache untouched", key);
            return;
        }
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.save(key, items) {
                warn_cache(&format!("update {} cache", key), &e);
            }
        }
    }

    fn mirror_all(&self) {
        self.mirror(CHAPTERS, &self.chapters);
        self.mirror(BOOKMARKS, &self.bookmarks);
        self.mirror(NOTES, &self.notes);
        self.mirror(TESTIMONIALS, &self.testimonials);
    }

    // ==================== Chapter Operations ====================

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    /// Chapters in one language, by `order`
    pub fn chapters_in(&self, language: Language) -> Vec<&Chapter> {
        self.chapters
            .iter()
            .filter(|c| c.language == language)
            .collect()
    }

    /// Case-insensitive substring search over title and content
    ///
    /// A blank query returns every chapter. Order is preserved.
    pub fn search_chapters(&self, query: &str) -> Vec<&Chapter> {
        if query.trim().is_empty() {
            return self.chapters.iter().collect();
        }
        let needle = query.to_lowercase();
        self.chapters
            .iter()
            .filter(|c| c.matches_lowercase(&needle))
            .collect()
    }

    pub async fn add_chapter(&mut self, draft: ChapterDraft) -> StoreResult<Chapter> {
        draft.validate()?;
        let chapter = logged("add chapter", self.client.insert_chapter(&draft).await)?;
        debug!("Added chapter {} ({})", chapter.id, chapter.title);

        self.chapters.push(chapter.clone());
        self.chapters.sort_by_key(|c| c.order);
        self.mirror(CHAPTERS, &self.chapters);
        Ok(chapter)
    }

    /// Replace a chapter's fields with those of `draft`
    pub async fn update_chapter(&mut self, id: &str, draft: ChapterDraft) -> StoreResult<Chapter> {
        draft.validate()?;
        let patch = ChapterPatch::from(draft);
        let chapter = logged("update chapter", self.client.update_chapter(id, &patch).await)?;
        debug!("Updated chapter {}", chapter.id);

        match self.chapters.iter_mut().find(|c| c.id == chapter.id) {
            Some(existing) => *existing = chapter.clone(),
            None => self.chapters.push(chapter.clone()),
        }
        self.chapters.sort_by_key(|c| c.order);
        self.mirror(CHAPTERS, &self.chapters);
        Ok(chapter)
    }

    pub async fn delete_chapter(&mut self, id: &str) -> StoreResult<()> {
        logged("delete chapter", self.client.delete_chapter(id).await)?;
        debug!("Deleted chapter {}", id);

        self.chapters.retain(|c| c.id != id);
        if self.current_chapter.as_deref() == Some(id) {
            self.current_chapter = None;
        }
        self.mirror(CHAPTERS, &self.chapters);
        Ok(())
    }

    // ==================== Reader Navigation ====================

    /// Make `id` the chapter being read
    pub fn select_chapter(&mut self, id: &str) -> Option<&Chapter> {
        let index = self.chapters.iter().position(|c| c.id == id)?;
        self.current_chapter = Some(id.to_string());
        self.chapters.get(index)
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.current_chapter
            .as_deref()
            .and_then(|id| self.chapter(id))
    }

    pub fn first_chapter(&self, language: Language) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.language == language)
    }

    /// The chapter after `id` in the same language
    pub fn next_chapter(&self, id: &str) -> Option<&Chapter> {
        let (index, siblings) = self.siblings(id)?;
        siblings.get(index + 1).copied()
    }

    /// The chapter before `id` in the same language
    pub fn previous_chapter(&self, id: &str) -> Option<&Chapter> {
        let (index, siblings) = self.siblings(id)?;
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }

    /// Zero-based index of `id` among chapters of its language, and their count
    pub fn position_in_language(&self, id: &str) -> Option<(usize, usize)> {
        let (index, siblings) = self.siblings(id)?;
        Some((index, siblings.len()))
    }

    fn siblings(&self, id: &str) -> Option<(usize, Vec<&Chapter>)> {
        let chapter = self.chapter(id)?;
        let siblings = self.chapters_in(chapter.language);
        let index = siblings.iter().position(|c| c.id == id)?;
        Some((index, siblings))
    }

    // ==================== Bookmark Operations ====================

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn bookmark_for(&self, chapter_id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.chapter_id == chapter_id)
    }

    pub fn is_bookmarked(&self, chapter_id: &str) -> bool {
        self.bookmark_for(chapter_id).is_some()
    }

    /// Bookmarks joined with their chapters, newest first
    ///
    /// Bookmarks whose chapter no longer exists are skipped.
    pub fn bookmark_entries(&self) -> Vec<BookmarkEntry<'_>> {
        self.bookmarks
            .iter()
            .filter_map(|bookmark| {
                self.chapter(&bookmark.chapter_id)
                    .map(|chapter| BookmarkEntry { bookmark, chapter })
            })
            .collect()
    }

    pub async fn add_bookmark(&mut self, draft: BookmarkDraft) -> StoreResult<Bookmark> {
        let bookmark = logged("add bookmark", self.client.insert_bookmark(&draft).await)?;
        debug!("Bookmarked chapter {}", bookmark.chapter_id);

        self.bookmarks.insert(0, bookmark.clone());
        self.mirror(BOOKMARKS, &self.bookmarks);
        Ok(bookmark)
    }

    pub async fn remove_bookmark(&mut self, id: &str) -> StoreResult<()> {
        logged("remove bookmark", self.client.delete_bookmark(id).await)?;
        debug!("Removed bookmark {}", id);

        self.bookmarks.retain(|b| b.id != id);
        self.mirror(BOOKMARKS, &self.bookmarks);
        Ok(())
    }

    /// Set or clear the note attached to a bookmark
    ///
    /// Blank text clears the note.
    pub async fn annotate_bookmark(
        &mut self,
        id: &str,
        note: Option<String>,
    ) -> StoreResult<Bookmark> {
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let patch = BookmarkPatch {
            position: None,
            note: Some(note),
        };
        let bookmark = logged("annotate bookmark", self.client.update_bookmark(id, &patch).await)?;

        if let Some(existing) = self.bookmarks.iter_mut().find(|b| b.id == bookmark.id) {
            *existing = bookmark.clone();
        }
        self.mirror(BOOKMARKS, &self.bookmarks);
        Ok(bookmark)
    }

    /// Bookmark the chapter, or remove its bookmark if it has one
    ///
    /// Returns whether the chapter is bookmarked afterwards.
    pub async fn toggle_bookmark(&mut self, chapter_id: &str) -> StoreResult<bool> {
        match self.bookmark_for(chapter_id).map(|b| b.id.clone()) {
            Some(id) => {
                self.remove_bookmark(&id).await?;
                Ok(false)
            }
            None => {
                self.add_bookmark(BookmarkDraft::for_chapter(chapter_id))
                    .await?;
                Ok(true)
            }
        }
    }

    // ==================== Note Operations ====================

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn notes_for_chapter(&self, chapter_id: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.chapter_id == chapter_id)
            .collect()
    }

    /// Notes joined with their chapters, newest first
    ///
    /// Notes whose chapter no longer exists are skipped.
    pub fn note_entries(&self) -> Vec<NoteEntry<'_>> {
        self.notes
            .iter()
            .filter_map(|note| {
                self.chapter(&note.chapter_id)
                    .map(|chapter| NoteEntry { note, chapter })
            })
            .collect()
    }

    pub async fn add_note(&mut self, draft: NoteDraft) -> StoreResult<Note> {
        draft.validate()?;
        let note = logged("add note", self.client.insert_note(&draft).await)?;
        debug!("Added note {} on chapter {}", note.id, note.chapter_id);

        self.notes.insert(0, note.clone());
        self.mirror(NOTES, &self.notes);
        Ok(note)
    }

    /// Replace a note's text
    pub async fn update_note(&mut self, id: &str, text: &str) -> StoreResult<Note> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        let patch = NotePatch {
            text: text.to_string(),
        };
        let note = logged("update note", self.client.update_note(id, &patch).await)?;

        if let Some(existing) = self.notes.iter_mut().find(|n| n.id == note.id) {
            *existing = note.clone();
        }
        self.mirror(NOTES, &self.notes);
        Ok(note)
    }

    pub async fn remove_note(&mut self, id: &str) -> StoreResult<()> {
        logged("remove note", self.client.delete_note(id).await)?;
        debug!("Removed note {}", id);

        self.notes.retain(|n| n.id != id);
        self.mirror(NOTES, &self.notes);
        Ok(())
    }

    // ==================== Testimonial Operations ====================

    pub fn testimonials(&self) -> &[Testimonial] {
        &self.testimonials
    }

    pub fn testimonial(&self, id: &str) -> Option<&Testimonial> {
        self.testimonials.iter().find(|t| t.id == id)
    }

    pub fn approved_testimonials(&self) -> Vec<&Testimonial> {
        self.testimonials.iter().filter(|t| t.approved).collect()
    }

    pub fn pending_testimonials(&self) -> Vec<&Testimonial> {
        self.testimonials.iter().filter(|t| !t.approved).collect()
    }

    /// The newest `limit` approved testimonials
    pub fn featured_testimonials(&self, limit: usize) -> Vec<&Testimonial> {
        self.testimonials
            .iter()
            .filter(|t| t.approved)
            .take(limit)
            .collect()
    }

    /// Submit a testimonial; it is stored pending approval
    pub async fn add_testimonial(&mut self, draft: TestimonialDraft) -> StoreResult<Testimonial> {
        draft.validate()?;
        let testimonial = logged(
            "add testimonial",
            self.client.insert_testimonial(&draft).await,
        )?;
        debug!("Received testimonial {} from {}", testimonial.id, testimonial.name);

        self.testimonials.insert(0, testimonial.clone());
        self.mirror(TESTIMONIALS, &self.testimonials);
        Ok(testimonial)
    }

    pub async fn update_testimonial(
        &mut self,
        id: &str,
        patch: TestimonialPatch,
    ) -> StoreResult<Testimonial> {
        patch.validate()?;
        let testimonial = logged(
            "update testimonial",
            self.client.update_testimonial(id, &patch).await,
        )?;

        if let Some(existing) = self.testimonials.iter_mut().find(|t| t.id == testimonial.id) {
            *existing = testimonial.clone();
        }
        self.mirror(TESTIMONIALS, &self.testimonials);
        Ok(testimonial)
    }

    pub async fn approve_testimonial(&mut self, id: &str) -> StoreResult<Testimonial> {
        self.update_testimonial(id, TestimonialPatch::approve()).await
    }

    pub async fn remove_testimonial(&mut self, id: &str) -> StoreResult<()> {
        logged("remove testimonial", self.client.delete_testimonial(id).await)?;
        debug!("Removed testimonial {}", id);

        self.testimonials.retain(|t| t.id != id);
        self.mirror(TESTIMONIALS, &self.testimonials);
        Ok(())
    }

    // ==================== Stats ====================

    pub fn dashboard(&self) -> DashboardStats {
        let count_in = |language| {
            self.chapters
                .iter()
                .filter(|c| c.language == language)
                .count()
        };
        let approved = self.testimonials.iter().filter(|t| t.approved).count();

        DashboardStats {
            english_chapters: count_in(Language::English),
            urdu_chapters: count_in(Language::Urdu),
            pending_testimonials: self.testimonials.len() - approved,
            approved_testimonials: approved,
            bookmarks: self.bookmarks.len(),
            notes: self.notes.len(),
        }
    }
}

/// Log a failed remote call before handing it back
fn logged<T>(action: &str, result: RemoteResult<T>) -> StoreResult<T> {
    result.map_err(|e| {
        warn!("Failed to {}: {}", action, e);
        StoreError::Remote(e)
    })
}

/// Log a cache failure with its recovery hint
fn warn_cache(action: &str, error: &CacheError) {
    match error.recovery_suggestion() {
        Some(hint) => warn!("Failed to {}: {} {}", action, error, hint),
        None => warn!("Failed to {}: {}", action, error),
    }
}

/// In-process backend for local mode, plus the collections that must not
/// be mirrored because their cache file could not be read
fn local_backend(cache: Option<&LocalCache>) -> (MemoryBackend, Vec<&'static str>) {
    let Some(cache) = cache else {
        debug!("Seeding local backend with sample content");
        return (MemoryBackend::with_sample_content(), Vec::new());
    };

    let load = cache.load_snapshot();
    for (key, e) in &load.failed {
        warn_cache(&format!("read {} cache", key), e);
    }

    if load.is_fresh() {
        debug!("Seeding local backend with sample content");
        return (MemoryBackend::with_sample_content(), Vec::new());
    }

    debug!("Seeding local backend from cache");
    let unread = load.unread();
    (MemoryBackend::from_snapshot(load.snapshot), unread)
}
