//! In-process backend
//!
//! Holds the four collections in memory behind a mutex and follows the same
//! contract as the remote store: server-assigned ids and timestamps, fixed
//! list order, not-found on update, idempotent delete.
//!
//! Used for local mode (seeded from the cache or sample content) and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::collections::{BOOKMARKS, CHAPTERS, NOTES, TESTIMONIALS};
use super::error::{RemoteError, RemoteResult};
use super::PersistenceClient;
use crate::models::{
    Bookmark, BookmarkDraft, BookmarkPatch, Chapter, ChapterDraft, ChapterPatch, Note, NoteDraft,
    NotePatch, Snapshot, Testimonial, TestimonialDraft, TestimonialPatch,
};
use crate::seed;

/// Backend keeping every collection in process memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<Snapshot>,
    offline: AtomicBool,
}

impl MemoryBackend {
    /// An empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend holding the given collections
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            offline: AtomicBool::new(false),
        }
    }

    /// A backend holding the bundled sample chapters and testimonials
    pub fn with_sample_content() -> Self {
        Self::from_snapshot(seed::sample_snapshot())
    }

    /// Make every call fail with `RemoteError::Unavailable` until reset
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        // A panic while holding the lock cannot leave a half-applied change
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RemoteError::Unavailable(
                "in-memory backend is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl PersistenceClient for MemoryBackend {
    async fn list_chapters(&self) -> RemoteResult<Vec<Chapter>> {
        self.ensure_online()?;
        let mut chapters = self.lock().chapters.clone();
        chapters.sort_by_key(|c| c.order);
        Ok(chapters)
    }

    async fn insert_chapter(&self, draft: &ChapterDraft) -> RemoteResult<Chapter> {
        self.ensure_online()?;
        let chapter = Chapter {
            id: new_id(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            language: draft.language,
            order: draft.order,
            images: draft.images.clone(),
        };
        self.lock().chapters.push(chapter.clone());
        Ok(chapter)
    }

    async fn update_chapter(&self, id: &str, patch: &ChapterPatch) -> RemoteResult<Chapter> {
        self.ensure_online()?;
        let mut state = self.lock();
        let chapter = state
            .chapters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RemoteError::not_found(CHAPTERS, id))?;
        chapter.apply(patch);
        Ok(chapter.clone())
    }

    async fn delete_chapter(&self, id: &str) -> RemoteResult<()> {
        self.ensure_online()?;
        self.lock().chapters.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_bookmarks(&self) -> RemoteResult<Vec<Bookmark>> {
        self.ensure_online()?;
        let mut bookmarks = self.lock().bookmarks.clone();
        bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookmarks)
    }

    async fn insert_bookmark(&self, draft: &BookmarkDraft) -> RemoteResult<Bookmark> {
        self.ensure_online()?;
        let bookmark = Bookmark {
            id: new_id(),
            chapter_id: draft.chapter_id.clone(),
            position: draft.position,
            note: draft.note.clone(),
            created_at: Utc::now(),
        };
        self.lock().bookmarks.insert(0, bookmark.clone());
        Ok(bookmark)
    }

    async fn update_bookmark(&self, id: &str, patch: &BookmarkPatch) -> RemoteResult<Bookmark> {
        self.ensure_online()?;
        let mut state = self.lock();
        let bookmark = state
            .bookmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| RemoteError::not_found(BOOKMARKS, id))?;
        bookmark.apply(patch);
        Ok(bookmark.clone())
    }

    async fn delete_bookmark(&self, id: &str) -> RemoteResult<()> {
        self.ensure_online()?;
        self.lock().bookmarks.retain(|b| b.id != id);
        Ok(())
    }

    async fn list_notes(&self) -> RemoteResult<Vec<Note>> {
        self.ensure_online()?;
        let mut notes = self.lock().notes.clone();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn insert_note(&self, draft: &NoteDraft) -> RemoteResult<Note> {
        self.ensure_online()?;
        let note = Note {
            id: new_id(),
            chapter_id: draft.chapter_id.clone(),
            position: draft.position,
            text: draft.text.clone(),
            created_at: Utc::now(),
        };
        self.lock().notes.insert(0, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &str, patch: &NotePatch) -> RemoteResult<Note> {
        self.ensure_online()?;
        let mut state = self.lock();
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| RemoteError::not_found(NOTES, id))?;
        note.text = patch.text.clone();
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &str) -> RemoteResult<()> {
        self.ensure_online()?;
        self.lock().notes.retain(|n| n.id != id);
        Ok(())
    }

    async fn list_testimonials(&self) -> RemoteResult<Vec<Testimonial>> {
        self.ensure_online()?;
        let mut testimonials = self.lock().testimonials.clone();
        testimonials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(testimonials)
    }

    async fn insert_testimonial(&self, draft: &TestimonialDraft) -> RemoteResult<Testimonial> {
        self.ensure_online()?;
        let testimonial = Testimonial {
            id: new_id(),
            name: draft.name.clone(),
            text: draft.text.clone(),
            rating: draft.rating,
            approved: false,
            created_at: Utc::now(),
        };
        self.lock().testimonials.insert(0, testimonial.clone());
        Ok(testimonial)
    }

    async fn update_testimonial(
        &self,
        id: &str,
        patch: &TestimonialPatch,
    ) -> RemoteResult<Testimonial> {
        self.ensure_online()?;
        let mut state = self.lock();
        let testimonial = state
            .testimonials
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RemoteError::not_found(TESTIMONIALS, id))?;
        testimonial.apply(patch);
        Ok(testimonial.clone())
    }

    async fn delete_testimonial(&self, id: &str) -> RemoteResult<()> {
        self.ensure_online()?;
        self.lock().testimonials.retain(|t| t.id != id);
        Ok(())
    }

    fn describe(&self) -> String {
        "local (in-memory)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let backend = MemoryBackend::new();
        let draft = ChapterDraft::new("Intro", Language::English, 1).with_content("Body");

        let a = backend.insert_chapter(&draft).await.unwrap();
        let b = backend.insert_chapter(&draft).await.unwrap();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "Intro");
    }

    #[tokio::test]
    async fn test_chapters_listed_by_order() {
        let backend = MemoryBackend::new();
        for (title, order) in [("Third", 3), ("First", 1), ("Second", 2)] {
            let draft = ChapterDraft::new(title, Language::English, order).with_content("x");
            backend.insert_chapter(&draft).await.unwrap();
        }

        let titles: Vec<_> = backend
            .list_chapters()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_notes_listed_newest_first() {
        let backend = MemoryBackend::new();
        let first = backend.insert_note(&NoteDraft::new("1", "first")).await.unwrap();
        let second = backend.insert_note(&NoteDraft::new("1", "second")).await.unwrap();

        let ids: Vec<_> = backend
            .list_notes()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_testimonials_start_unapproved() {
        let backend = MemoryBackend::new();
        let created = backend
            .insert_testimonial(&TestimonialDraft::new("Amina", "Moving", 5))
            .await
            .unwrap();
        assert!(!created.approved);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .update_testimonial("missing", &TestimonialPatch::approve())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = MemoryBackend::new();
        let bookmark = backend
            .insert_bookmark(&BookmarkDraft::for_chapter("1"))
            .await
            .unwrap();

        backend.delete_bookmark(&bookmark.id).await.unwrap();
        backend.delete_bookmark(&bookmark.id).await.unwrap();
        assert!(backend.list_bookmarks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let backend = MemoryBackend::with_sample_content();
        backend.set_offline(true);

        let err = backend.list_chapters().await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
        assert!(err.is_transient());

        backend.set_offline(false);
        assert!(!backend.list_chapters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_reflects_writes() {
        let backend = MemoryBackend::new();
        backend
            .insert_note(&NoteDraft::new("2", "Amanah"))
            .await
            .unwrap();

        let snapshot = backend.snapshot();
        assert_eq!(snapshot.notes.len(), 1);
        assert!(snapshot.chapters.is_empty());
    }
}
