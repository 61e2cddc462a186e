//! Persistence client
//!
//! The boundary between the in-memory records and the managed data store.
//! Each of the four collections supports list, insert, partial update and
//! delete. Lists come back in a fixed order:
//!
//! - chapters by `order` ascending
//! - bookmarks, notes and testimonials newest first
//!
//! Two implementations are provided: [`RestClient`] talks to a PostgREST
//! endpoint, [`MemoryBackend`] keeps everything in process (local mode and
//! tests). Neither retries a failed call.

pub mod error;
pub mod memory;
pub mod rest;
pub mod rows;

use async_trait::async_trait;

use crate::models::{
    Bookmark, BookmarkDraft, BookmarkPatch, Chapter, ChapterDraft, ChapterPatch, Note, NoteDraft,
    NotePatch, Testimonial, TestimonialDraft, TestimonialPatch,
};

pub use error::{RemoteError, RemoteResult};
pub use memory::MemoryBackend;
pub use rest::RestClient;

/// Collection names as used on the wire
pub mod collections {
    pub const CHAPTERS: &str = "chapters";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const NOTES: &str = "notes";
    pub const TESTIMONIALS: &str = "testimonials";
}

/// Row-level access to the four collections
///
/// `update_*` fails with [`RemoteError::NotFound`] when the id is unknown;
/// `delete_*` of an unknown id succeeds.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    // --- Chapters ---
    async fn list_chapters(&self) -> RemoteResult<Vec<Chapter>>;

    async fn insert_chapter(&self, draft: &ChapterDraft) -> RemoteResult<Chapter>;

    async fn update_chapter(&self, id: &str, patch: &ChapterPatch) -> RemoteResult<Chapter>;

    async fn delete_chapter(&self, id: &str) -> RemoteResult<()>;

    // --- Bookmarks ---
    async fn list_bookmarks(&self) -> RemoteResult<Vec<Bookmark>>;

    async fn insert_bookmark(&self, draft: &BookmarkDraft) -> RemoteResult<Bookmark>;

    async fn update_bookmark(&self, id: &str, patch: &BookmarkPatch) -> RemoteResult<Bookmark>;

    async fn delete_bookmark(&self, id: &str) -> RemoteResult<()>;

    // --- Notes ---
    async fn list_notes(&self) -> RemoteResult<Vec<Note>>;

    async fn insert_note(&self, draft: &NoteDraft) -> RemoteResult<Note>;

    async fn update_note(&self, id: &str, patch: &NotePatch) -> RemoteResult<Note>;

    async fn delete_note(&self, id: &str) -> RemoteResult<()>;

    // --- Testimonials ---
    async fn list_testimonials(&self) -> RemoteResult<Vec<Testimonial>>;

    /// Always stores the testimonial unapproved
    async fn insert_testimonial(&self, draft: &TestimonialDraft) -> RemoteResult<Testimonial>;

    async fn update_testimonial(
        &self,
        id: &str,
        patch: &TestimonialPatch,
    ) -> RemoteResult<Testimonial>;

    async fn delete_testimonial(&self, id: &str) -> RemoteResult<()>;

    /// Short label for logs and status output
    fn describe(&self) -> String;
}
