//! Sahifa Core Library
//!
//! This crate provides the data layer for Sahifa, a reader for a bilingual
//! (English and Urdu) book with bookmarks, notes and reader testimonials.
//!
//! # Architecture
//!
//! - **Persistence client**: row-level access to the managed data store
//!   (PostgREST over HTTP, or an in-process backend in local mode)
//! - **Content store**: owns the collections for a session; mutations are
//!   applied remotely first, then locally
//! - **Local cache**: JSON mirror of every collection, used when the data
//!   store is unreachable
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = ContentStore::open(&config)?;
//! store.refresh().await?;
//!
//! for chapter in store.chapters_in(Language::Urdu) {
//!     println!("{}. {}", chapter.order, chapter.title);
//! }
//!
//! store.toggle_bookmark(&chapter_id).await?;
//! ```
//!
//! # Modules
//!
//! - `store`: Content store (main entry point)
//! - `models`: Chapters, bookmarks, notes, testimonials and their drafts
//! - `remote`: Persistence client trait and its implementations
//! - `storage`: Local JSON cache
//! - `settings`: Reader display settings
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod remote;
pub mod seed;
pub mod settings;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{
    Bookmark, BookmarkDraft, Chapter, ChapterDraft, Language, Note, NoteDraft, Snapshot,
    Testimonial, TestimonialDraft, TestimonialPatch, ValidationError,
};
pub use remote::{MemoryBackend, PersistenceClient, RemoteError, RestClient};
pub use settings::Settings;
pub use storage::{CacheError, CacheLoad, CacheStats, LocalCache};
pub use store::{
    BookmarkEntry, ContentStore, DashboardStats, Hydration, NoteEntry, StoreError, StoreResult,
};
