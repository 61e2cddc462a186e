//! Data models for Sahifa
//!
//! Defines the core records (Chapter, Bookmark, Note, Testimonial) together
//! with the draft and patch shapes used to create and modify them.
//!
//! Drafts are validated before any remote call is made; a draft that fails
//! validation never reaches the persistence layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest rating a testimonial may carry
pub const MIN_RATING: u8 = 1;
/// Highest rating a testimonial may carry
pub const MAX_RATING: u8 = 5;

/// Input rejected before it reaches the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Chapter title cannot be empty")]
    EmptyTitle,

    #[error("Chapter needs either text content or at least one image")]
    MissingContent,

    #[error("Text cannot be empty")]
    EmptyText,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
}

fn check_rating(rating: u8) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Language a chapter is written in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Urdu,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Urdu => "urdu",
        }
    }

    /// Urdu is set right-to-left
    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Urdu)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "urdu" | "ur" => Ok(Language::Urdu),
            other => Err(format!(
                "Unknown language '{}' (expected english or urdu)",
                other
            )),
        }
    }
}

/// A chapter of the book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    /// Opaque identifier assigned by the backend
    pub id: String,
    pub title: String,
    /// Body text; may be empty for scanned-image chapters
    pub content: String,
    pub language: Language,
    /// Sort key within a language, not necessarily unique
    pub order: i32,
    /// Image URLs in display order
    #[serde(default)]
    pub images: Vec<String>,
}

impl Chapter {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Case-insensitive match of an already lowercased needle against title or content
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// The chapter as a draft, for edits that start from the current values
    pub fn to_draft(&self) -> ChapterDraft {
        ChapterDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            language: self.language,
            order: self.order,
            images: self.images.clone(),
        }
    }

    pub(crate) fn apply(&mut self, patch: &ChapterPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(ref images) = patch.images {
            self.images = images.clone();
        }
    }
}

/// Everything needed to create a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub language: Language,
    pub order: i32,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ChapterDraft {
    pub fn new(title: impl Into<String>, language: Language, order: i32) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            language,
            order,
            images: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.content.trim().is_empty() && self.images.is_empty() {
            return Err(ValidationError::MissingContent);
        }
        Ok(())
    }
}

/// Partial chapter update; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChapterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl From<ChapterDraft> for ChapterPatch {
    fn from(draft: ChapterDraft) -> Self {
        Self {
            title: Some(draft.title),
            content: Some(draft.content),
            language: Some(draft.language),
            order: Some(draft.order),
            images: Some(draft.images),
        }
    }
}

/// A reader's marker on a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub chapter_id: String,
    /// Offset within the chapter (always 0 for chapter-level bookmarks)
    pub position: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub(crate) fn apply(&mut self, patch: &BookmarkPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(ref note) = patch.note {
            self.note = note.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkDraft {
    pub chapter_id: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub note: Option<String>,
}

impl BookmarkDraft {
    /// A chapter-level bookmark
    pub fn for_chapter(chapter_id: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            position: 0,
            note: None,
        }
    }
}

/// Partial bookmark update
///
/// `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BookmarkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

/// A reader's annotation on a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: String,
    pub chapter_id: String,
    pub position: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteDraft {
    pub chapter_id: String,
    #[serde(default)]
    pub position: i32,
    pub text: String,
}

impl NoteDraft {
    /// A note on a whole chapter; the text is trimmed
    pub fn new(chapter_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            position: 0,
            text: text.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotePatch {
    pub text: String,
}

/// A reader review of the book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub text: String,
    pub rating: u8,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Testimonial {
    pub(crate) fn apply(&mut self, patch: &TestimonialPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref text) = patch.text {
            self.text = text.clone();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(approved) = patch.approved {
            self.approved = approved;
        }
    }
}

/// A public testimonial submission
///
/// Carries no `approved` field: submissions always start
/// pending, and an `approved` key in incoming JSON is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestimonialDraft {
    pub name: String,
    pub text: String,
    pub rating: u8,
}

impl TestimonialDraft {
    pub fn new(name: impl Into<String>, text: impl Into<String>, rating: u8) -> Self {
        Self {
            name: name.into().trim().to_string(),
            text: text.into().trim().to_string(),
            rating,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        check_rating(self.rating)
    }
}

/// Partial testimonial update (admin edits and approval)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestimonialPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl TestimonialPatch {
    pub fn approve() -> Self {
        Self {
            approved: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.text.is_none() && self.rating.is_none() && self.approved.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.name, Some(ref n) if n.trim().is_empty()) {
            return Err(ValidationError::EmptyName);
        }
        if matches!(self.text, Some(ref t) if t.trim().is_empty()) {
            return Err(ValidationError::EmptyText);
        }
        match self.rating {
            Some(rating) => check_rating(rating),
            None => Ok(()),
        }
    }
}

/// All four collections at one point in time
///
/// Used to seed the in-process backend and to mirror state to the local cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
            && self.bookmarks.is_empty()
            && self.notes.is_empty()
            && self.testimonials.is_empty()
    }
}
