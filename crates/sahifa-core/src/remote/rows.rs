//! Wire rows
//!
//! The data store speaks snake_case columns, nullable arrays and ISO-8601
//! timestamp strings. These structs mirror the rows exactly and convert into
//! the domain records in `models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{
    Bookmark, BookmarkDraft, Chapter, ChapterDraft, ChapterPatch, Language, Note, NoteDraft,
    Testimonial, TestimonialDraft,
};

/// Ids are opaque; integer primary keys are accepted and kept as strings
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        String(String),
        Number(i64),
    }

    Ok(match IdValue::deserialize(deserializer)? {
        IdValue::String(s) => s,
        IdValue::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ChapterRow {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub language: Language,
    pub order: i32,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl ChapterRow {
    pub fn into_domain(self) -> Chapter {
        Chapter {
            id: self.id,
            title: self.title,
            content: self.content.unwrap_or_default(),
            language: self.language,
            order: self.order,
            images: self.images.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterInsert<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub language: Language,
    pub order: i32,
    pub images: Option<&'a [String]>,
}

impl<'a> From<&'a ChapterDraft> for ChapterInsert<'a> {
    fn from(draft: &'a ChapterDraft) -> Self {
        Self {
            title: &draft.title,
            content: &draft.content,
            language: draft.language,
            order: draft.order,
            images: non_empty(&draft.images),
        }
    }
}

/// Chapter patch as sent on the wire; an empty image list is written as null
#[derive(Debug, Serialize)]
pub struct ChapterUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Option<&'a [String]>>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a ChapterPatch> for ChapterUpdate<'a> {
    fn from(patch: &'a ChapterPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            content: patch.content.as_deref(),
            language: patch.language,
            order: patch.order,
            images: patch.images.as_ref().map(|images| non_empty(images)),
            updated_at: Utc::now(),
        }
    }
}

fn non_empty(images: &[String]) -> Option<&[String]> {
    if images.is_empty() {
        None
    } else {
        Some(images)
    }
}

#[derive(Debug, Deserialize)]
pub struct BookmarkRow {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(deserialize_with = "opaque_id")]
    pub chapter_id: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookmarkRow {
    pub fn into_domain(self) -> Bookmark {
        Bookmark {
            id: self.id,
            chapter_id: self.chapter_id,
            position: self.position,
            note: self.note,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookmarkInsert<'a> {
    pub chapter_id: &'a str,
    pub position: i32,
    pub note: Option<&'a str>,
}

impl<'a> From<&'a BookmarkDraft> for BookmarkInsert<'a> {
    fn from(draft: &'a BookmarkDraft) -> Self {
        Self {
            chapter_id: &draft.chapter_id,
            position: draft.position,
            note: draft.note.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NoteRow {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(deserialize_with = "opaque_id")]
    pub chapter_id: String,
    #[serde(default)]
    pub position: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl NoteRow {
    pub fn into_domain(self) -> Note {
        Note {
            id: self.id,
            chapter_id: self.chapter_id,
            position: self.position,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteInsert<'a> {
    pub chapter_id: &'a str,
    pub position: i32,
    pub text: &'a str,
}

impl<'a> From<&'a NoteDraft> for NoteInsert<'a> {
    fn from(draft: &'a NoteDraft) -> Self {
        Self {
            chapter_id: &draft.chapter_id,
            position: draft.position,
            text: &draft.text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TestimonialRow {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub name: String,
    pub text: String,
    pub rating: u8,
    #[serde(default)]
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl TestimonialRow {
    pub fn into_domain(self) -> Testimonial {
        Testimonial {
            id: self.id,
            name: self.name,
            text: self.text,
            rating: self.rating,
            approved: self.approved,
            created_at: self.created_at,
        }
    }
}

/// Insert row for a submission; `approved` is always sent as false
#[derive(Debug, Serialize)]
pub struct TestimonialInsert<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub rating: u8,
    pub approved: bool,
}

impl<'a> From<&'a TestimonialDraft> for TestimonialInsert<'a> {
    fn from(draft: &'a TestimonialDraft) -> Self {
        Self {
            name: &draft.name,
            text: &draft.text,
            rating: draft.rating,
            approved: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_chapter_row_nulls() {
        let row: ChapterRow = serde_json::from_value(json!({
            "id": "c1",
            "title": "Scanned Page",
            "content": null,
            "language": "urdu",
            "order": 2,
            "images": null,
            "created_at": "2024-01-15T10:00:00+00:00",
            "updated_at": "2024-01-15T10:00:00+00:00"
        }))
        .unwrap();

        let chapter = row.into_domain();
        assert_eq!(chapter.content, "");
        assert!(chapter.images.is_empty());
        assert_eq!(chapter.language, Language::Urdu);
    }

    #[test]
    fn test_integer_ids_become_strings() {
        let row: BookmarkRow = serde_json::from_value(json!({
            "id": 17,
            "chapter_id": 4,
            "position": 0,
            "note": null,
            "created_at": "2024-02-01T08:30:00Z"
        }))
        .unwrap();

        let bookmark = row.into_domain();
        assert_eq!(bookmark.id, "17");
        assert_eq!(bookmark.chapter_id, "4");
    }

    #[test]
    fn test_timestamps_with_offset_and_fraction() {
        let row: NoteRow = serde_json::from_value(json!({
            "id": "n1",
            "chapter_id": "c1",
            "position": 0,
            "text": "On trust",
            "created_at": "2024-01-20T15:45:10.123456+05:00"
        }))
        .unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 1, 20, 10, 45, 10).unwrap();
        let note = row.into_domain();
        assert_eq!(note.created_at.timestamp(), expected.timestamp());
    }

    #[test]
    fn test_chapter_insert_writes_null_for_no_images() {
        let draft = ChapterDraft::new("Intro", Language::English, 1).with_content("Body");
        let value = serde_json::to_value(ChapterInsert::from(&draft)).unwrap();
        assert_eq!(value["images"], serde_json::Value::Null);
        assert_eq!(value["order"], json!(1));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_chapter_update_only_set_fields() {
        let patch = ChapterPatch {
            order: Some(5),
            images: Some(Vec::new()),
            ..ChapterPatch::default()
        };
        let value = serde_json::to_value(ChapterUpdate::from(&patch)).unwrap();
        assert_eq!(value["order"], json!(5));
        assert_eq!(value["images"], serde_json::Value::Null);
        assert!(value.get("title").is_none());
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn test_testimonial_insert_is_unapproved() {
        let draft = TestimonialDraft::new("Dr. Ahmed", "Insightful", 5);
        let value = serde_json::to_value(TestimonialInsert::from(&draft)).unwrap();
        assert_eq!(value["approved"], json!(false));
        assert_eq!(value["rating"], json!(5));
    }
}
