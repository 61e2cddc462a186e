//! PostgREST client
//!
//! Talks to a managed Postgres data store through its REST interface
//! (`{base}/rest/v1/{collection}`):
//!
//! - list: `GET ?select=*&order=<column>.<dir>`
//! - insert: `POST` with `Prefer: return=representation`
//! - update: `PATCH ?id=eq.<id>` with `Prefer: return=representation`
//! - delete: `DELETE ?id=eq.<id>`
//!
//! Every request carries the configured timeout. Failures are returned to the
//! caller as-is, never retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::collections::{BOOKMARKS, CHAPTERS, NOTES, TESTIMONIALS};
use super::error::{RemoteError, RemoteResult};
use super::rows::{
    BookmarkInsert, BookmarkRow, ChapterInsert, ChapterRow, ChapterUpdate, NoteInsert, NoteRow,
    TestimonialInsert, TestimonialRow,
};
use super::PersistenceClient;
use crate::config::Config;
use crate::models::{
    Bookmark, BookmarkDraft, BookmarkPatch, Chapter, ChapterDraft, ChapterPatch, Note, NoteDraft,
    NotePatch, Testimonial, TestimonialDraft, TestimonialPatch,
};

const CHAPTER_ORDER: &str = "order.asc";
const NEWEST_FIRST: &str = "created_at.desc";

/// HTTP client for the managed data store
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Build a client for `base_url`, authenticating with `api_key` when given
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> RemoteResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RemoteError::Config("remote URL is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let apikey = HeaderValue::from_str(key)
                .map_err(|_| RemoteError::Config("API key is not a valid header value".to_string()))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| RemoteError::Config("API key is not a valid header value".to_string()))?;
            headers.insert("apikey", apikey);
            headers.insert(AUTHORIZATION, bearer);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sahifa/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Build a client from the `remote_url`, `api_key` and timeout settings
    pub fn from_config(config: &Config) -> RemoteResult<Self> {
        let url = config
            .remote_url
            .as_deref()
            .ok_or_else(|| RemoteError::Config("remote_url is not set".to_string()))?;
        Self::new(url, config.api_key.as_deref(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    async fn select<R: DeserializeOwned>(
        &self,
        collection: &'static str,
        order: &str,
    ) -> RemoteResult<Vec<R>> {
        let request = self
            .http
            .get(self.endpoint(collection))
            .query(&[("select", "*"), ("order", order)]);
        let response = send(collection, "list", request).await?;
        decode_rows(collection, response).await
    }

    async fn insert<B, R>(&self, collection: &'static str, body: &B) -> RemoteResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .http
            .post(self.endpoint(collection))
            .header("Prefer", "return=representation")
            .json(body);
        let response = send(collection, "insert", request).await?;
        decode_rows(collection, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Status {
                status: 200,
                message: format!("insert into {} returned no row", collection),
            })
    }

    async fn patch<B, R>(&self, collection: &'static str, id: &str, body: &B) -> RemoteResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .http
            .patch(self.endpoint(collection))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(body);
        let response = send(collection, "update", request).await?;
        decode_rows(collection, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::not_found(collection, id))
    }

    async fn remove(&self, collection: &'static str, id: &str) -> RemoteResult<()> {
        let request = self
            .http
            .delete(self.endpoint(collection))
            .query(&[("id", format!("eq.{}", id))]);
        send(collection, "delete", request).await?;
        Ok(())
    }
}

/// Send a request and turn non-2xx responses into `RemoteError::Status`
async fn send(
    collection: &'static str,
    action: &str,
    request: RequestBuilder,
) -> RemoteResult<Response> {
    debug!("{} {}", action, collection);

    let response = request.send().await.map_err(|e| {
        warn!("{} {} failed: {}", action, collection, e);
        RemoteError::Http(e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body
    };
    warn!("{} {} rejected with {}: {}", action, collection, status, message);

    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode_rows<R: DeserializeOwned>(
    collection: &'static str,
    response: Response,
) -> RemoteResult<Vec<R>> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| RemoteError::Decode { collection, source })
}

#[async_trait]
impl PersistenceClient for RestClient {
    async fn list_chapters(&self) -> RemoteResult<Vec<Chapter>> {
        let rows: Vec<ChapterRow> = self.select(CHAPTERS, CHAPTER_ORDER).await?;
        Ok(rows.into_iter().map(ChapterRow::into_domain).collect())
    }

    async fn insert_chapter(&self, draft: &ChapterDraft) -> RemoteResult<Chapter> {
        let row: ChapterRow = self.insert(CHAPTERS, &ChapterInsert::from(draft)).await?;
        Ok(row.into_domain())
    }

    async fn update_chapter(&self, id: &str, patch: &ChapterPatch) -> RemoteResult<Chapter> {
        let row: ChapterRow = self.patch(CHAPTERS, id, &ChapterUpdate::from(patch)).await?;
        Ok(row.into_domain())
    }

    async fn delete_chapter(&self, id: &str) -> RemoteResult<()> {
        self.remove(CHAPTERS, id).await
    }

    async fn list_bookmarks(&self) -> RemoteResult<Vec<Bookmark>> {
        let rows: Vec<BookmarkRow> = self.select(BOOKMARKS, NEWEST_FIRST).await?;
        Ok(rows.into_iter().map(BookmarkRow::into_domain).collect())
    }

    async fn insert_bookmark(&self, draft: &BookmarkDraft) -> RemoteResult<Bookmark> {
        let row: BookmarkRow = self.insert(BOOKMARKS, &BookmarkInsert::from(draft)).await?;
        Ok(row.into_domain())
    }

    async fn update_bookmark(&self, id: &str, patch: &BookmarkPatch) -> RemoteResult<Bookmark> {
        let row: BookmarkRow = self.patch(BOOKMARKS, id, patch).await?;
        Ok(row.into_domain())
    }

    async fn delete_bookmark(&self, id: &str) -> RemoteResult<()> {
        self.remove(BOOKMARKS, id).await
    }

    async fn list_notes(&self) -> RemoteResult<Vec<Note>> {
        let rows: Vec<NoteRow> = self.select(NOTES, NEWEST_FIRST).await?;
        Ok(rows.into_iter().map(NoteRow::into_domain).collect())
    }

    async fn insert_note(&self, draft: &NoteDraft) -> RemoteResult<Note> {
        let row: NoteRow = self.insert(NOTES, &NoteInsert::from(draft)).await?;
        Ok(row.into_domain())
    }

    async fn update_note(&self, id: &str, patch: &NotePatch) -> RemoteResult<Note> {
        let row: NoteRow = self.patch(NOTES, id, patch).await?;
        Ok(row.into_domain())
    }

    async fn delete_note(&self, id: &str) -> RemoteResult<()> {
        self.remove(NOTES, id).await
    }

    async fn list_testimonials(&self) -> RemoteResult<Vec<Testimonial>> {
        let rows: Vec<TestimonialRow> = self.select(TESTIMONIALS, NEWEST_FIRST).await?;
        Ok(rows.into_iter().map(TestimonialRow::into_domain).collect())
    }

    async fn insert_testimonial(&self, draft: &TestimonialDraft) -> RemoteResult<Testimonial> {
        let row: TestimonialRow = self
            .insert(TESTIMONIALS, &TestimonialInsert::from(draft))
            .await?;
        Ok(row.into_domain())
    }

    async fn update_testimonial(
        &self,
        id: &str,
        patch: &TestimonialPatch,
    ) -> RemoteResult<Testimonial> {
        let row: TestimonialRow = self.patch(TESTIMONIALS, id, patch).await?;
        Ok(row.into_domain())
    }

    async fn delete_testimonial(&self, id: &str) -> RemoteResult<()> {
        self.remove(TESTIMONIALS, id).await
    }

    fn describe(&self) -> String {
        format!("remote ({})", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RestClient {
        RestClient::new(&server.uri(), Some("test-key"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_url() {
        let result = RestClient::new("  ", None, Duration::from_secs(1));
        assert!(matches!(result, Err(RemoteError::Config(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            RestClient::new("https://books.example.co/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://books.example.co");
        assert_eq!(
            client.endpoint("notes"),
            "https://books.example.co/rest/v1/notes"
        );
    }

    #[tokio::test]
    async fn test_list_chapters_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chapters"))
            .and(query_param("select", "*"))
            .and(query_param("order", "order.asc"))
            .and(header("apikey", "test-key"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "1", "title": "Intro", "content": "Bismillah", "language": "english",
                 "order": 1, "images": null, "created_at": "2024-01-01T00:00:00Z"},
                {"id": "4", "title": "تعارف", "content": "بسم اللہ", "language": "urdu",
                 "order": 1, "images": ["https://img.example/p1.png"],
                 "created_at": "2024-01-01T00:00:00Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let chapters = client_for(&server).list_chapters().await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Intro");
        assert!(chapters[0].images.is_empty());
        assert_eq!(chapters[1].language, Language::Urdu);
        assert_eq!(chapters[1].images.len(), 1);
    }

    #[tokio::test]
    async fn test_list_notes_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/notes"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let notes = client_for(&server).list_notes().await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_insert_testimonial_sends_unapproved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/testimonials"))
            .and(header("prefer", "return=representation"))
            .and(body_partial_json(json!({"name": "Sister Fatima", "approved": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                {"id": "t9", "name": "Sister Fatima", "text": "Enlightening", "rating": 5,
                 "approved": false, "created_at": "2024-01-20T00:00:00+00:00"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let draft = TestimonialDraft::new("Sister Fatima", "Enlightening", 5);
        let created = client_for(&server).insert_testimonial(&draft).await.unwrap();
        assert_eq!(created.id, "t9");
        assert!(!created.approved);
    }

    #[tokio::test]
    async fn test_insert_bookmark_maps_chapter_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/bookmarks"))
            .and(body_partial_json(json!({"chapter_id": "2", "position": 0})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                {"id": "b1", "chapter_id": "2", "position": 0, "note": null,
                 "created_at": "2024-03-01T12:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let created = client_for(&server)
            .insert_bookmark(&BookmarkDraft::for_chapter("2"))
            .await
            .unwrap();
        assert_eq!(created.chapter_id, "2");
        assert!(created.note.is_none());
    }

    #[tokio::test]
    async fn test_update_filters_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/testimonials"))
            .and(query_param("id", "eq.t1"))
            .and(body_partial_json(json!({"approved": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "t1", "name": "Professor Mahmoud", "text": "Excellent", "rating": 4,
                 "approved": true, "created_at": "2024-02-01T00:00:00Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let updated = client_for(&server)
            .update_testimonial("t1", &TestimonialPatch::approve())
            .await
            .unwrap();
        assert!(updated.approved);
        assert_eq!(updated.rating, 4);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let patch = NotePatch {
            text: "new".to_string(),
        };
        let err = client_for(&server).update_note("gone", &patch).await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound { collection: "notes", .. }));
    }

    #[tokio::test]
    async fn test_delete_uses_id_filter() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/chapters"))
            .and(query_param("id", "eq.c1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_chapter("c1").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_request_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/bookmarks"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"JWT expired"}"#))
            .mount(&server)
            .await;

        let err = client_for(&server).list_bookmarks().await.unwrap_err();
        match err {
            RemoteError::Status { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("JWT expired"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_rows_are_decode_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/testimonials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "t1"}])))
            .mount(&server)
            .await;

        let err = client_for(&server).list_testimonials().await.unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Decode {
                collection: "testimonials",
                ..
            }
        ));
    }
}
