//! Admin command handlers
//!
//! Chapter management and testimonial moderation. No authorization is
//! enforced; whoever can reach the data store can run these.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use sahifa_core::{ChapterDraft, ContentStore, Language, TestimonialPatch};

use crate::editor::{confirm, edit_text, prompt_with_default};
use crate::images;
use crate::output::{short_id, Output};

/// Show the dashboard counts
pub fn dashboard(store: &ContentStore, output: &Output) -> Result<()> {
    output.print_dashboard(&store.dashboard());
    Ok(())
}

/// Chapter fields given on the command line
#[derive(Debug, Default)]
pub struct ChapterFields {
    pub title: Option<String>,
    pub language: Option<Language>,
    pub order: Option<i32>,
    pub content: Option<String>,
    pub content_file: Option<PathBuf>,
    pub images: Vec<String>,
    /// Local image files, embedded as data URLs
    pub image_files: Vec<PathBuf>,
    /// 1-based page numbers to drop from the existing images
    pub remove_images: Vec<usize>,
    pub clear_images: bool,
}

impl ChapterFields {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.language.is_none()
            && self.order.is_none()
            && self.content.is_none()
            && self.content_file.is_none()
            && self.images.is_empty()
            && self.image_files.is_empty()
            && self.remove_images.is_empty()
            && !self.clear_images
    }

    /// Content from --content or --content-file
    fn read_content(&self) -> Result<Option<String>> {
        if let Some(ref content) = self.content {
            return Ok(Some(content.clone()));
        }
        match self.content_file {
            Some(ref path) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("Failed to read content file: {:?}", path)),
            None => Ok(None),
        }
    }

    /// Overlay the given fields on `draft`
    fn apply_to(&self, draft: &mut ChapterDraft) -> Result<()> {
        if let Some(ref title) = self.title {
            draft.title = title.clone();
        }
        if let Some(language) = self.language {
            draft.language = language;
        }
        if let Some(order) = self.order {
            draft.order = order;
        }
        if let Some(content) = self.read_content()? {
            draft.content = content;
        }
        if self.clear_images {
            draft.images.clear();
        }
        remove_pages(&mut draft.images, &self.remove_images)?;
        draft.images.extend(self.images.iter().cloned());
        for path in &self.image_files {
            draft.images.push(images::data_url_from_file(path)?);
        }
        Ok(())
    }
}

/// Drop the given 1-based pages, all checked before any is removed
fn remove_pages(images: &mut Vec<String>, pages: &[usize]) -> Result<()> {
    let count = images.len();
    if let Some(page) = pages.iter().find(|&&p| p == 0 || p > count) {
        bail!(
            "No image {} to remove (the chapter has {} image(s))",
            page,
            count
        );
    }

    let mut index = 0;
    images.retain(|_| {
        index += 1;
        !pages.contains(&index)
    });
    Ok(())
}

/// Add a chapter
pub async fn add_chapter(
    store: &mut ContentStore,
    fields: ChapterFields,
    output: &Output,
) -> Result<()> {
    let title = fields
        .title
        .clone()
        .ok_or_else(|| anyhow!("A title is required (--title)"))?;
    let language = fields
        .language
        .ok_or_else(|| anyhow!("A language is required (--language)"))?;
    let order = match fields.order {
        Some(order) => order,
        None => next_order(store, language)?,
    };

    let mut draft = ChapterDraft::new(title, language, order);
    fields.apply_to(&mut draft)?;

    if draft.content.trim().is_empty() && draft.images.is_empty() {
        draft.content =
            edit_text("# Chapter text. Lines starting with # are ignored.\n\n")
                .context("Failed to edit chapter")?;
    }

    let chapter = store
        .add_chapter(draft)
        .await
        .context("Failed to add chapter")?;

    output.success(&format!(
        "Added chapter {} ({} #{}): {}",
        short_id(&chapter.id),
        chapter.language,
        chapter.order,
        chapter.title
    ));
    Ok(())
}

/// One past the highest order in `language`
fn next_order(store: &ContentStore, language: Language) -> Result<i32> {
    match store.chapters_in(language).iter().map(|c| c.order).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            anyhow!(
                "No order left after {} in {}; pass --order explicitly",
                max,
                language
            )
        }),
    }
}

/// Edit a chapter; without flags, prompts for each field
pub async fn edit_chapter(
    store: &mut ContentStore,
    id: &str,
    fields: ChapterFields,
    output: &Output,
) -> Result<()> {
    let id = super::chapter::resolve(store, id)?;
    let mut draft = store
        .chapter(&id)
        .map(|c| c.to_draft())
        .ok_or_else(|| anyhow!("Chapter not found: {}", id))?;

    if fields.is_empty() {
        if !output.should_prompt() {
            bail!("Nothing to change. Pass --title, --order, --content or an image option.");
        }
        prompt_chapter(&mut draft)?;
    } else {
        fields.apply_to(&mut draft)?;
    }

    let chapter = store
        .update_chapter(&id, draft)
        .await
        .context("Failed to update chapter")?;

    output.success(&format!("Updated chapter: {}", chapter.title));
    Ok(())
}

fn prompt_chapter(draft: &mut ChapterDraft) -> Result<()> {
    println!("Press Enter to keep current value, or type new value.\n");

    if let Some(title) = prompt_with_default("Title", &draft.title)? {
        draft.title = title;
    }
    if let Some(language) = prompt_with_default("Language", draft.language.as_str())? {
        draft.language = language.parse().map_err(|e: String| anyhow!(e))?;
    }
    if let Some(order) = prompt_with_default("Order", &draft.order.to_string())? {
        draft.order = order
            .parse()
            .with_context(|| format!("Invalid order: {}", order))?;
    }
    if confirm("Edit chapter text?")? {
        draft.content = edit_text(&draft.content).context("Failed to edit chapter")?;
    }
    Ok(())
}

/// Delete a chapter
pub async fn delete_chapter(store: &mut ContentStore, id: &str, output: &Output) -> Result<()> {
    let id = super::chapter::resolve(store, id)?;

    if output.should_prompt() {
        if let Some(chapter) = store.chapter(&id) {
            println!("Delete chapter: {} - {}", short_id(&chapter.id), chapter.title);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete_chapter(&id)
        .await
        .context("Failed to delete chapter")?;

    output.success(&format!("Deleted chapter: {}", short_id(&id)));
    Ok(())
}

/// Approve a pending testimonial
pub async fn approve_testimonial(store: &mut ContentStore, id: &str, output: &Output) -> Result<()> {
    let id = super::testimonial::resolve(store, id)?;
    let testimonial = store
        .approve_testimonial(&id)
        .await
        .context("Failed to approve testimonial")?;

    output.success(&format!("Approved testimonial from {}", testimonial.name));
    Ok(())
}

/// Edit a testimonial's name, text or rating
pub async fn edit_testimonial(
    store: &mut ContentStore,
    id: &str,
    patch: TestimonialPatch,
    output: &Output,
) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change. Pass --name, --text or --rating.");
    }
    let id = super::testimonial::resolve(store, id)?;
    let testimonial = store
        .update_testimonial(&id, patch)
        .await
        .context("Failed to update testimonial")?;

    output.success(&format!("Updated testimonial from {}", testimonial.name));
    Ok(())
}

/// Delete a testimonial
pub async fn delete_testimonial(store: &mut ContentStore, id: &str, output: &Output) -> Result<()> {
    let id = super::testimonial::resolve(store, id)?;

    if output.should_prompt() {
        if let Some(t) = store.testimonial(&id) {
            println!("Delete testimonial from {}", t.name);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .remove_testimonial(&id)
        .await
        .context("Failed to delete testimonial")?;

    output.success(&format!("Deleted testimonial: {}", short_id(&id)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sahifa_core::MemoryBackend;
    use tempfile::TempDir;

    async fn sample_store() -> ContentStore {
        let mut store = ContentStore::new(Arc::new(MemoryBackend::with_sample_content()));
        store.refresh().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_next_order() {
        let store = sample_store().await;
        assert_eq!(next_order(&store, Language::English).unwrap(), 4);
        assert_eq!(next_order(&store, Language::Urdu).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_next_order_at_max_is_error() {
        let mut store = sample_store().await;
        let draft = ChapterDraft::new("Appendix", Language::English, i32::MAX).with_content("x");
        store.add_chapter(draft).await.unwrap();

        let err = next_order(&store, Language::English).unwrap_err();
        assert!(err.to_string().contains("--order"));
        // Other languages are unaffected
        assert_eq!(next_order(&store, Language::Urdu).unwrap(), 3);
    }

    #[test]
    fn test_fields_overlay_draft() {
        let mut draft = ChapterDraft::new("Old", Language::English, 1).with_content("Body");
        let fields = ChapterFields {
            title: Some("New".to_string()),
            images: vec!["https://img.example/1.png".to_string()],
            ..ChapterFields::default()
        };

        fields.apply_to(&mut draft).unwrap();
        assert_eq!(draft.title, "New");
        assert_eq!(draft.content, "Body");
        assert_eq!(draft.images.len(), 1);
    }

    #[test]
    fn test_remove_image_by_page() {
        let mut draft = ChapterDraft::new("Scans", Language::Urdu, 1).with_images(vec![
            "p1".to_string(),
            "p2".to_string(),
            "p3".to_string(),
        ]);
        let fields = ChapterFields {
            remove_images: vec![2],
            images: vec!["p4".to_string()],
            ..ChapterFields::default()
        };

        fields.apply_to(&mut draft).unwrap();
        assert_eq!(draft.images, vec!["p1", "p3", "p4"]);
    }

    #[test]
    fn test_remove_image_out_of_range() {
        let mut draft =
            ChapterDraft::new("Scans", Language::Urdu, 1).with_images(vec!["p1".to_string()]);
        let fields = ChapterFields {
            remove_images: vec![1, 3],
            ..ChapterFields::default()
        };

        assert!(fields.apply_to(&mut draft).is_err());
        assert_eq!(draft.images, vec!["p1"]);
    }

    #[test]
    fn test_image_file_embedded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("page.gif");
        std::fs::write(&path, b"GIF89a\x01\x00").unwrap();

        let mut draft = ChapterDraft::new("Scans", Language::English, 1);
        let fields = ChapterFields {
            image_files: vec![path],
            ..ChapterFields::default()
        };

        fields.apply_to(&mut draft).unwrap();
        assert_eq!(draft.images.len(), 1);
        assert!(draft.images[0].starts_with("data:image/gif;base64,"));
    }

    #[test]
    fn test_content_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chapter.txt");
        std::fs::write(&path, "بسم اللہ").unwrap();

        let fields = ChapterFields {
            content_file: Some(path),
            ..ChapterFields::default()
        };
        assert_eq!(fields.read_content().unwrap().as_deref(), Some("بسم اللہ"));
    }

    #[tokio::test]
    async fn test_add_chapter_with_flags() {
        let mut store = sample_store().await;
        let output = Output::new(crate::output::OutputFormat::Quiet);

        let fields = ChapterFields {
            title: Some("روزہ اور صحت".to_string()),
            language: Some(Language::Urdu),
            content: Some("متن".to_string()),
            ..ChapterFields::default()
        };
        add_chapter(&mut store, fields, &output).await.unwrap();

        let urdu = store.chapters_in(Language::Urdu);
        assert_eq!(urdu.len(), 3);
        assert_eq!(urdu[2].order, 3);
    }

    #[tokio::test]
    async fn test_edit_testimonial_requires_changes() {
        let mut store = sample_store().await;
        let output = Output::new(crate::output::OutputFormat::Quiet);

        let result = edit_testimonial(&mut store, "1", TestimonialPatch::default(), &output).await;
        assert!(result.is_err());
    }
}
