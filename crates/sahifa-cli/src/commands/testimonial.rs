//! Testimonial command handlers (public side)

use anyhow::{Context, Result};

use sahifa_core::{ContentStore, TestimonialDraft};

use crate::editor::text_or_editor;
use crate::output::Output;

/// Which testimonials to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Approved,
    Pending,
    All,
}

impl Filter {
    pub fn from_flags(pending: bool, all: bool) -> Self {
        if all {
            Filter::All
        } else if pending {
            Filter::Pending
        } else {
            Filter::Approved
        }
    }
}

/// Resolve a testimonial id or prefix
pub fn resolve(store: &ContentStore, id: &str) -> Result<String> {
    super::resolve_id(
        "testimonial",
        id,
        store
            .testimonials()
            .iter()
            .map(|t| (t.id.as_str(), t.name.clone())),
    )
}

pub fn list(store: &ContentStore, filter: Filter, output: &Output) -> Result<()> {
    let testimonials = match filter {
        Filter::Approved => store.approved_testimonials(),
        Filter::Pending => store.pending_testimonials(),
        Filter::All => store.testimonials().iter().collect(),
    };

    output.print_testimonials(&testimonials);
    Ok(())
}

/// Submit a testimonial for review
pub async fn submit(
    store: &mut ContentStore,
    name: String,
    rating: u8,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let text = text_or_editor(
        text,
        "# Share your experience with the book.\n# Lines starting with # are ignored.",
    )
    .context("Failed to edit testimonial")?;

    let testimonial = store
        .add_testimonial(TestimonialDraft::new(name, text, rating))
        .await
        .context("Failed to submit testimonial")?;

    output.success(&format!(
        "Thank you, {}. Your testimonial will appear once approved.",
        testimonial.name
    ));
    Ok(())
}
