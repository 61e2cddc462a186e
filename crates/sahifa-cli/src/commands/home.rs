//! Home page: what is available to read and what readers say

use anyhow::Result;

use sahifa_core::{ContentStore, Language};

use crate::output::{Output, OutputFormat};

/// Approved testimonials featured on the home page
const FEATURED_TESTIMONIALS: usize = 3;

pub fn show(store: &ContentStore, output: &Output) -> Result<()> {
    let stats = store.dashboard();
    let featured = store.featured_testimonials(FEATURED_TESTIMONIALS);

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "english_chapters": stats.english_chapters,
            "urdu_chapters": stats.urdu_chapters,
            "featured_testimonials": featured,
        })),
        OutputFormat::Quiet => {
            for t in &featured {
                println!("{}", t.id);
            }
        }
        OutputFormat::Human => {
            println!("Sahifa");
            println!("======");
            println!();
            println!(
                "  English  {} chapter(s)   sahifa read {}",
                stats.english_chapters,
                Language::English
            );
            println!(
                "  اردو     {} chapter(s)   sahifa read {}",
                stats.urdu_chapters,
                Language::Urdu
            );
            println!();
            if !featured.is_empty() {
                println!("What readers say:");
                println!();
                output.print_testimonials(&featured);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sahifa_core::{MemoryBackend, TestimonialDraft};

    #[tokio::test]
    async fn test_home_features_approved_only() {
        let mut store = ContentStore::new(Arc::new(MemoryBackend::with_sample_content()));
        store.refresh().await.unwrap();
        for name in ["Amina", "Bilal"] {
            let draft = TestimonialDraft::new(name, "Beautiful", 5);
            let id = store.add_testimonial(draft).await.unwrap().id;
            store.approve_testimonial(&id).await.unwrap();
        }

        let featured = store.featured_testimonials(FEATURED_TESTIMONIALS);
        assert_eq!(featured.len(), 3);
        assert!(featured.iter().all(|t| t.approved));

        show(&store, &Output::new(OutputFormat::Quiet)).unwrap();
    }
}
