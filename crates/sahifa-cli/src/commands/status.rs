//! Status command handler

use anyhow::{bail, Context, Result};

use sahifa_core::{Config, ContentStore, Hydration};

use crate::editor::confirm;
use crate::output::{Output, OutputFormat};

/// Show where content comes from and what the store holds
pub fn show(
    store: &ContentStore,
    config: &Config,
    hydration: Option<Hydration>,
    output: &Output,
) -> Result<()> {
    let stats = store.dashboard();
    let cache = store.cache().map(|c| (c.dir().to_path_buf(), c.stats()));
    let source = match hydration {
        Some(Hydration::Remote) => "live",
        Some(Hydration::Cache) => "cache (data store unreachable)",
        None => "unavailable",
    };

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "backend": store.backend(),
                "remote_url": config.remote_url,
                "hydration": hydration,
                "cache": cache.as_ref().map(|(dir, stats)| serde_json::json!({
                    "dir": dir,
                    "files": stats.files,
                    "total_size": stats.total_bytes,
                })),
                "counts": stats,
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", store.backend());
        }
        OutputFormat::Human => {
            println!("Sahifa Status");
            println!("=============");
            println!();
            println!("Data store:");
            println!("  Backend: {}", store.backend());
            println!("  Content: {}", source);
            println!("  Timeout: {}s", config.request_timeout_secs);
            println!();
            println!("Cache:");
            match cache {
                Some((dir, stats)) => {
                    println!("  Location: {}", dir.display());
                    println!("  Files:    {}", stats.files);
                    println!("  Size:     {}", stats.total_size_human());
                }
                None => println!("  disabled"),
            }
            println!();
            println!("Contents:");
            println!("  English chapters: {}", stats.english_chapters);
            println!("  Urdu chapters:    {}", stats.urdu_chapters);
            println!(
                "  Testimonials:     {} approved, {} pending",
                stats.approved_testimonials, stats.pending_testimonials
            );
            println!("  Bookmarks:        {}", stats.bookmarks);
            println!("  Notes:            {}", stats.notes);
        }
    }

    Ok(())
}

/// Delete the cached collections
///
/// In local mode the cache is the only copy of the reader's data, so a
/// confirmation is asked for first.
pub fn clear_cache(store: &ContentStore, config: &Config, output: &Output) -> Result<()> {
    let Some(cache) = store.cache() else {
        bail!("The cache is disabled (cache_enabled = false)");
    };

    if !config.is_remote() && output.should_prompt() {
        println!("Local mode keeps all bookmarks, notes and edits in the cache.");
        if !confirm("Clear it anyway?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    cache.clear().context("Failed to clear cache")?;
    output.success(&format!("Cleared cache at {}", cache.dir().display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sahifa_core::{LocalCache, MemoryBackend};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clear_cache_removes_files() {
        let temp_dir = TempDir::new().unwrap();
        let cache = LocalCache::new(temp_dir.path());
        let mut store = ContentStore::new(Arc::new(MemoryBackend::with_sample_content()))
            .with_cache(cache.clone());
        store.refresh().await.unwrap();
        assert_eq!(cache.stats().files, 4);

        let config = Config {
            remote_url: Some("https://example.co".to_string()),
            ..Config::default()
        };
        clear_cache(&store, &config, &Output::new(OutputFormat::Quiet)).unwrap();

        assert_eq!(cache.stats().files, 0);
    }

    #[test]
    fn test_clear_cache_when_disabled() {
        let store = ContentStore::new(Arc::new(MemoryBackend::new()));
        let output = Output::new(OutputFormat::Quiet);
        assert!(clear_cache(&store, &Config::default(), &output).is_err());
    }
}
