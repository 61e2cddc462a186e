//! Command handlers

use anyhow::{bail, Result};

pub mod admin;
pub mod bookmark;
pub mod chapter;
pub mod config;
pub mod home;
pub mod note;
pub mod read;
pub mod settings;
pub mod status;
pub mod testimonial;

/// Resolve a full id or unique prefix against `candidates`
///
/// An exact match wins over prefix matches. `candidates` yields
/// `(id, label)` pairs; labels are shown when the prefix is ambiguous.
pub fn resolve_id<'a, I>(kind: &str, input: &str, candidates: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let input = input.trim();
    if input.is_empty() {
        bail!("No {} id given", kind);
    }

    let mut matches = Vec::new();
    for (id, label) in candidates {
        if id == input {
            return Ok(id.to_string());
        }
        if id.starts_with(input) {
            matches.push((id, label));
        }
    }

    match matches.len() {
        0 => bail!("No {} found matching: {}", kind, input),
        1 => Ok(matches[0].0.to_string()),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, input);
            for (id, label) in &matches {
                eprintln!("  {} - {}", id, label);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<(&'static str, String)> {
        vec![
            ("1", "Introduction".to_string()),
            ("12", "Fasting".to_string()),
            ("a3f9c2", "Sacred Trust".to_string()),
            ("a3b001", "Consent".to_string()),
        ]
    }

    #[test]
    fn test_exact_match_wins() {
        assert_eq!(resolve_id("chapter", "1", candidates()).unwrap(), "1");
    }

    #[test]
    fn test_unique_prefix() {
        assert_eq!(resolve_id("chapter", "a3f", candidates()).unwrap(), "a3f9c2");
    }

    #[test]
    fn test_ambiguous_prefix() {
        let err = resolve_id("chapter", "a3", candidates()).unwrap_err();
        assert!(err.to_string().contains("Ambiguous"));
    }

    #[test]
    fn test_no_match() {
        assert!(resolve_id("note", "zz", candidates()).is_err());
        assert!(resolve_id("note", "  ", candidates()).is_err());
    }
}
