//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use sahifa_core::{
    BookmarkEntry, Chapter, DashboardStats, Note, NoteEntry, Settings, Testimonial,
};

use crate::images;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to encode output: {}", e),
        }
    }

    /// Print a list of chapters
    pub fn print_chapters(&self, chapters: &[&Chapter]) {
        match self.format {
            OutputFormat::Human => {
                if chapters.is_empty() {
                    println!("No chapters found.");
                    return;
                }
                for chapter in chapters {
                    let images = if chapter.has_images() {
                        format!(" [{} img]", chapter.images.len())
                    } else {
                        String::new()
                    };
                    println!(
                        "{} | {:<7} | {:>3} | {}{}",
                        short_id(&chapter.id),
                        chapter.language,
                        chapter.order,
                        truncate(&chapter.title, 50),
                        images
                    );
                }
                println!("\n{} chapter(s)", chapters.len());
            }
            OutputFormat::Json => self.json(chapters),
            OutputFormat::Quiet => {
                for chapter in chapters {
                    println!("{}", chapter.id);
                }
            }
        }
    }

    /// Print a chapter's metadata and full text
    pub fn print_chapter(&self, chapter: &Chapter) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", chapter.id);
                println!("Title:    {}", chapter.title);
                println!(
                    "Language: {}{}",
                    chapter.language,
                    if chapter.language.is_rtl() {
                        " (right-to-left)"
                    } else {
                        ""
                    }
                );
                println!("Order:    {}", chapter.order);
                for (i, url) in chapter.images.iter().enumerate() {
                    println!("Page {:<4}  {}", i + 1, images::describe(url));
                }
                if !chapter.content.is_empty() {
                    println!();
                    println!("{}", chapter.content);
                }
            }
            OutputFormat::Json => self.json(chapter),
            OutputFormat::Quiet => println!("{}", chapter.id),
        }
    }

    /// Print bookmarks with the chapters they point at
    pub fn print_bookmarks(&self, entries: &[BookmarkEntry<'_>]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No bookmarks yet.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{} | {} | {} ({})",
                        short_id(&entry.bookmark.id),
                        entry.bookmark.created_at.format("%Y-%m-%d"),
                        truncate(&entry.chapter.title, 45),
                        entry.chapter.language
                    );
                    if let Some(ref note) = entry.bookmark.note {
                        println!("         {}", truncate_line(note, 60));
                    }
                }
                println!("\n{} bookmark(s)", entries.len());
            }
            OutputFormat::Json => self.json(entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.bookmark.id);
                }
            }
        }
    }

    /// Print notes with the chapters they annotate
    pub fn print_notes(&self, entries: &[NoteEntry<'_>]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No notes yet.");
                    return;
                }
                for entry in entries {
                    println!("────────────────────────────────────────");
                    println!(
                        "ID: {}  Chapter: {}  Created: {}",
                        short_id(&entry.note.id),
                        truncate(&entry.chapter.title, 30),
                        entry.note.created_at.format("%Y-%m-%d %H:%M")
                    );
                    println!();
                    println!("{}", entry.note.text);
                    println!();
                }
                println!("{} note(s)", entries.len());
            }
            OutputFormat::Json => self.json(entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.note.id);
                }
            }
        }
    }

    /// Print a single note
    pub fn print_note(&self, note: &Note) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", note.id);
                println!("Chapter: {}", note.chapter_id);
                println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
                println!();
                println!("{}", note.text);
            }
            OutputFormat::Json => self.json(note),
            OutputFormat::Quiet => println!("{}", note.id),
        }
    }

    /// Print testimonials
    pub fn print_testimonials(&self, testimonials: &[&Testimonial]) {
        match self.format {
            OutputFormat::Human => {
                if testimonials.is_empty() {
                    println!("No testimonials found.");
                    return;
                }
                for t in testimonials {
                    println!(
                        "{} | {} | {} | {}{}",
                        short_id(&t.id),
                        stars(t.rating),
                        t.created_at.format("%Y-%m-%d"),
                        t.name,
                        if t.approved { "" } else { " (pending)" }
                    );
                    println!("         \"{}\"", truncate_line(&t.text, 70));
                }
                println!("\n{} testimonial(s)", testimonials.len());
            }
            OutputFormat::Json => self.json(testimonials),
            OutputFormat::Quiet => {
                for t in testimonials {
                    println!("{}", t.id);
                }
            }
        }
    }

    pub fn print_dashboard(&self, stats: &DashboardStats) {
        match self.format {
            OutputFormat::Human => {
                println!("Dashboard");
                println!("=========");
                println!();
                println!("Chapters:");
                println!("  English: {}", stats.english_chapters);
                println!("  Urdu:    {}", stats.urdu_chapters);
                println!();
                println!("Testimonials:");
                println!("  Pending:  {}", stats.pending_testimonials);
                println!("  Approved: {}", stats.approved_testimonials);
                println!();
                println!("Readers:");
                println!("  Bookmarks: {}", stats.bookmarks);
                println!("  Notes:     {}", stats.notes);
            }
            OutputFormat::Json => self.json(stats),
            OutputFormat::Quiet => {
                println!(
                    "{} {}",
                    stats.english_chapters + stats.urdu_chapters,
                    stats.pending_testimonials
                );
            }
        }
    }

    pub fn print_settings(&self, settings: &Settings) {
        match self.format {
            OutputFormat::Human => {
                println!("Reader settings:");
                println!("  font_size:  {}px", settings.font_size());
                println!("  brightness: {}%", settings.brightness());
                println!(
                    "  theme:      {}",
                    if settings.dark_mode() { "dark" } else { "light" }
                );
            }
            OutputFormat::Json => self.json(settings),
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

/// First eight characters of an id, for list views
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Truncate a string to max characters, adding "..." if truncated
///
/// Counts characters rather than bytes so Urdu text is never split mid-glyph.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
pub fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_urdu_by_chars() {
        let title = "جسم کی مقدس امانت";
        assert_eq!(truncate(title, 40), title);
        let cut = truncate(title, 8);
        assert_eq!(cut.chars().count(), 8);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
    }

    #[test]
    fn test_short_id_and_stars() {
        assert_eq!(short_id("0f3c9a7e-1234"), "0f3c9a7e");
        assert_eq!(short_id("3"), "3");
        assert_eq!(stars(4), "★★★★☆");
    }
}
