//! Sample content
//!
//! Loaded into the local backend on first run when neither a remote store nor
//! a cache is available, so a fresh install has something to read.

use chrono::{TimeZone, Utc};

use crate::models::{Chapter, Language, Snapshot, Testimonial};

fn chapter(id: &str, title: &str, content: &str, language: Language, order: i32) -> Chapter {
    Chapter {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        language,
        order,
        images: Vec::new(),
    }
}

fn testimonial(
    id: &str,
    name: &str,
    text: &str,
    rating: u8,
    approved: bool,
    (y, m, d): (i32, u32, u32),
) -> Testimonial {
    Testimonial {
        id: id.to_string(),
        name: name.to_string(),
        text: text.to_string(),
        rating,
        approved,
        created_at: Utc
            .with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    }
}

/// Sample chapters in both languages plus a few testimonials
pub fn sample_snapshot() -> Snapshot {
    let mut trust = chapter(
        "2",
        "The Sacred Trust of the Body",
        "The human body is described in the Quran as an Amanah, a trust from Allah...",
        Language::English,
        2,
    );
    trust.images = vec!["https://placehold.co/800x1200.png?text=Scanned+Page".to_string()];

    Snapshot {
        chapters: vec![
            chapter(
                "1",
                "Introduction to Islamic Healthcare Philosophy",
                "In the name of Allah, the Most Gracious, the Most Merciful...",
                Language::English,
                1,
            ),
            trust,
            chapter(
                "3",
                "Spiritual Dimensions of Medical Decision-Making",
                "The intersection of spirituality and healthcare...",
                Language::English,
                3,
            ),
            chapter(
                "4",
                "اسلامی صحت کی فلسفہ کا تعارف",
                "بسم اللہ الرحمن الرحیم...",
                Language::Urdu,
                1,
            ),
            chapter(
                "5",
                "جسم کی مقدس امانت",
                "قرآن مجید میں انسانی جسم کو اللہ کی طرف سے امانت...",
                Language::Urdu,
                2,
            ),
        ],
        bookmarks: Vec::new(),
        notes: Vec::new(),
        testimonials: vec![
            testimonial(
                "3",
                "Professor Mahmoud",
                "An excellent resource that combines spiritual insight with practical guidance.",
                4,
                true,
                (2024, 2, 1),
            ),
            testimonial(
                "2",
                "Sister Fatima",
                "The wisdom shared in this book helped me make difficult healthcare decisions.",
                5,
                false,
                (2024, 1, 20),
            ),
            testimonial(
                "1",
                "Dr. Ahmed Hassan",
                "This book bridges modern medical ethics and Islamic principles.",
                5,
                true,
                (2024, 1, 15),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_covers_both_languages() {
        let snapshot = sample_snapshot();
        assert!(snapshot
            .chapters
            .iter()
            .any(|c| c.language == Language::English));
        assert!(snapshot.chapters.iter().any(|c| c.language == Language::Urdu));
    }

    #[test]
    fn test_sample_chapters_are_valid() {
        for chapter in sample_snapshot().chapters {
            assert!(chapter.to_draft().validate().is_ok(), "{}", chapter.title);
        }
    }

    #[test]
    fn test_sample_testimonials_newest_first() {
        let testimonials = sample_snapshot().testimonials;
        assert!(testimonials
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
        assert!(testimonials.iter().any(|t| !t.approved));
    }
}
