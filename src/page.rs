//! Extracted page data structures
//!
//! `PageContent` is the normalized record the rest of the pipeline works
//! from: every field defaults to its empty value when the page does not
//! provide it.

use serde::{Deserialize, Serialize};

/// Heading text grouped by level (h1 through h6)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadingStructure {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl HeadingStructure {
    /// Total number of headings across all levels
    pub fn total(&self) -> usize {
        self.h1.len()
            + self.h2.len()
            + self.h3.len()
            + self.h4.len()
            + self.h5.len()
            + self.h6.len()
    }
}

/// An image reference and whether it carries alt text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    /// True when the alt attribute is present and non-blank
    pub has_alt: bool,
}

/// An anchor on the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    /// Link text, capped at 50 characters
    pub text: String,
}

/// Normalized content and metadata extracted from a single page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContent {
    /// Source URL as given
    pub url: String,
    /// Host of the source URL
    pub domain: String,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub headings: HeadingStructure,
    /// Body text with boilerplate subtrees removed, whitespace-collapsed
    pub body_text: String,
    /// Paragraph texts longer than 30 characters
    pub paragraphs: Vec<String>,
    pub word_count: usize,
    pub first_100_words: String,
    pub images: Vec<ImageInfo>,
    pub internal_links: Vec<Link>,
    pub external_links: Vec<Link>,
    pub canonical: String,
    pub viewport: String,
    pub robots: String,
    pub og_title: String,
    pub og_description: String,
    pub twitter_card: String,
    /// Value of the html element's lang attribute
    pub lang: String,
    /// Schema.org @type values found in JSON-LD script blocks
    pub schemas: Vec<String>,
    pub is_https: bool,
    pub url_length: usize,
}

impl PageContent {
    /// Number of images that carry alt text
    pub fn images_with_alt(&self) -> usize {
        self.images.iter().filter(|i| i.has_alt).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_total_sums_all_levels() {
        let headings = HeadingStructure {
            h1: vec!["a".into()],
            h2: vec!["b".into(), "c".into()],
            h6: vec!["d".into()],
            ..Default::default()
        };
        assert_eq!(headings.total(), 4);
    }

    #[test]
    fn images_with_alt_counts_only_flagged_images() {
        let page = PageContent {
            images: vec![
                ImageInfo {
                    src: "a.png".into(),
                    alt: "logo".into(),
                    has_alt: true,
                },
                ImageInfo {
                    src: "b.png".into(),
                    alt: String::new(),
                    has_alt: false,
                },
            ],
            ..Default::default()
        };
        assert_eq!(page.images_with_alt(), 1);
    }
}
