//! Content extraction: raw HTML to a normalized `PageContent` record
//!
//! The parser is lenient; malformed markup never fails extraction. The only
//! error case is an unparseable source URL.

use crate::error::{Result, SeoscopeError};
use crate::page::{HeadingStructure, ImageInfo, Link, PageContent};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Elements whose text is boilerplate rather than page content
const EXCLUDED_TAGS: [&str; 8] = [
    "script", "style", "nav", "footer", "header", "aside", "noscript", "iframe",
];

/// Maximum characters kept per heading
const HEADING_MAX_CHARS: usize = 150;

/// Maximum characters kept per link text
const LINK_TEXT_MAX_CHARS: usize = 50;

/// Minimum characters for a paragraph to count as content
const PARAGRAPH_MIN_CHARS: usize = 30;

/// Parse HTML and extract the normalized page record
pub fn extract(html: &str, url: &str) -> Result<PageContent> {
    let parsed = Url::parse(url).map_err(|_| SeoscopeError::InvalidUrl(url.to_string()))?;
    let domain = parsed.host_str().unwrap_or_default().to_string();

    let document = Html::parse_document(html);

    let title = select_text(&document, "title");
    let meta_description = select_attr(&document, "meta[name='description']", "content");
    let meta_keywords = select_attr(&document, "meta[name='keywords']", "content");

    let headings = extract_headings(&document);
    let paragraphs = extract_paragraphs(&document);
    let images = extract_images(&document);
    let (internal_links, external_links) = extract_links(&document, &domain);

    let body_text = extract_body_text(&document);
    let words: Vec<&str> = body_text.split_whitespace().collect();
    let word_count = words.len();
    let first_100_words = words.iter().take(100).copied().collect::<Vec<_>>().join(" ");

    let canonical = select_attr(&document, "link[rel='canonical']", "href");
    let viewport = select_attr(&document, "meta[name='viewport']", "content");
    let robots = select_attr(&document, "meta[name='robots']", "content");
    let og_title = select_attr(&document, "meta[property='og:title']", "content");
    let og_description = select_attr(&document, "meta[property='og:description']", "content");
    let twitter_card = select_attr(&document, "meta[name='twitter:card']", "content");
    let lang = document
        .root_element()
        .value()
        .attr("lang")
        .unwrap_or_default()
        .to_string();

    let schemas = extract_schema_types(&document);

    debug!(
        "Extracted {} words, {} headings, {} images from {}",
        word_count,
        headings.total(),
        images.len(),
        url
    );

    Ok(PageContent {
        url: url.to_string(),
        domain,
        title,
        meta_description,
        meta_keywords,
        headings,
        body_text,
        paragraphs,
        word_count,
        first_100_words,
        images,
        internal_links,
        external_links,
        canonical,
        viewport,
        robots,
        og_title,
        og_description,
        twitter_card,
        lang,
        schemas,
        is_https: url.starts_with("https"),
        url_length: url.len(),
    })
}

/// Text content of the first element matching the selector
fn select_text(document: &Html, selector: &str) -> String {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Attribute value of the first element matching the selector
fn select_attr(document: &Html, selector: &str, attr: &str) -> String {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn extract_headings(document: &Html) -> HeadingStructure {
    let mut headings = HeadingStructure::default();

    for (tag, bucket) in [
        ("h1", &mut headings.h1),
        ("h2", &mut headings.h2),
        ("h3", &mut headings.h3),
        ("h4", &mut headings.h4),
        ("h5", &mut headings.h5),
        ("h6", &mut headings.h6),
    ] {
        let selector = Selector::parse(tag).unwrap();
        for el in document.select(&selector) {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                bucket.push(truncate_chars(&text, HEADING_MAX_CHARS));
            }
        }
    }

    headings
}

fn extract_paragraphs(document: &Html) -> Vec<String> {
    let selector = Selector::parse("p").unwrap();
    document
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| text.chars().count() > PARAGRAPH_MIN_CHARS)
        .collect()
}

fn extract_images(document: &Html) -> Vec<ImageInfo> {
    let selector = Selector::parse("img").unwrap();
    document
        .select(&selector)
        .map(|img| {
            let src = img.value().attr("src").unwrap_or_default().to_string();
            let alt = img.value().attr("alt").unwrap_or_default().to_string();
            let has_alt = !alt.trim().is_empty();
            ImageInfo { src, alt, has_alt }
        })
        .collect()
}

/// Split anchors into internal and external links.
///
/// Internal = href starts with `/` or contains the page's domain.
/// External = any other absolute http(s) link. Fragments and other schemes
/// (mailto, javascript) are dropped.
fn extract_links(document: &Html, domain: &str) -> (Vec<Link>, Vec<Link>) {
    let selector = Selector::parse("a[href]").unwrap();
    let mut internal = Vec::new();
    let mut external = Vec::new();

    for a in document.select(&selector) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let text = truncate_chars(a.text().collect::<String>().trim(), LINK_TEXT_MAX_CHARS);
        let link = Link {
            href: href.to_string(),
            text,
        };

        if href.starts_with('/') || (!domain.is_empty() && href.contains(domain)) {
            internal.push(link);
        } else if href.starts_with("http") {
            external.push(link);
        }
    }

    (internal, external)
}

/// Body text with excluded subtrees skipped, whitespace-collapsed
fn extract_body_text(document: &Html) -> String {
    let selector = Selector::parse("body").unwrap();
    let mut raw = String::new();
    if let Some(body) = document.select(&selector).next() {
        collect_visible_text(body, &mut raw);
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_visible_text(el: ElementRef, out: &mut String) {
    if EXCLUDED_TAGS.contains(&el.value().name()) {
        return;
    }
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            collect_visible_text(child_el, out);
        }
    }
}

/// Schema.org @type values from JSON-LD blocks; invalid JSON is skipped
fn extract_schema_types(document: &Html) -> Vec<String> {
    let selector = Selector::parse("script[type='application/ld+json']").unwrap();
    let mut schemas = Vec::new();

    for script in document.select(&selector) {
        let json_text = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json_text) else {
            continue;
        };
        match &value["@type"] {
            serde_json::Value::String(t) => schemas.push(t.clone()),
            serde_json::Value::Array(types) => {
                schemas.extend(types.iter().filter_map(|t| t.as_str().map(String::from)));
            }
            _ => {}
        }
    }

    schemas
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
