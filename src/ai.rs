//! AI service client over the OpenRouter chat-completions API
//!
//! Two operations: full-page SEO analysis returning a structured JSON
//! verdict, and single-section content rewriting returning plain text.

use crate::config::DEFAULT_AI_MODEL;
use crate::error::{Result, SeoscopeError};
use crate::page::PageContent;
use crate::report::{AiAnalysis, AnalysisRecord, ContentSection};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const ANALYST_SYSTEM_PROMPT: &str =
    "You are an expert SEO analyst. Always respond with valid JSON only.";

const WRITER_SYSTEM_PROMPT: &str =
    "You are an expert SEO content writer. Provide only the optimized content, no explanations.";

/// Client for the chat-completions endpoint
pub struct AiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AiClient {
    /// Create a client with the given API key and model
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| SeoscopeError::AiError(format!("Client init failed: {e}")))?;

        let model = if model.is_empty() {
            DEFAULT_AI_MODEL.to_string()
        } else {
            model.to_string()
        };

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Run the full SEO analysis over an extracted page
    pub async fn analyze(&self, page: &PageContent) -> Result<AiAnalysis> {
        info!("Requesting AI analysis for: {}", page.url);

        let prompt = build_analysis_prompt(page);
        debug!("Analysis prompt length: {} chars", prompt.len());

        let content = self
            .chat(ANALYST_SYSTEM_PROMPT, &prompt, 0.3, 4000)
            .await?;
        debug!("AI response length: {} chars", content.len());

        let json = extract_json(&content);
        serde_json::from_str(&json).map_err(|e| {
            SeoscopeError::ParseError(format!(
                "AI reply was not the expected JSON: {}. Reply: {}",
                e,
                truncate_string(&content, 500)
            ))
        })
    }

    /// Generate an optimized replacement for one content section
    pub async fn rewrite_section(
        &self,
        section: &ContentSection,
        instructions: &str,
        record: &AnalysisRecord,
    ) -> Result<String> {
        info!("Requesting rewrite for section: {}", section.label);

        let prompt = build_rewrite_prompt(section, instructions, record);
        let content = self.chat(WRITER_SYSTEM_PROMPT, &prompt, 0.7, 1000).await?;
        Ok(content.trim().to_string())
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-Title", "seoscope")
            .json(&body)
            .send()
            .await
            .map_err(|e| SeoscopeError::AiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or_else(|| format!("API error: {status}"));
            return Err(SeoscopeError::AiError(message));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| SeoscopeError::AiError(format!("Malformed completion reply: {e}")))?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SeoscopeError::AiError("Completion reply had no choices".to_string()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

fn build_analysis_prompt(page: &PageContent) -> String {
    let join_or_none = |items: &[String], limit: usize| {
        if items.is_empty() {
            "None".to_string()
        } else {
            items
                .iter()
                .take(limit)
                .cloned()
                .collect::<Vec<_>>()
                .join(" | ")
        }
    };

    format!(
        r#"You are an expert SEO analyst. Analyze the following website data and provide a comprehensive SEO score based on the predefined criteria.

## EXTRACTED PAGE DATA:
- URL: {url}
- Domain: {domain}
- HTTPS: {https}
- URL Length: {url_length} characters

### Title Tag:
"{title}"
Length: {title_len} characters

### Meta Description:
"{meta_description}"
Length: {meta_len} characters

### Headings:
- H1 tags ({h1_count}): {h1}
- H2 tags ({h2_count}): {h2}
- H3 tags ({h3_count}): {h3}

### Content:
- Word Count: {word_count}
- First 100 Words: "{first_100_words}"
- Paragraphs: {paragraph_count}

### Images:
- Total: {image_count}
- With Alt Text: {images_with_alt}

### Links:
- Internal Links: {internal_count}
- External Links: {external_count}

### Technical Elements:
- Canonical: {canonical}
- Viewport: {viewport}
- Robots Meta: {robots}
- Language: {lang}
- Open Graph Title: {has_og}
- Twitter Card: {has_twitter}
- Schema Types: {schemas}

## SCORING CRITERIA:

### On-Page SEO (25 points max)
### Keywords & Content (25 points max)
### Technical SEO (30 points max)
### UX & Mobile (20 points max)

## RESPONSE FORMAT (JSON only):
{{
    "overallScore": <number 0-100>,
    "confidence": <number 0-100>,
    "scores": {{
        "onPage": {{ "score": <0-25>, "passed": [<criterion ids>], "failed": [<criterion ids>] }},
        "keywords": {{ "score": <0-25>, "passed": [<criterion ids>], "failed": [<criterion ids>] }},
        "technical": {{ "score": <0-30>, "passed": [<criterion ids>], "failed": [<criterion ids>] }},
        "uxMobile": {{ "score": <0-20>, "passed": [<criterion ids>], "failed": [<criterion ids>] }}
    }},
    "primaryKeywords": [{{"word": "<keyword>", "count": <number>, "density": "<percent>"}}],
    "suggestedKeywords": ["<keyword1>", "<keyword2>"],
    "contentQuality": {{
        "readabilityScore": <0-100>,
        "uniquenessScore": <0-100>,
        "depthScore": <0-100>
    }},
    "technicalEstimates": {{
        "fcp": "<seconds>",
        "lcp": "<seconds>",
        "cls": "<score>",
        "tti": "<seconds>"
    }},
    "summary": "<2-3 sentence executive summary>",
    "keywordAnalysis": "<detailed paragraph about keyword usage and opportunities>",
    "recommendations": [
        {{
            "priority": "critical|warning|opportunity",
            "title": "<short title>",
            "description": "<what's the issue>",
            "suggestion": "<how to fix it>",
            "impact": "<expected improvement>"
        }}
    ],
    "optimizedTitle": "<improved title tag, 50-60 chars>",
    "optimizedMetaDescription": "<improved meta description, 150-160 chars>",
    "contentImprovements": ["<improvement1>", "<improvement2>"],
    "industryComparison": "<how this page compares to industry standards>",
    "sectionReplacements": [
        {{
            "sectionType": "h1|h2|h3|paragraph",
            "original": "<original text>",
            "optimized": "<SEO-optimized replacement>",
            "reasoning": "<why this change improves SEO>"
        }}
    ]
}}

Provide ONLY the JSON response, no additional text."#,
        url = page.url,
        domain = page.domain,
        https = page.is_https,
        url_length = page.url_length,
        title = page.title,
        title_len = page.title.chars().count(),
        meta_description = page.meta_description,
        meta_len = page.meta_description.chars().count(),
        h1_count = page.headings.h1.len(),
        h1 = join_or_none(&page.headings.h1, usize::MAX),
        h2_count = page.headings.h2.len(),
        h2 = join_or_none(&page.headings.h2, 5),
        h3_count = page.headings.h3.len(),
        h3 = join_or_none(&page.headings.h3, 3),
        word_count = page.word_count,
        first_100_words = page.first_100_words,
        paragraph_count = page.paragraphs.len(),
        image_count = page.images.len(),
        images_with_alt = page.images_with_alt(),
        internal_count = page.internal_links.len(),
        external_count = page.external_links.len(),
        canonical = or_not_set(&page.canonical),
        viewport = or_not_set(&page.viewport),
        robots = or_not_set(&page.robots),
        lang = if page.lang.is_empty() {
            "Not declared"
        } else {
            &page.lang
        },
        has_og = yes_no(!page.og_title.is_empty()),
        has_twitter = yes_no(!page.twitter_card.is_empty()),
        schemas = if page.schemas.is_empty() {
            "None detected".to_string()
        } else {
            page.schemas.join(", ")
        },
    )
}

fn build_rewrite_prompt(
    section: &ContentSection,
    instructions: &str,
    record: &AnalysisRecord,
) -> String {
    let primary_keywords = record
        .ai_analysis
        .primary_keywords
        .iter()
        .map(|k| k.word.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let suggested_keywords = record.ai_analysis.suggested_keywords.join(", ");
    let instructions = if instructions.trim().is_empty() {
        "Optimize for SEO while maintaining the same meaning and structure. Include relevant keywords naturally."
    } else {
        instructions
    };

    format!(
        r#"You are an expert SEO content writer. Generate an optimized replacement for the following content section.

## CONTEXT:
- Website: {domain}
- Page Title: {title}
- Primary Keywords: {primary_keywords}
- Suggested Keywords: {suggested_keywords}

## SECTION TO OPTIMIZE:
Type: {kind}
Label: {label}
Original Content: "{content}"

## INSTRUCTIONS:
{instructions}

## REQUIREMENTS:
1. Maintain the same general structure and format as the original
2. Naturally incorporate primary and related keywords
3. Improve readability and engagement
4. Keep similar length (for titles: 50-60 chars, for meta descriptions: 150-160 chars)
5. Make it compelling and click-worthy

Respond with ONLY the optimized text, no explanations or formatting."#,
        domain = record.page.domain,
        title = record.page.title,
        kind = section.kind,
        label = section.label,
        content = section.content,
    )
}

fn or_not_set(value: &str) -> &str {
    if value.is_empty() {
        "Not set"
    } else {
        value
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Extract JSON from a reply that may wrap it in markdown code fences
fn extract_json(response: &str) -> String {
    if let Some(start) = response.find("```json") {
        let after_marker = &response[start + 7..];
        if let Some(end) = after_marker.find("```") {
            return after_marker[..end].trim().to_string();
        }
    }

    if let Some(start) = response.find("```") {
        let after_marker = &response[start + 3..];
        let content_start = after_marker.find('\n').map(|i| i + 1).unwrap_or(0);
        let after_newline = &after_marker[content_start..];
        if let Some(end) = after_newline.find("```") {
            return after_newline[..end].trim().to_string();
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

/// Truncate a string to a maximum byte length on a char boundary
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    if end == 0 {
        "... [truncated]".to_string()
    } else {
        format!("{}... [truncated]", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HeadingStructure;
    use crate::report::SectionKind;
    use chrono::Utc;

    fn sample_page() -> PageContent {
        PageContent {
            url: "https://acme.example/widgets".into(),
            domain: "acme.example".into(),
            title: "Acme Widgets".into(),
            meta_description: "Buy the best widgets.".into(),
            headings: HeadingStructure {
                h1: vec!["Acme Widgets".into()],
                h2: (0..7).map(|i| format!("Section {i}")).collect(),
                ..Default::default()
            },
            word_count: 420,
            is_https: true,
            url_length: 28,
            ..Default::default()
        }
    }

    #[test]
    fn analysis_prompt_embeds_extracted_fields() {
        let prompt = build_analysis_prompt(&sample_page());
        assert!(prompt.contains("- URL: https://acme.example/widgets"));
        assert!(prompt.contains("- HTTPS: true"));
        assert!(prompt.contains("\"Acme Widgets\""));
        assert!(prompt.contains("- Word Count: 420"));
        assert!(prompt.contains("\"overallScore\""));
        // H2 list is capped at five entries
        assert!(prompt.contains("Section 4"));
        assert!(!prompt.contains("Section 5"));
        // Missing technical elements fall back to placeholders
        assert!(prompt.contains("- Canonical: Not set"));
        assert!(prompt.contains("- Language: Not declared"));
        assert!(prompt.contains("- Schema Types: None detected"));
    }

    #[test]
    fn rewrite_prompt_uses_default_instructions_when_blank() {
        let record = AnalysisRecord {
            page: sample_page(),
            ai_analysis: Default::default(),
            analyzed_at: Utc::now(),
            keyword_suggestions: vec![],
        };
        let section = ContentSection {
            kind: SectionKind::H1,
            content: "Acme Widgets".into(),
            index: Some(0),
            label: "H1 Heading 1".into(),
        };
        let prompt = build_rewrite_prompt(&section, "  ", &record);
        assert!(prompt.contains("Optimize for SEO while maintaining"));
        assert!(prompt.contains("Type: h1"));

        let custom = build_rewrite_prompt(&section, "Make it shorter", &record);
        assert!(custom.contains("Make it shorter"));
        assert!(!custom.contains("Optimize for SEO while maintaining"));
    }

    #[test]
    fn extract_json_handles_json_code_fence() {
        let response = "Here you go:\n```json\n{\"overallScore\": 80}\n```\nDone.";
        assert_eq!(extract_json(response), "{\"overallScore\": 80}");
    }

    #[test]
    fn extract_json_handles_generic_code_fence() {
        let response = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(response), "{\"a\": 1}");
    }

    #[test]
    fn extract_json_falls_back_to_brace_span() {
        let response = "The result is {\"a\": {\"b\": 2}} as requested.";
        assert_eq!(extract_json(response), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn extract_json_returns_input_when_no_json_found() {
        assert_eq!(extract_json("no json here"), "no json here");
    }

    #[test]
    fn truncate_string_respects_utf8_boundaries() {
        let s = "你好世界";
        let truncated = truncate_string(s, 4);
        assert!(truncated.starts_with('你'));
        assert!(truncated.contains("[truncated]"));
    }
}
