//! seoscope - AI-powered SEO analysis pipeline
//!
//! Fetches a webpage (directly or through fallback proxies), extracts the
//! on-page signals that matter for SEO, and asks an LLM for a structured
//! scoring report with recommendations. Optional extras: keyword research
//! through DataForSEO and one-command Vercel deployment of a project
//! archive.

pub mod ai;
pub mod config;
pub mod deploy;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod keywords;
pub mod page;
pub mod report;

pub use ai::AiClient;
pub use config::{Settings, DEFAULT_AI_MODEL};
pub use deploy::{DeployClient, Deployment, Framework, ProjectArchive};
pub use error::{Result, SeoscopeError};
pub use fetcher::{FetcherConfig, PageFetcher};
pub use keywords::KeywordClient;
pub use page::PageContent;
pub use report::{AiAnalysis, AnalysisRecord, ContentSection};

use chrono::Utc;
use tracing::{info, warn};

/// Progress stages reported while an analysis runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    ExtractDone,
    Keywords,
    Analyze,
    Score,
    Recommend,
    Complete,
}

impl Stage {
    /// Approximate completion percentage for this stage
    pub fn percent(&self) -> u8 {
        match self {
            Stage::Extract => 15,
            Stage::ExtractDone => 30,
            Stage::Keywords => 40,
            Stage::Analyze => 50,
            Stage::Score => 75,
            Stage::Recommend => 90,
            Stage::Complete => 100,
        }
    }

    /// Human-readable progress message
    pub fn message(&self) -> &'static str {
        match self {
            Stage::Extract => "Fetching webpage...",
            Stage::ExtractDone => "Extracting page content...",
            Stage::Keywords => "Researching keywords...",
            Stage::Analyze => "AI is analyzing SEO factors...",
            Stage::Score => "Calculating scores...",
            Stage::Recommend => "Generating recommendations...",
            Stage::Complete => "Analysis complete",
        }
    }
}

/// Run the full analysis pipeline with clients built from settings
pub async fn analyze_url(
    url: &str,
    settings: &Settings,
    on_stage: impl FnMut(Stage),
) -> Result<AnalysisRecord> {
    if settings.openrouter_key.is_empty() {
        return Err(SeoscopeError::ConfigError(
            "OPENROUTER_API_KEY is not configured".to_string(),
        ));
    }

    let fetcher = PageFetcher::new()?;
    let ai = AiClient::new(&settings.openrouter_key, &settings.ai_model)?;
    let keywords = if settings.has_keyword_credentials() {
        Some(KeywordClient::new(
            &settings.dataforseo_login,
            &settings.dataforseo_password,
        )?)
    } else {
        None
    };

    analyze_url_with(url, &fetcher, &ai, keywords.as_ref(), on_stage).await
}

/// Pipeline body with caller-supplied clients
pub async fn analyze_url_with(
    url: &str,
    fetcher: &PageFetcher,
    ai: &AiClient,
    keywords: Option<&KeywordClient>,
    mut on_stage: impl FnMut(Stage),
) -> Result<AnalysisRecord> {
    let url = normalize_url(url)?;
    info!("Starting analysis for: {}", url);

    on_stage(Stage::Extract);
    let html = match fetcher.fetch(&url).await {
        Ok(html) => html,
        Err(e) => {
            // Analysis still runs over whatever we could not fetch; the AI
            // report then reflects an empty page rather than aborting.
            warn!("Fetch failed, analyzing empty document: {}", e);
            String::new()
        }
    };

    on_stage(Stage::ExtractDone);
    let page = extractor::extract(&html, &url)?;
    info!(
        "Extracted {} words, {} headings, {} images",
        page.word_count,
        page.headings.total(),
        page.images.len()
    );

    let keyword_suggestions = match keywords {
        Some(client) => {
            on_stage(Stage::Keywords);
            let seed = if page.title.is_empty() {
                page.domain.clone()
            } else {
                page.title.clone()
            };
            match client.suggestions(&seed).await {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    warn!("Keyword research failed, continuing without it: {}", e);
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    on_stage(Stage::Analyze);
    let ai_analysis = ai.analyze(&page).await?;
    on_stage(Stage::Score);
    on_stage(Stage::Recommend);

    let record = AnalysisRecord {
        page,
        ai_analysis,
        analyzed_at: Utc::now(),
        keyword_suggestions,
    };

    on_stage(Stage::Complete);
    info!(
        "Analysis complete: score {}/100",
        record.ai_analysis.overall_score
    );
    Ok(record)
}

/// Prepend https:// when no scheme is given, then validate
fn normalize_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SeoscopeError::InvalidUrl("URL is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = url::Url::parse(&candidate)?;
    match parsed.scheme() {
        "http" | "https" => Ok(candidate),
        scheme => Err(SeoscopeError::InvalidUrl(format!(
            "Unsupported URL scheme: {scheme}"
        ))),
    }
}
