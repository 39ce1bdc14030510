//! Analysis result structures and report rendering
//!
//! The AI reply is camelCase JSON; every field defaults when absent so a
//! partial model reply still produces a usable record.

use crate::page::PageContent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Score for one scoring category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryScore {
    pub score: f64,
    /// Criterion ids that passed
    pub passed: Vec<String>,
    /// Criterion ids that failed
    pub failed: Vec<String>,
}

/// The four scoring categories (25 / 25 / 30 / 20 point maxima)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scores {
    pub on_page: CategoryScore,
    pub keywords: CategoryScore,
    pub technical: CategoryScore,
    pub ux_mobile: CategoryScore,
}

/// A keyword found on the page with its usage density
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordStat {
    pub word: String,
    pub count: u32,
    pub density: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentQuality {
    pub readability_score: f64,
    pub uniqueness_score: f64,
    pub depth_score: f64,
}

/// Model-estimated Core Web Vitals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalEstimates {
    pub fcp: String,
    pub lcp: String,
    pub cls: String,
    pub tti: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    Warning,
    #[default]
    Opportunity,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Critical => write!(f, "critical"),
            Priority::Warning => write!(f, "warning"),
            Priority::Opportunity => write!(f, "opportunity"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    pub impact: String,
}

/// A drop-in rewrite for one content section, proposed by the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionReplacement {
    pub section_type: String,
    pub original: String,
    pub optimized: String,
    pub reasoning: String,
}

/// Complete SEO analysis as returned by the AI service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiAnalysis {
    pub overall_score: f64,
    pub confidence: f64,
    pub scores: Scores,
    pub primary_keywords: Vec<KeywordStat>,
    pub suggested_keywords: Vec<String>,
    pub content_quality: ContentQuality,
    pub technical_estimates: TechnicalEstimates,
    pub summary: String,
    pub keyword_analysis: String,
    pub recommendations: Vec<Recommendation>,
    pub optimized_title: String,
    pub optimized_meta_description: String,
    pub content_improvements: Vec<String>,
    pub industry_comparison: String,
    pub section_replacements: Vec<SectionReplacement>,
}

/// Kind of rewritable content section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Title,
    Meta,
    H1,
    H2,
    H3,
    Paragraph,
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Title => write!(f, "title"),
            SectionKind::Meta => write!(f, "meta"),
            SectionKind::H1 => write!(f, "h1"),
            SectionKind::H2 => write!(f, "h2"),
            SectionKind::H3 => write!(f, "h3"),
            SectionKind::Paragraph => write!(f, "paragraph"),
        }
    }
}

/// A content section the user can ask the AI to rewrite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSection {
    pub kind: SectionKind,
    pub content: String,
    /// Zero-based position within its kind, when there can be several
    pub index: Option<usize>,
    pub label: String,
}

/// Full analysis output: extracted page plus AI scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(flatten)]
    pub page: PageContent,
    pub ai_analysis: AiAnalysis,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default)]
    pub keyword_suggestions: Vec<String>,
}

impl AnalysisRecord {
    /// Derive the rewritable section list: title, meta description, then
    /// every h1/h2/h3 and paragraph with 1-based labels
    pub fn sections(&self) -> Vec<ContentSection> {
        let mut sections = Vec::new();

        if !self.page.title.is_empty() {
            sections.push(ContentSection {
                kind: SectionKind::Title,
                content: self.page.title.clone(),
                index: None,
                label: "Page Title".to_string(),
            });
        }

        if !self.page.meta_description.is_empty() {
            sections.push(ContentSection {
                kind: SectionKind::Meta,
                content: self.page.meta_description.clone(),
                index: None,
                label: "Meta Description".to_string(),
            });
        }

        for (kind, headings) in [
            (SectionKind::H1, &self.page.headings.h1),
            (SectionKind::H2, &self.page.headings.h2),
            (SectionKind::H3, &self.page.headings.h3),
        ] {
            for (i, heading) in headings.iter().enumerate() {
                sections.push(ContentSection {
                    kind,
                    content: heading.clone(),
                    index: Some(i),
                    label: format!("{} Heading {}", kind.to_string().to_uppercase(), i + 1),
                });
            }
        }

        for (i, paragraph) in self.page.paragraphs.iter().enumerate() {
            sections.push(ContentSection {
                kind: SectionKind::Paragraph,
                content: paragraph.clone(),
                index: Some(i),
                label: format!("Paragraph {}", i + 1),
            });
        }

        sections
    }

    /// Render the analysis as a markdown report
    pub fn to_markdown(&self) -> String {
        let ai = &self.ai_analysis;
        let mut md = String::new();

        md.push_str(&format!("# SEO Analysis: {}\n\n", self.page.url));
        md.push_str(&format!(
            "Analyzed: {}\n\n",
            self.analyzed_at.format("%Y-%m-%d %H:%M UTC")
        ));

        md.push_str(&format!(
            "## Overall Score: {:.0}/100 (confidence {:.0}%)\n\n",
            ai.overall_score, ai.confidence
        ));

        md.push_str("| Category | Score | Max |\n");
        md.push_str("|----------|-------|-----|\n");
        md.push_str(&format!("| On-Page SEO | {:.0} | 25 |\n", ai.scores.on_page.score));
        md.push_str(&format!(
            "| Keywords & Content | {:.0} | 25 |\n",
            ai.scores.keywords.score
        ));
        md.push_str(&format!(
            "| Technical SEO | {:.0} | 30 |\n",
            ai.scores.technical.score
        ));
        md.push_str(&format!(
            "| UX & Mobile | {:.0} | 20 |\n\n",
            ai.scores.ux_mobile.score
        ));

        if !ai.summary.is_empty() {
            md.push_str("## Summary\n\n");
            md.push_str(&format!("{}\n\n", ai.summary));
        }

        if !ai.primary_keywords.is_empty() {
            md.push_str("## Primary Keywords\n\n");
            md.push_str("| Keyword | Count | Density |\n");
            md.push_str("|---------|-------|---------|\n");
            for kw in &ai.primary_keywords {
                md.push_str(&format!("| {} | {} | {} |\n", kw.word, kw.count, kw.density));
            }
            md.push('\n');
        }

        if !ai.suggested_keywords.is_empty() {
            md.push_str("## Suggested Keywords\n\n");
            for kw in &ai.suggested_keywords {
                md.push_str(&format!("- {kw}\n"));
            }
            md.push('\n');
        }

        if !self.keyword_suggestions.is_empty() {
            md.push_str("## Keyword Research Data\n\n");
            for kw in &self.keyword_suggestions {
                md.push_str(&format!("- {kw}\n"));
            }
            md.push('\n');
        }

        if !ai.keyword_analysis.is_empty() {
            md.push_str("## Keyword Analysis\n\n");
            md.push_str(&format!("{}\n\n", ai.keyword_analysis));
        }

        md.push_str("## Content Quality\n\n");
        md.push_str(&format!(
            "- Readability: {:.0}/100\n- Uniqueness: {:.0}/100\n- Depth: {:.0}/100\n\n",
            ai.content_quality.readability_score,
            ai.content_quality.uniqueness_score,
            ai.content_quality.depth_score
        ));

        md.push_str("## Estimated Core Web Vitals\n\n");
        md.push_str(&format!(
            "| FCP | LCP | CLS | TTI |\n|-----|-----|-----|-----|\n| {} | {} | {} | {} |\n\n",
            ai.technical_estimates.fcp,
            ai.technical_estimates.lcp,
            ai.technical_estimates.cls,
            ai.technical_estimates.tti
        ));

        if !ai.recommendations.is_empty() {
            md.push_str("## Recommendations\n\n");
            for rec in &ai.recommendations {
                md.push_str(&format!("### [{}] {}\n\n", rec.priority, rec.title));
                md.push_str(&format!("{}\n\n", rec.description));
                md.push_str(&format!("**Fix**: {}\n\n", rec.suggestion));
                md.push_str(&format!("**Impact**: {}\n\n", rec.impact));
            }
        }

        if !ai.optimized_title.is_empty() {
            md.push_str("## Optimized Title\n\n");
            md.push_str(&format!("{}\n\n", ai.optimized_title));
        }

        if !ai.optimized_meta_description.is_empty() {
            md.push_str("## Optimized Meta Description\n\n");
            md.push_str(&format!("{}\n\n", ai.optimized_meta_description));
        }

        if !ai.content_improvements.is_empty() {
            md.push_str("## Content Improvements\n\n");
            for improvement in &ai.content_improvements {
                md.push_str(&format!("- {improvement}\n"));
            }
            md.push('\n');
        }

        if !ai.industry_comparison.is_empty() {
            md.push_str("## Industry Comparison\n\n");
            md.push_str(&format!("{}\n\n", ai.industry_comparison));
        }

        if !ai.section_replacements.is_empty() {
            md.push_str("## Suggested Section Replacements\n\n");
            for rep in &ai.section_replacements {
                md.push_str(&format!("### {}\n\n", rep.section_type));
                md.push_str(&format!("Original: {}\n\n", rep.original));
                md.push_str(&format!("Optimized: {}\n\n", rep.optimized));
                md.push_str(&format!("Why: {}\n\n", rep.reasoning));
            }
        }

        md
    }
}
