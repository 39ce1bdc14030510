//! seoscope command line interface

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use seoscope::deploy::{DeployClient, DeployState, EnvVar, Framework, ProjectArchive};
use seoscope::{analyze_url, AiClient, KeywordClient, Settings, Stage};
use std::path::PathBuf;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "seoscope")]
#[command(about = "AI-powered SEO analysis from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSON settings file overriding environment variables
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and run the full AI-backed SEO analysis
    Analyze {
        /// URL of the page to analyze
        #[arg(short, long)]
        url: String,

        /// Print the raw analysis record as JSON
        #[arg(long)]
        json: bool,

        /// Write the analysis record to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch a page and print the extracted signals without AI analysis
    Extract {
        /// URL of the page to extract
        #[arg(short, long)]
        url: String,

        /// Print extracted content as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up keyword suggestions and search volumes
    Keywords {
        /// Seed keyword
        #[arg(short, long)]
        keyword: String,

        /// Also fetch search volume data
        #[arg(long)]
        volume: bool,
    },

    /// Rewrite one content section from a saved analysis record
    Rewrite {
        /// Path to an analysis record saved by `analyze --output`
        #[arg(short, long)]
        input: PathBuf,

        /// Section number to rewrite (see --list)
        #[arg(short, long)]
        section: Option<usize>,

        /// Extra instructions for the rewrite
        #[arg(long, default_value = "")]
        instructions: String,

        /// List the rewritable sections and exit
        #[arg(long)]
        list: bool,
    },

    /// Deploy a zipped project to Vercel
    Deploy {
        /// Path to the project zip archive
        #[arg(short, long)]
        archive: PathBuf,

        /// Project name (defaults to the package.json name)
        #[arg(short, long)]
        name: Option<String>,

        /// Framework preset (defaults to auto-detection)
        #[arg(short, long)]
        framework: Option<Framework>,

        /// Extra environment variables as KEY=VALUE (repeatable)
        #[arg(short, long)]
        env: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::from_env(),
    };

    match cli.command {
        Commands::Analyze { url, json, output } => {
            run_analyze(&url, json, output, &settings).await?;
        }
        Commands::Extract { url, json } => {
            run_extract(&url, json).await?;
        }
        Commands::Keywords { keyword, volume } => {
            run_keywords(&keyword, volume, &settings).await?;
        }
        Commands::Rewrite {
            input,
            section,
            instructions,
            list,
        } => {
            run_rewrite(&input, section, &instructions, list, &settings).await?;
        }
        Commands::Deploy {
            archive,
            name,
            framework,
            env,
        } => {
            run_deploy(&archive, name, framework, &env, &settings).await?;
        }
    }

    Ok(())
}

async fn run_analyze(
    url: &str,
    json: bool,
    output: Option<PathBuf>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let record = analyze_url(url, settings, |stage: Stage| {
        bar.set_position(stage.percent() as u64);
        bar.set_message(stage.message());
    })
    .await?;
    bar.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", record.to_markdown());
    }

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&record)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Analysis record saved to: {}", path.display());
    }

    Ok(())
}

async fn run_extract(url: &str, json: bool) -> anyhow::Result<()> {
    let fetcher = seoscope::PageFetcher::new()?;
    let normalized = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    let html = fetcher.fetch(&normalized).await?;
    let page = seoscope::extractor::extract(&html, &normalized)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!("# {}", page.url);
    println!();
    println!("Title: {}", page.title);
    println!("Meta description: {}", page.meta_description);
    println!(
        "Headings: {} (h1: {}, h2: {}, h3: {})",
        page.headings.total(),
        page.headings.h1.len(),
        page.headings.h2.len(),
        page.headings.h3.len()
    );
    println!("Word count: {}", page.word_count);
    println!(
        "Images: {} ({} with alt text)",
        page.images.len(),
        page.images_with_alt()
    );
    println!(
        "Links: {} internal, {} external",
        page.internal_links.len(),
        page.external_links.len()
    );
    if !page.schemas.is_empty() {
        println!("Schema types: {}", page.schemas.join(", "));
    }
    Ok(())
}

async fn run_keywords(keyword: &str, volume: bool, settings: &Settings) -> anyhow::Result<()> {
    if !settings.has_keyword_credentials() {
        return Err(anyhow!(
            "DATAFORSEO_LOGIN and DATAFORSEO_PASSWORD are not configured"
        ));
    }

    let client = KeywordClient::new(&settings.dataforseo_login, &settings.dataforseo_password)?;

    let suggestions = client.suggestions(keyword).await?;
    if suggestions.is_empty() {
        println!("No suggestions found for '{keyword}'");
    } else {
        println!("Suggestions for '{keyword}':");
        for suggestion in &suggestions {
            println!("  - {suggestion}");
        }
    }

    if volume {
        let volumes = client.search_volume(keyword).await?;
        for entry in volumes {
            println!(
                "{}: {} searches/month (competition: {})",
                entry.keyword, entry.search_volume, entry.competition
            );
        }
    }

    Ok(())
}

async fn run_rewrite(
    input: &PathBuf,
    section: Option<usize>,
    instructions: &str,
    list: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let record: seoscope::AnalysisRecord =
        serde_json::from_str(&raw).context("Input is not a saved analysis record")?;

    let sections = record.sections();
    if sections.is_empty() {
        return Err(anyhow!("The analysis record has no rewritable sections"));
    }

    if list {
        for (i, section) in sections.iter().enumerate() {
            let preview: String = section.content.chars().take(60).collect();
            println!("{:>3}. [{}] {}", i + 1, section.label, preview);
        }
        return Ok(());
    }

    let index = section.ok_or_else(|| anyhow!("Pass --section <N> or --list"))?;
    let target = sections
        .get(index.checked_sub(1).ok_or_else(|| anyhow!("Sections start at 1"))?)
        .ok_or_else(|| anyhow!("Section {} is out of range (1-{})", index, sections.len()))?;

    if settings.openrouter_key.is_empty() {
        return Err(anyhow!("OPENROUTER_API_KEY is not configured"));
    }
    let ai = AiClient::new(&settings.openrouter_key, &settings.ai_model)?;
    let rewritten = ai.rewrite_section(target, instructions, &record).await?;

    println!("## {}", target.label);
    println!();
    println!("Original:\n{}", target.content);
    println!();
    println!("Optimized:\n{rewritten}");
    Ok(())
}

async fn run_deploy(
    archive_path: &PathBuf,
    name: Option<String>,
    framework: Option<Framework>,
    env: &[String],
    settings: &Settings,
) -> anyhow::Result<()> {
    if settings.vercel_token.is_empty() {
        return Err(anyhow!("VERCEL_TOKEN is not configured"));
    }

    let archive = ProjectArchive::from_zip_path(archive_path)?;
    let name = name
        .or_else(|| archive.detect_project_name())
        .unwrap_or_else(|| "seoscope-site".to_string());
    let framework = framework.unwrap_or_else(|| archive.detect_framework());
    info!("Project: {} (framework: {})", name, framework);

    let mut env_vars = Vec::new();
    if !settings.openrouter_key.is_empty() {
        env_vars.push(EnvVar::secret("OPENROUTER_API_KEY", &settings.openrouter_key));
    }
    if settings.has_keyword_credentials() {
        env_vars.push(EnvVar::secret("DATAFORSEO_LOGIN", &settings.dataforseo_login));
        env_vars.push(EnvVar::secret(
            "DATAFORSEO_PASSWORD",
            &settings.dataforseo_password,
        ));
    }
    for pair in env {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid --env value '{}', expected KEY=VALUE", pair))?;
        env_vars.push(EnvVar::plain(key, value));
    }

    let client = DeployClient::new(&settings.vercel_token)?;
    let deployment = client.deploy(&archive, &name, framework, &env_vars).await?;

    match deployment.state {
        DeployState::Ready => {
            println!("Deployment ready: {}", deployment.url);
        }
        DeployState::StillBuilding => {
            warn!("Deployment is still building");
            println!(
                "Deployment {} is still building; it should come up at {}",
                deployment.id, deployment.url
            );
        }
    }

    Ok(())
}
