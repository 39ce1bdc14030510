//! Vercel deployment client
//!
//! Reads a project from a zip archive, uploads it as an inline-file
//! deployment, configures project environment variables, and polls the
//! deployment until it is ready.

use crate::error::{Result, SeoscopeError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://api.vercel.com";

/// Framework preset passed to the deployment API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framework {
    #[serde(rename = "nextjs")]
    NextJs,
    #[serde(rename = "vite")]
    Vite,
    #[serde(rename = "create-react-app")]
    CreateReactApp,
    #[serde(rename = "nuxtjs")]
    NuxtJs,
    #[serde(rename = "svelte")]
    Svelte,
    #[serde(rename = "astro")]
    Astro,
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "other")]
    Other,
}

impl Framework {
    fn as_str(&self) -> &'static str {
        match self {
            Framework::NextJs => "nextjs",
            Framework::Vite => "vite",
            Framework::CreateReactApp => "create-react-app",
            Framework::NuxtJs => "nuxtjs",
            Framework::Svelte => "svelte",
            Framework::Astro => "astro",
            Framework::Static => "static",
            Framework::Other => "other",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = SeoscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nextjs" => Ok(Framework::NextJs),
            "vite" => Ok(Framework::Vite),
            "create-react-app" => Ok(Framework::CreateReactApp),
            "nuxtjs" => Ok(Framework::NuxtJs),
            "svelte" => Ok(Framework::Svelte),
            "astro" => Ok(Framework::Astro),
            "static" => Ok(Framework::Static),
            "other" => Ok(Framework::Other),
            other => Err(SeoscopeError::DeployError(format!(
                "Unknown framework: {other}"
            ))),
        }
    }
}

/// One file from the project archive
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub path: String,
    pub data: Vec<u8>,
    pub is_text: bool,
}

/// Project contents unpacked from a zip archive
#[derive(Debug, Clone, Default)]
pub struct ProjectArchive {
    pub files: Vec<ArchiveFile>,
}

impl ProjectArchive {
    /// Read every file entry out of a zip archive on disk
    pub fn from_zip_path(path: &Path) -> Result<Self> {
        info!("Reading project archive: {}", path.display());

        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let mut files = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }

            let name = match entry.enclosed_name() {
                Some(name) => name.to_string_lossy().replace('\\', "/"),
                None => continue,
            };

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;

            let is_text = std::str::from_utf8(&data).is_ok();
            files.push(ArchiveFile {
                path: name,
                data,
                is_text,
            });
        }

        if files.is_empty() {
            return Err(SeoscopeError::ArchiveError(
                "Archive contains no files".to_string(),
            ));
        }

        debug!("Archive holds {} files", files.len());
        Ok(Self { files })
    }

    fn find(&self, path: &str) -> Option<&ArchiveFile> {
        self.files.iter().find(|f| f.path == path)
    }

    fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Project name from package.json, if present and usable
    pub fn detect_project_name(&self) -> Option<String> {
        let file = self.find("package.json")?;
        let json: Value = serde_json::from_slice(&file.data).ok()?;
        let name = sanitize_project_name(json["name"].as_str()?);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Guess the framework from well-known config files
    pub fn detect_framework(&self) -> Framework {
        if self.contains("next.config.js") || self.contains("next.config.mjs") {
            Framework::NextJs
        } else if self.contains("vite.config.js") || self.contains("vite.config.ts") {
            Framework::Vite
        } else if self.contains("nuxt.config.js") || self.contains("nuxt.config.ts") {
            Framework::NuxtJs
        } else if self.contains("index.html") {
            Framework::Static
        } else {
            Framework::Other
        }
    }
}

/// Lowercase the name and strip everything outside [a-z0-9-]
pub fn sanitize_project_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' | '-' => out.push(c),
            ' ' | '_' | '.' | '/' | '@' => out.push('-'),
            _ => {}
        }
    }
    out.trim_matches('-').to_string()
}

/// Which deployment contexts an environment variable applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvTarget {
    Production,
    Preview,
    Development,
}

/// Project environment variable definition
#[derive(Debug, Clone, Serialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
    pub target: Vec<EnvTarget>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl EnvVar {
    /// Encrypted variable for production and preview
    pub fn secret(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            target: vec![EnvTarget::Production, EnvTarget::Preview],
            kind: "encrypted".to_string(),
        }
    }

    /// Plain variable for production and preview
    pub fn plain(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            target: vec![EnvTarget::Production, EnvTarget::Preview],
            kind: "plain".to_string(),
        }
    }
}

/// Deployment state after the poll loop finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Ready,
    StillBuilding,
}

/// Result of a completed deployment request
#[derive(Debug, Clone)]
pub struct Deployment {
    pub id: String,
    pub project_id: String,
    pub url: String,
    pub state: DeployState,
}

/// Polling behavior for the deployment status loop
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub poll_interval: Duration,
    pub max_poll_attempts: usize,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            max_poll_attempts: 60,
        }
    }
}

/// Client for the deployments API
pub struct DeployClient {
    client: Client,
    token: String,
    base_url: String,
    config: DeployConfig,
}

impl DeployClient {
    /// Create a client with the given API token
    pub fn new(token: &str) -> Result<Self> {
        Self::with_config(token, DeployConfig::default())
    }

    /// Create a client with custom polling behavior
    pub fn with_config(token: &str, config: DeployConfig) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(SeoscopeError::ConfigError(
                "A deployment token is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SeoscopeError::DeployError(format!("Client init failed: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            config,
        })
    }

    /// Point the client at a different API base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Upload the archive, set env vars, and poll until the deployment settles
    pub async fn deploy(
        &self,
        archive: &ProjectArchive,
        name: &str,
        framework: Framework,
        env_vars: &[EnvVar],
    ) -> Result<Deployment> {
        let name = sanitize_project_name(name);
        if name.is_empty() {
            return Err(SeoscopeError::DeployError(
                "Project name is empty after sanitization".to_string(),
            ));
        }

        info!(
            "Deploying {} files as '{}' ({})",
            archive.files.len(),
            name,
            framework
        );

        let created = self.create_deployment(archive, &name, framework).await?;
        info!("Deployment created: {}", created.id);

        if !env_vars.is_empty() {
            self.push_env_vars(&created.project_id, env_vars).await;
        }

        self.poll_until_settled(created).await
    }

    async fn create_deployment(
        &self,
        archive: &ProjectArchive,
        name: &str,
        framework: Framework,
    ) -> Result<CreatedDeployment> {
        let files: Vec<Value> = archive
            .files
            .iter()
            .map(|f| {
                json!({
                    "file": f.path,
                    "data": BASE64.encode(&f.data),
                    "encoding": "base64",
                })
            })
            .collect();

        // Static sites take no framework preset, only an output directory
        let project_settings = if framework == Framework::Static {
            json!({ "framework": null, "outputDirectory": "." })
        } else {
            json!({ "framework": framework.as_str() })
        };

        let body = json!({
            "name": name,
            "files": files,
            "projectSettings": project_settings,
            "target": "production",
        });

        let response = self
            .client
            .post(format!("{}/v13/deployments", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SeoscopeError::DeployError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or_else(|| format!("Deployment API error: {status}"));
            return Err(SeoscopeError::DeployError(message));
        }

        response
            .json()
            .await
            .map_err(|e| SeoscopeError::DeployError(format!("Malformed deployment reply: {e}")))
    }

    /// Env var failures are logged but never abort the deployment
    async fn push_env_vars(&self, project_id: &str, env_vars: &[EnvVar]) {
        for var in env_vars {
            let result = self
                .client
                .post(format!(
                    "{}/v10/projects/{}/env",
                    self.base_url, project_id
                ))
                .bearer_auth(&self.token)
                .json(var)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    debug!("Set env var: {}", var.key);
                }
                Ok(response) => {
                    warn!(
                        "Failed to set env var {} (status {})",
                        var.key,
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("Failed to set env var {}: {}", var.key, e);
                }
            }
        }
    }

    async fn poll_until_settled(&self, created: CreatedDeployment) -> Result<Deployment> {
        for attempt in 0..self.config.max_poll_attempts {
            tokio::time::sleep(self.config.poll_interval).await;

            let status: DeploymentStatus = self
                .client
                .get(format!("{}/v13/deployments/{}", self.base_url, created.id))
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| SeoscopeError::DeployError(e.to_string()))?
                .json()
                .await
                .map_err(|e| SeoscopeError::DeployError(format!("Malformed status reply: {e}")))?;

            debug!(
                "Poll {}/{}: {}",
                attempt + 1,
                self.config.max_poll_attempts,
                status.ready_state
            );

            match status.ready_state.as_str() {
                "READY" => {
                    let host = if status.url.is_empty() {
                        created.url.clone()
                    } else {
                        status.url
                    };
                    return Ok(Deployment {
                        id: created.id,
                        project_id: created.project_id,
                        url: format!("https://{host}"),
                        state: DeployState::Ready,
                    });
                }
                "ERROR" => {
                    return Err(SeoscopeError::DeploymentFailed(format!(
                        "Deployment {} failed during build",
                        created.id
                    )));
                }
                _ => {}
            }
        }

        warn!("Deployment {} still building after poll limit", created.id);
        Ok(Deployment {
            url: format!("https://{}", created.url),
            id: created.id,
            project_id: created.project_id,
            state: DeployState::StillBuilding,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CreatedDeployment {
    id: String,
    #[serde(rename = "projectId", default)]
    project_id: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentStatus {
    #[serde(rename = "readyState", default)]
    ready_state: String,
    #[serde(default)]
    url: String,
}
