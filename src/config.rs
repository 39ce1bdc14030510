//! API settings
//!
//! Settings come from the environment (loaded through dotenvy by the CLI)
//! and can be overlaid by a JSON settings file, which takes precedence the
//! way the original browser build preferred stored settings over build-time
//! environment defaults.

use crate::error::{Result, SeoscopeError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default chat model when none is configured
pub const DEFAULT_AI_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Credentials and model selection for the external services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub openrouter_key: String,
    pub dataforseo_login: String,
    pub dataforseo_password: String,
    pub ai_model: String,
    pub vercel_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openrouter_key: String::new(),
            dataforseo_login: String::new(),
            dataforseo_password: String::new(),
            ai_model: DEFAULT_AI_MODEL.to_string(),
            vercel_token: String::new(),
        }
    }
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_default()
        };

        let ai_model = {
            let model = get("AI_MODEL");
            if model.is_empty() {
                DEFAULT_AI_MODEL.to_string()
            } else {
                model
            }
        };

        Self {
            openrouter_key: get("OPENROUTER_API_KEY"),
            dataforseo_login: get("DATAFORSEO_LOGIN"),
            dataforseo_password: get("DATAFORSEO_PASSWORD"),
            ai_model,
            vercel_token: get("VERCEL_TOKEN"),
        }
    }

    /// Environment settings overlaid with values from a JSON settings file
    pub fn load(path: &Path) -> Result<Self> {
        let base = Self::from_env();
        if !path.exists() {
            return Ok(base);
        }

        info!("Loading settings from: {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let file: Settings = serde_json::from_str(&raw)
            .map_err(|e| SeoscopeError::ConfigError(format!("Invalid settings file: {e}")))?;

        Ok(base.overlay(file))
    }

    /// Persist settings as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Settings saved to: {}", path.display());
        Ok(())
    }

    /// Replace each field with the other settings' value when it is set
    pub fn overlay(mut self, other: Settings) -> Settings {
        if !other.openrouter_key.is_empty() {
            self.openrouter_key = other.openrouter_key;
        }
        if !other.dataforseo_login.is_empty() {
            self.dataforseo_login = other.dataforseo_login;
        }
        if !other.dataforseo_password.is_empty() {
            self.dataforseo_password = other.dataforseo_password;
        }
        if !other.ai_model.is_empty() && other.ai_model != DEFAULT_AI_MODEL {
            self.ai_model = other.ai_model;
        }
        if !other.vercel_token.is_empty() {
            self.vercel_token = other.vercel_token;
        }
        self
    }

    /// Both DataForSEO credentials are present
    pub fn has_keyword_credentials(&self) -> bool {
        !self.dataforseo_login.is_empty() && !self.dataforseo_password.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_trims_and_skips_blank_values() {
        let settings = Settings::from_lookup(|key| match key {
            "OPENROUTER_API_KEY" => Some("  sk-or-123  ".to_string()),
            "DATAFORSEO_LOGIN" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(settings.openrouter_key, "sk-or-123");
        assert!(settings.dataforseo_login.is_empty());
        assert_eq!(settings.ai_model, DEFAULT_AI_MODEL);
    }

    #[test]
    fn overlay_prefers_non_empty_file_values() {
        let env = Settings {
            openrouter_key: "env-key".into(),
            vercel_token: "env-token".into(),
            ..Default::default()
        };
        let file = Settings {
            openrouter_key: "file-key".into(),
            ai_model: "openai/gpt-4o".into(),
            ..Default::default()
        };
        let merged = env.overlay(file);
        assert_eq!(merged.openrouter_key, "file-key");
        assert_eq!(merged.ai_model, "openai/gpt-4o");
        // Empty file value keeps the environment value
        assert_eq!(merged.vercel_token, "env-token");
    }

    #[test]
    fn keyword_credentials_require_both_halves() {
        let mut settings = Settings::default();
        assert!(!settings.has_keyword_credentials());
        settings.dataforseo_login = "login".into();
        assert!(!settings.has_keyword_credentials());
        settings.dataforseo_password = "pass".into();
        assert!(settings.has_keyword_credentials());
    }

    #[test]
    fn settings_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            openrouter_key: "sk-or-abc".into(),
            ..Default::default()
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.openrouter_key, "sk-or-abc");
    }
}
