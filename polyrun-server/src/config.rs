//! Server configuration

use anyhow::Context;
use polyrun_common::LanguageId;
use polyrun_sandbox::ResourceLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Service configuration, loadable from a TOML file. Every field has a
/// default so a bare deployment needs no file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,

    /// Concurrent execution slots; requests beyond this queue on the slot
    /// pool rather than forking without bound.
    pub max_concurrency: usize,

    /// Languages to register at startup. Each one's interpreter must be
    /// installed or the service refuses to start.
    pub languages: Vec<String>,

    /// Host environment variables forwarded to children by name.
    pub inherit_env: Vec<String>,

    /// Best-effort network namespace isolation for children.
    pub isolate_network: bool,

    /// Resource bounds applied to every execution.
    pub limits: ResourceLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8700".to_string(),
            max_concurrency: 8,
            languages: LanguageId::all().iter().map(|l| l.to_string()).collect(),
            inherit_env: vec!["PATH".to_string()],
            isolate_network: true,
            limits: ResourceLimits::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, or defaults when `path` is
    /// `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse the configured language identifier strings.
    pub fn language_ids(&self) -> anyhow::Result<Vec<LanguageId>> {
        self.languages
            .iter()
            .map(|name| {
                name.parse::<LanguageId>()
                    .with_context(|| format!("unknown language '{name}' in config"))
            })
            .collect()
    }
}
