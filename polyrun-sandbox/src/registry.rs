//! Adapter registry with fail-fast interpreter validation

use crate::adapter::RuntimeAdapter;
use crate::adapters::{JavaAdapter, JavaScriptAdapter, PythonAdapter};
use polyrun_common::{LanguageId, Result, SandboxError};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Language -> adapter table, fixed at startup and read-only afterwards,
/// safely shared across all concurrent requests.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<LanguageId, Arc<dyn RuntimeAdapter>>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn RuntimeAdapter>) {
        self.adapters.insert(adapter.language(), adapter);
    }

    pub fn get(&self, language: LanguageId) -> Option<Arc<dyn RuntimeAdapter>> {
        self.adapters.get(&language).cloned()
    }

    /// Registered language identifiers, in stable order.
    pub fn languages(&self) -> Vec<LanguageId> {
        let mut languages: Vec<_> = self.adapters.keys().copied().collect();
        languages.sort_by_key(|l| l.as_str());
        languages
    }

    /// Build a registry for the given languages and validate every
    /// interpreter is installed. Fails fast: a registered adapter with a
    /// missing interpreter is a startup error, never a first-request error.
    pub async fn with_languages(languages: &[LanguageId]) -> Result<Self> {
        let mut registry = Self::empty();
        for language in languages {
            match language {
                LanguageId::Python => registry.register(Arc::new(PythonAdapter::default())),
                LanguageId::JavaScript => registry.register(Arc::new(JavaScriptAdapter::default())),
                LanguageId::Java => registry.register(Arc::new(JavaAdapter::default())),
            }
        }
        registry.validate().await?;
        Ok(registry)
    }

    /// Default registry: every language the data model knows about.
    pub async fn with_defaults() -> Result<Self> {
        Self::with_languages(LanguageId::all()).await
    }

    /// Probe every registered interpreter.
    pub async fn validate(&self) -> Result<()> {
        for adapter in self.adapters.values() {
            probe_interpreter(adapter.as_ref()).await?;
            tracing::debug!(
                language = %adapter.language(),
                interpreter = adapter.interpreter(),
                "validated runtime adapter"
            );
        }
        Ok(())
    }
}

/// Run `<interpreter> --version` under a short deadline. Any completed
/// invocation proves the binary exists; only a failure to spawn (or a hang)
/// marks the interpreter missing.
async fn probe_interpreter(adapter: &dyn RuntimeAdapter) -> Result<()> {
    let missing = || SandboxError::InterpreterMissing {
        language: adapter.language().to_string(),
        program: adapter.interpreter().to_string(),
    };

    let mut cmd = Command::new(adapter.interpreter());
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(PROBE_TIMEOUT, cmd.status()).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(_)) | Err(_) => Err(missing()),
    }
}
