//! JavaScript (Node.js) adapter

use crate::adapter::{Invocation, RuntimeAdapter};
use crate::limits::ResourceLimits;
use async_trait::async_trait;
use polyrun_common::LanguageId;
use std::path::Path;

const SCRIPT_NAME: &str = "main.js";

#[derive(Debug, Clone)]
pub struct JavaScriptAdapter {
    interpreter: String,
}

impl JavaScriptAdapter {
    pub fn new() -> Self {
        Self {
            interpreter: "node".to_string(),
        }
    }

    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Default for JavaScriptAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeAdapter for JavaScriptAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::JavaScript
    }

    fn interpreter(&self) -> &str {
        &self.interpreter
    }

    async fn stage(&self, source: &str, scratch: &Path) -> std::io::Result<()> {
        tokio::fs::write(scratch.join(SCRIPT_NAME), source).await
    }

    fn run(&self, scratch: &Path) -> Invocation {
        Invocation::new(&self.interpreter, scratch)
            .arg(SCRIPT_NAME)
            .env("NODE_OPTIONS", "--max-old-space-size=128")
    }

    fn run_limits(&self, base: &ResourceLimits) -> ResourceLimits {
        let mut limits = base.clone();
        // V8 reserves multi-GiB virtual ranges at startup; an address-space
        // rlimit kills node before user code runs. The heap is bounded via
        // NODE_OPTIONS instead.
        limits.max_memory_bytes = None;
        limits
    }
}
