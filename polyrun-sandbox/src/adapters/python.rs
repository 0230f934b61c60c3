//! Python adapter

use crate::adapter::{Invocation, RuntimeAdapter};
use async_trait::async_trait;
use polyrun_common::LanguageId;
use std::path::Path;

const SCRIPT_NAME: &str = "main.py";

#[derive(Debug, Clone)]
pub struct PythonAdapter {
    interpreter: String,
}

impl PythonAdapter {
    pub fn new() -> Self {
        Self {
            interpreter: "python3".to_string(),
        }
    }

    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Default for PythonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeAdapter for PythonAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Python
    }

    fn interpreter(&self) -> &str {
        &self.interpreter
    }

    async fn stage(&self, source: &str, scratch: &Path) -> std::io::Result<()> {
        tokio::fs::write(scratch.join(SCRIPT_NAME), source).await
    }

    fn run(&self, scratch: &Path) -> Invocation {
        // -B: no .pyc files in the scratch dir, -S: skip site imports.
        Invocation::new(&self.interpreter, scratch)
            .arg("-B")
            .arg("-S")
            .arg(SCRIPT_NAME)
            .env("PYTHONIOENCODING", "utf-8")
    }
}
