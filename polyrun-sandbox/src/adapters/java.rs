//! Java adapter
//!
//! The only compiled language in the default registry: `stage` writes the
//! source under the detected public class name, `compile` runs javac, and
//! the class file is executed from the scratch directory.

use crate::adapter::{Invocation, RuntimeAdapter};
use crate::limits::ResourceLimits;
use async_trait::async_trait;
use polyrun_common::LanguageId;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct JavaAdapter {
    compiler: String,
    runtime: String,
}

impl JavaAdapter {
    pub fn new() -> Self {
        Self {
            compiler: "javac".to_string(),
            runtime: "java".to_string(),
        }
    }
}

impl Default for JavaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Public class name declared by the source, or "Main" when none is found.
/// javac requires the file name to match the public class.
fn class_name(source: &str) -> String {
    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("public class ") {
            let name = rest
                .split_whitespace()
                .next()
                .unwrap_or("Main")
                .trim_end_matches('{')
                .trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    "Main".to_string()
}

/// Class name of the staged source file in the scratch directory.
fn staged_class(scratch: &Path) -> String {
    let Ok(entries) = std::fs::read_dir(scratch) else {
        return "Main".to_string();
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "java") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                return stem.to_string();
            }
        }
    }
    "Main".to_string()
}

#[async_trait]
impl RuntimeAdapter for JavaAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Java
    }

    fn interpreter(&self) -> &str {
        &self.runtime
    }

    async fn stage(&self, source: &str, scratch: &Path) -> std::io::Result<()> {
        let file = format!("{}.java", class_name(source));
        tokio::fs::write(scratch.join(file), source).await
    }

    fn compile(&self, scratch: &Path) -> Option<Invocation> {
        let file = format!("{}.java", staged_class(scratch));
        Some(
            Invocation::new(&self.compiler, scratch)
                .arg("-encoding")
                .arg("UTF-8")
                .arg(file)
                .env("JAVA_TOOL_OPTIONS", "-Dfile.encoding=UTF-8"),
        )
    }

    fn run(&self, scratch: &Path) -> Invocation {
        Invocation::new(&self.runtime, scratch)
            .arg("-Xmx256m")
            .arg("-Xss1m")
            .arg("-XX:+UseSerialGC")
            .arg("-cp")
            .arg(".")
            .arg(staged_class(scratch))
            .env("JAVA_TOOL_OPTIONS", "-Dfile.encoding=UTF-8")
    }

    fn run_limits(&self, base: &ResourceLimits) -> ResourceLimits {
        let mut limits = base.clone();
        // The JVM maps large regions up front; bound the heap with -Xmx and
        // leave address space for the runtime itself.
        limits.max_memory_bytes = None;
        limits.max_processes = limits.max_processes.map(|n| n.max(256));
        limits
    }

    fn compile_limits(&self, base: &ResourceLimits) -> ResourceLimits {
        self.run_limits(base)
    }
}
