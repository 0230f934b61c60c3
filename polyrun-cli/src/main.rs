//! polyrun command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polyrun_common::{ExecutionRequest, LanguageId, Outcome};
use polyrun_sandbox::{AdapterRegistry, Dispatcher, ProcessSandbox, ResourceLimits};
use polyrun_server::ServerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "polyrun")]
#[command(about = "Multi-language sandboxed code execution service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP execution service
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the listen address from the config
        #[arg(long)]
        bind: Option<String>,
    },
    /// Execute a single source file locally and print its output
    Run {
        /// Language identifier (python, javascript, java)
        language: String,

        /// Source file to execute
        file: PathBuf,

        /// Wall-clock bound in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Line fed to the program's stdin; repeatable
        #[arg(short, long)]
        input: Vec<String>,
    },
    /// List the languages this host can execute
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config, bind } => {
            let mut config = ServerConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            polyrun_server::serve(config).await
        }
        Commands::Run {
            language,
            file,
            timeout,
            input,
        } => run_file(language, file, timeout, input).await,
        Commands::Languages => {
            // Probe everything the data model knows and report what this
            // host can actually run.
            for language in LanguageId::all() {
                let available = AdapterRegistry::with_languages(&[*language]).await.is_ok();
                println!(
                    "{language}\t{}",
                    if available { "available" } else { "missing" }
                );
            }
            Ok(())
        }
    }
}

async fn run_file(
    language: String,
    file: PathBuf,
    timeout: Option<u64>,
    inputs: Vec<String>,
) -> Result<()> {
    let language: LanguageId = language.parse()?;
    let source = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let registry = AdapterRegistry::with_languages(&[language]).await?;
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        ProcessSandbox::new(),
        ResourceLimits::default(),
        1,
    );

    let mut request = ExecutionRequest::new(language, source);
    if let Some(secs) = timeout {
        request = request.with_timeout(Duration::from_secs(secs));
    }
    if !inputs.is_empty() {
        request = request.with_inputs(inputs);
    }

    let result = dispatcher.execute(request).await?;
    print!("{}", result.stdout);
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }
    if result.truncated {
        eprintln!("[output truncated]");
    }
    match result.outcome {
        Outcome::Success => Ok(()),
        Outcome::TimeoutFailure => {
            eprintln!("execution timed out after {} ms", result.duration_millis);
            std::process::exit(124);
        }
        _ => std::process::exit(result.exit_code.unwrap_or(1)),
    }
}
