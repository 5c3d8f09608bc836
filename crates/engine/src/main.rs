//! Directory resolution engine, newline-JSON loop.
//!
//! Reads one [`TurnRequest`] JSON object per stdin line and writes one
//! [`TurnResponse`] JSON object per stdout line. Logging goes to stderr
//! only; stdout is reserved for the protocol.
//!
//! The bundled in-memory directory makes the binary self-contained for
//! demos and smoke tests; production deployments embed [`DirectoryEngine`]
//! as a library with real datastore collaborators.

use anyhow::{Context, Result};
use clap::Parser;
use directory_cache::MemoryCacheStore;
use directory_engine::{DirectoryEngine, EngineConfig, MemoryDirectory};
use directory_protocol::{DirectoryRecord, TurnRequest};
use directory_session::MemorySessionStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "directory-engine")]
#[command(about = "Conversational business-directory resolution engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed the in-memory directory from a JSON fixture:
    /// {"scopes": {"<id>": "<name>"}, "records": {"<scope id>": [DirectoryRecord, ...]}}
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(serde::Deserialize, Default)]
#[serde(default)]
struct Fixture {
    scopes: std::collections::HashMap<String, String>,
    records: std::collections::HashMap<String, Vec<DirectoryRecord>>,
}

fn build_directory(fixture_path: Option<&std::path::Path>) -> Result<MemoryDirectory> {
    let mut directory = MemoryDirectory::new();
    let Some(path) = fixture_path else {
        return Ok(directory);
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    let fixture: Fixture =
        serde_json::from_str(&raw).with_context(|| format!("parsing fixture {}", path.display()))?;
    for (scope_id, name) in &fixture.scopes {
        directory.add_scope(scope_id, name);
    }
    for (scope_id, records) in fixture.records {
        for record in records {
            directory.add_record(&scope_id, record);
        }
    }
    Ok(directory)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging to stderr only (stdout is for the response protocol).
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let directory = Arc::new(build_directory(cli.fixture.as_deref())?);
    let engine = DirectoryEngine::new(
        directory.clone(),
        directory.clone(),
        directory,
        Arc::new(MemorySessionStore::new()),
        Arc::new(MemoryCacheStore::new(config.cache.capacity)),
        config,
    );

    log::info!("Directory engine ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request: TurnRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("Skipping undecodable request line: {}", err);
                continue;
            }
        };
        let response = engine.handle_turn(request).await;
        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }

    log::info!("Directory engine stopped");
    Ok(())
}
