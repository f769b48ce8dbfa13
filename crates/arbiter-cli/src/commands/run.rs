//! The run command: wire the services and process one domain.

use crate::backend::CliBackend;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use arbiter_engine::{ArbitrationEngine, EngineConfig, RequestPipeline};
use arbiter_generator::{ClaimGenerator, DomainDump, GeneratorConfig};
use arbiter_llm::{FailingBackend, OpenRouterBackend};
use arbiter_registry::client::DEFAULT_TIMEOUT_SECS;
use arbiter_registry::{GleifClient, RelationshipResolver};
use arbiter_store::SqliteStore;
use tracing::warn;

fn make_backend(offline: bool, config: &Config) -> Result<CliBackend> {
    if offline {
        return Ok(CliBackend::Offline(FailingBackend::new()));
    }
    match config.api_key() {
        Some(key) => Ok(CliBackend::OpenRouter(OpenRouterBackend::new(
            key,
            &config.backend.model,
        )?)),
        None => {
            warn!("No API key configured; ranking deterministically");
            Ok(CliBackend::Offline(FailingBackend::new()))
        }
    }
}

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    // Composition root: every service is built here, once.
    let search = GleifClient::with_endpoint(&config.registry.endpoint, DEFAULT_TIMEOUT_SECS)?;
    let registry = GleifClient::with_endpoint(&config.registry.endpoint, DEFAULT_TIMEOUT_SECS)?;
    let relationship_cache = SqliteStore::new(&config.db_path)?;
    let store = SqliteStore::new(&config.db_path)?;

    let generator = ClaimGenerator::new(
        make_backend(args.offline, config)?,
        search,
        GeneratorConfig::default(),
    );
    let resolver = RelationshipResolver::new(registry, relationship_cache);
    let engine = ArbitrationEngine::new(
        make_backend(args.offline, config)?,
        resolver,
        EngineConfig::default(),
    );
    let pipeline = RequestPipeline::new(generator, engine, store);

    let mut dump = DomainDump::for_domain(&args.domain);
    dump.primary_entity = args.entity.clone();

    let (request_id, result) = pipeline.process(&dump, args.profile.as_deref()).await?;

    println!("Request: {}", request_id);
    println!("{}", formatter.format_result(&result)?);
    Ok(())
}
