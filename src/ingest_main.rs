use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};

use clinic_chat::core::config::{AppPaths, ConfigService};
use clinic_chat::core::logging;
use clinic_chat::llm::OllamaProvider;
use clinic_chat::rag::ingest::{collect_documents, ingest_documents, prepare_index};
use clinic_chat::rag::{RagStore, SqliteRagStore, TextChunker};

const USAGE: &str = "usage: ingest [--rebuild]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut rebuild = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--rebuild" => rebuild = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            other => bail!("unknown argument '{}'\n{}", other, USAGE),
        }
    }

    let paths = Arc::new(AppPaths::new());
    logging::init(&paths.log_dir, "ingest.log");

    let config = ConfigService::new(paths)
        .load_config()
        .context("Invalid configuration")?;

    let store = SqliteRagStore::with_path(config.storage.index_file())
        .await
        .context("Failed to open vector index")?;
    let embedder = OllamaProvider::new(
        &config.models.ollama_base_url,
        &config.models.embedding_model,
        Duration::from_secs(config.models.request_timeout_secs),
    )?;

    prepare_index(&store, &config.models.embedding_model, rebuild).await?;

    let documents = collect_documents(&config.storage.documents_path)?;
    tracing::info!(
        "Ingesting {} documents from {}",
        documents.len(),
        config.storage.documents_path.display()
    );

    let report = ingest_documents(
        &documents,
        &TextChunker::from_config(&config.ingest),
        &embedder,
        &store,
        config.ingest.batch_size,
    )
    .await
    .context("Ingestion failed")?;

    println!(
        "Ingested {} documents as {} chunks; index now holds {} chunks ({})",
        report.documents,
        report.chunks,
        store.count().await?,
        store.db_path().display()
    );

    Ok(())
}
