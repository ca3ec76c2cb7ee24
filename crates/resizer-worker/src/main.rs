use anyhow::{Context, Result};
use resizer_core::{Config, NamingResolver};
use resizer_metadata::create_recorder;
use resizer_storage::create_storage;
use resizer_worker::{init_telemetry, Orchestrator};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_telemetry(config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        storage_backend = %config.storage_backend,
        metadata_backend = %config.metadata_backend,
        "Starting resizer worker"
    );

    let storage = create_storage(&config)
        .await
        .context("Failed to create storage backend")?;
    let recorder = create_recorder(&config)
        .await
        .context("Failed to create metadata recorder")?;
    let resolver = NamingResolver::default();
    tracing::info!(
        categories = resolver.config().categories.len(),
        tables = resolver.config().tables.len(),
        "Naming rules loaded"
    );
    let orchestrator = Orchestrator::new(resolver, storage, recorder);

    // One notification per line in, one acknowledgement per line out
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read notification")? {
        if line.trim().is_empty() {
            continue;
        }

        let ack = orchestrator.handle_notification(&line).await;
        let mut out = serde_json::to_vec(&ack).context("Failed to serialize acknowledgement")?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
        handled += 1;
    }

    tracing::info!(handled, "Input closed, shutting down");
    Ok(())
}
