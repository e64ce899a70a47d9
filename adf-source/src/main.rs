use adf_domain::{
    telemetry::{default_fields, get_subscriber, init_subscriber},
    AdfConnectionConfig, ExtractionError, Source,
};
use adf_source::AdfSource;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use envconfig::Envconfig;
use futures::{pin_mut, TryStreamExt};
use serde::Serialize;
use std::io::Write;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = AdfConnectionConfig::init_from_env().context("Could not load config")?;

    // Records go to stdout, so logs go to stderr.
    let subscriber = get_subscriber(
        "adf-extract".into(),
        "info".into(),
        std::io::stderr,
        default_fields(&config),
    );
    init_subscriber(subscriber)?;

    info!("Starting extraction with config:\n{config}");

    let mut source = AdfSource::create(config)
        .await
        .context("Could not connect to the Data Factory management API")?;
    source.prepare()?;

    let emitted = emit(&source).await;

    match &emitted {
        Ok(count) => info!(count, project = source.project(), "Extraction finished"),
        Err(e) => match e.downcast_ref::<ExtractionError>() {
            Some(err) => error!(error = %err.as_json(), "Extraction aborted"),
            None => error!("Extraction aborted: {e:?}"),
        },
    }

    source.close();
    emitted.map(|_| ())
}

/// Drains the source, writing one JSON document per line.
async fn emit<S>(source: &S) -> Result<usize>
where
    S: Source,
    S::Record: Serialize,
{
    let records = source.next_record();
    pin_mut!(records);

    let stdout = std::io::stdout();
    let mut count = 0;

    while let Some(record) = records.try_next().await? {
        let line = serde_json::to_string(&record).context("Could not serialize record")?;
        writeln!(stdout.lock(), "{line}").context("Could not write record")?;
        count += 1;
    }

    Ok(count)
}
