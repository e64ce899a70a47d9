use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::{AdfConnectionConfig, Unit};

pub struct Telemetry<T>
where
    T: SubscriberExt + Send + Sync + 'static,
{
    pub subscriber: T,
}

/// Fields stamped on every log line so runs against different factories can
/// be told apart in aggregated output.
pub fn default_fields(config: &AdfConnectionConfig) -> HashMap<String, Value> {
    HashMap::from([
        ("factory".to_owned(), Value::from(config.factory_name.as_str())),
        ("project".to_owned(), Value::from(config.project.as_str())),
    ])
}

pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
    fields: HashMap<String, Value>,
) -> Telemetry<impl SubscriberExt + Send + Sync + 'static>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let formatting_layer: BunyanFormattingLayer<Sink> =
        BunyanFormattingLayer::with_default_fields(name, sink, fields);

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    Telemetry {
        subscriber: Registry::default()
            .with(filter_layer)
            .with(JsonStorageLayer)
            .with(formatting_layer),
    }
}

pub fn init_subscriber(
    subscriber: Telemetry<impl SubscriberExt + Send + Sync + 'static>,
) -> Result<Unit> {
    LogTracer::init().context("Failed to set logger")?;
    set_global_default(subscriber.subscriber).context("Failed to set subscriber")
}
