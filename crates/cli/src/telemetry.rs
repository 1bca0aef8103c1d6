//! Observability wiring for the binary.
//!
//! Every crate in the workspace emits `tracing` spans and events; this module
//! is the single place they are subscribed. The subscriber always carries an
//! env-filter (`RUST_LOG`, default `info`) and a fmt layer (JSON when
//! configured), plus an OpenTelemetry OTLP export layer when an endpoint is
//! configured.

use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetrySection;

/// Keeps the OTLP pipeline alive for the process lifetime.
///
/// Dropping it without [`Telemetry::shutdown`] loses buffered spans.
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Installs the global subscriber.
    ///
    /// Must be called once, before any spans are emitted.
    pub fn init(section: &TelemetrySection) -> anyhow::Result<Self> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let (text_layer, json_layer) = if section.json_output {
            (None, Some(tracing_subscriber::fmt::layer().json()))
        } else {
            (Some(tracing_subscriber::fmt::layer()), None)
        };

        let (otel_layer, provider) = match &section.otlp_endpoint {
            Some(endpoint) => {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_tonic()
                    .with_endpoint(endpoint)
                    .build()
                    .context("building OTLP span exporter")?;
                let provider = TracerProvider::builder()
                    .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
                    .with_resource(Resource::new(vec![KeyValue::new(
                        "service.name",
                        "prsentry",
                    )]))
                    .build();
                let tracer = provider.tracer("prsentry");
                (
                    Some(tracing_opentelemetry::layer().with_tracer(tracer)),
                    Some(provider),
                )
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(text_layer)
            .with(json_layer)
            .with(otel_layer)
            .init();

        Ok(Self { provider })
    }

    /// Flushes and shuts down the export pipeline.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("telemetry shutdown failed: {e}");
            }
        }
    }
}
