//! Tracing setup shared by the snipdeck binaries.
//!
//! [`init`] installs a global subscriber made of an `EnvFilter` (read from
//! `RUST_LOG`, `info` when unset), a text or JSON formatter and, when an OTLP
//! endpoint is configured, an OpenTelemetry layer exporting spans over gRPC.
//! Records emitted through the `log` facade are bridged into tracing.

mod error;

pub use error::TelemetryError;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use typed_builder::TypedBuilder;

pub type Result<T> = std::result::Result<T, TelemetryError>;

pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(TelemetryError::UnknownLogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(setter(into))]
    service_name: String,
    #[builder(default)]
    log_format: LogFormat,
    /// gRPC endpoint of an OTLP collector, e.g. `http://localhost:4317`.
    #[builder(default, setter(strip_option(fallback = otlp_endpoint_opt), into))]
    otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint.as_deref()
    }
}

/// Keeps the span exporter alive; dropping it flushes pending spans.
#[derive(Debug)]
#[must_use = "dropping the guard shuts the span exporter down"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    pub fn exports_spans(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {err}");
            }
        }
    }
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build())
}

/// Installs the global subscriber.
///
/// Must be called once per process, from within a tokio runtime when an OTLP
/// endpoint is configured.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    tracing_log::LogTracer::init()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let provider = config
        .otlp_endpoint()
        .map(|endpoint| tracer_provider(config.service_name(), endpoint))
        .transpose()?;
    let otel = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let (text, json) = match config.log_format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(otel)
        .with(text)
        .with(json);
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(
        service = %config.service_name,
        format = %config.log_format,
        otlp = provider.is_some(),
        "telemetry initialized"
    );

    Ok(TelemetryGuard { provider })
}
