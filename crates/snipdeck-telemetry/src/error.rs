use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("unknown log format: {0}")]
    UnknownLogFormat(String),
    #[error("failed to bridge log records: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("failed to build span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
}
