mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use snipdeck_catalog::{CatalogService, CatalogSettings};
use snipdeck_core::{Catalog, Repository};
use snipdeck_gateway::{App, AppState};
use snipdeck_generator::RandomGenerator;
use snipdeck_storage::{InMemoryRepository, SqliteRepository};
use snipdeck_telemetry::TelemetryConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

const SERVICE_NAME: &str = "snipdeck";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let _telemetry = snipdeck_telemetry::init(
        &TelemetryConfig::builder()
            .service_name(SERVICE_NAME)
            .log_format(config.log_format.into())
            .otlp_endpoint_opt(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        listen_addr = %config.socket_addr(),
        storage_backend = %config.storage,
        seed_demo = config.seed_demo,
        "starting snipdeck http server"
    );

    let settings = CatalogSettings::builder()
        .upload_api_key(config.upload_api_key.clone())
        .build();

    let catalog = match config.storage {
        StorageBackendArg::Sqlite => {
            let repository = SqliteRepository::open(&config.database_path)
                .await
                .with_context(|| {
                    format!("failed to open database {}", config.database_path.display())
                })?;
            build_catalog(repository, settings, config.seed_demo).await?
        }
        StorageBackendArg::InMemory => {
            build_catalog(InMemoryRepository::new(), settings, config.seed_demo).await?
        }
    };

    let state = AppState::new(catalog, config.public_base_url.clone());
    let listener = TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn build_catalog<R: Repository>(
    repository: R,
    settings: CatalogSettings,
    seed_demo: bool,
) -> anyhow::Result<Arc<dyn Catalog>> {
    let service = CatalogService::with_settings(repository, RandomGenerator::new(), settings);
    if seed_demo {
        service.seed_demo().await?;
    }
    Ok(Arc::new(service))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
