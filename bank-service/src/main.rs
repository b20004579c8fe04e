//! Bank Service entry point.

use bank_service::config::BankConfig;
use bank_service::startup::Application;
use service_core::observability::init_tracing;
use service_core::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = BankConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service_name = %config.service_name,
        version = %config.service_version,
        otlp_endpoint = ?config.otlp_endpoint,
        host = %config.common.host,
        http_port = %config.common.port,
        grpc_port = %config.grpc_port,
        request_timeout_secs = config.request_timeout_secs,
        db_max_connections = %config.database.max_connections,
        "Starting bank-service"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    app.run_until_stopped(shutdown_signal()).await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}
