//! Configuration module for bank-service.

use service_core::config::{self as core_config, env_or, require_env};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct BankConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    /// gRPC listener port; 0 picks a free port.
    pub grpc_port: u16,
    /// Deadline applied to every HTTP request.
    pub request_timeout_secs: u64,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl BankConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let default_grpc_port = common.port.saturating_add(1);

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "bank-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            grpc_port: env_or("GRPC_PORT", default_grpc_port)?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            database: DatabaseConfig::from_env()?,
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            url: require_env("DATABASE_URL")?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            min_connections: env_or("DATABASE_MIN_CONNECTIONS", 2)?,
            acquire_timeout_secs: env_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 30)?,
        })
    }
}
