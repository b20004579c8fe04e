//! Configuration module for hotel-service.

use service_core::config::{self as core_config, env_or, require_env};
use service_core::error::AppError;
use std::env;
use std::fmt;
use std::str::FromStr;

/// How a new reservation is protected against a concurrent double booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReservationGuard {
    /// Availability read and insert are separate statements. Two requests for
    /// the same room can both pass the check.
    CheckThenInsert,
    /// Availability read and insert share one SERIALIZABLE transaction.
    #[default]
    Serializable,
}

impl ReservationGuard {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationGuard::CheckThenInsert => "check-then-insert",
            ReservationGuard::Serializable => "serializable",
        }
    }
}

impl fmt::Display for ReservationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationGuard {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "check-then-insert" => Ok(ReservationGuard::CheckThenInsert),
            "serializable" => Ok(ReservationGuard::Serializable),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown reservation guard '{}', expected serializable or check-then-insert",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HotelConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub request_timeout_secs: u64,
    pub reservation_guard: ReservationGuard,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl HotelConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let reservation_guard = match env::var("RESERVATION_GUARD") {
            Ok(value) => value.parse()?,
            Err(_) => ReservationGuard::default(),
        };

        Ok(Self {
            common: core_config::Config::load()?,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "hotel-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            reservation_guard,
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
