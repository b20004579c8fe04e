//! Account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use std::str::FromStr;

pub const MAX_OWNER_LEN: usize = 255;

/// Currencies an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Vnd,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Vnd];

    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Vnd => "VND",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!(
                    "unsupported currency '{}', expected one of USD, EUR, VND",
                    s
                ))
            })
    }
}

/// Bank account. `balance` is in minor units and only changes through transfers.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Get parsed currency.
    pub fn parsed_currency(&self) -> Option<Currency> {
        self.currency.parse().ok()
    }
}

/// Input for creating a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccount {
    pub owner: String,
    pub currency: Currency,
}

impl CreateAccount {
    /// Validate raw owner/currency values coming from HTTP or gRPC.
    pub fn parse(owner: &str, currency: &str) -> Result<Self, AppError> {
        let owner = owner.trim();
        if owner.is_empty() || owner.chars().count() > MAX_OWNER_LEN {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "owner must be between 1 and {} characters",
                MAX_OWNER_LEN
            )));
        }

        Ok(Self {
            owner: owner.to_string(),
            currency: currency.parse()?,
        })
    }
}
