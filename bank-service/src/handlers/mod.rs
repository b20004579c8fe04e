//! HTTP handlers for bank-service.

pub mod accounts;
pub mod transfers;
