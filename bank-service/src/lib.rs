//! Bank service - accounts, ledger entries and atomic transfers.

pub mod config;
pub mod dtos;
pub mod grpc;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
