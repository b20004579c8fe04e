//! Domain models for bank-service.

mod account;
mod transfer;

pub use account::{Account, CreateAccount, Currency};
pub use transfer::{Entry, Transfer, TransferInput, TransferResult};
