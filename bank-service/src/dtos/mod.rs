//! HTTP request and response bodies.

use crate::models::{Entry, Transfer, TransferInput};
use serde::{Deserialize, Serialize};
use service_core::utils::Page;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 255, message = "owner must be between 1 and 255 characters"))]
    pub owner: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CreateTransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

impl From<CreateTransferRequest> for TransferInput {
    fn from(req: CreateTransferRequest) -> Self {
        Self {
            from_account_id: req.from_account_id,
            to_account_id: req.to_account_id,
            amount: req.amount,
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, page: Page) -> Self {
        Self {
            data,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferDetailsResponse {
    pub transfer: Transfer,
    pub entries: Vec<Entry>,
}
