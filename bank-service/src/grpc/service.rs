//! BankService gRPC implementation.

use crate::grpc::proto::{
    bank_service_server::BankService, Account as ProtoAccount, CreateAccountRequest,
    CreateAccountResponse, Entry as ProtoEntry, GetAccountRequest, GetAccountResponse,
    Transfer as ProtoTransfer, TransferRequest, TransferResponse,
};
use crate::models::{Account, CreateAccount, Entry, Transfer, TransferInput};
use crate::services::metrics::{GRPC_REQUESTS_TOTAL, GRPC_REQUEST_DURATION};
use crate::services::{Database, TransferEngine};
use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use service_core::error::AppError;
use service_core::grpc::{GrpcResult, IntoStatus};
use std::sync::Arc;
use tonic::{Code, Request, Response, Status};
use tracing::instrument;

/// BankService implementation.
pub struct BankServiceImpl {
    db: Arc<Database>,
    transfers: TransferEngine,
}

impl BankServiceImpl {
    pub fn new(db: Arc<Database>, transfers: TransferEngine) -> Self {
        Self { db, transfers }
    }
}

fn timestamp(at: DateTime<Utc>) -> Option<Timestamp> {
    Some(Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    })
}

fn account_to_proto(account: Account) -> ProtoAccount {
    ProtoAccount {
        id: account.id,
        owner: account.owner,
        balance: account.balance,
        currency: account.currency,
        created_at: timestamp(account.created_at),
    }
}

fn entry_to_proto(entry: Entry) -> ProtoEntry {
    ProtoEntry {
        id: entry.id,
        account_id: entry.account_id,
        transfer_id: entry.transfer_id,
        amount: entry.amount,
        created_at: timestamp(entry.created_at),
    }
}

fn transfer_to_proto(transfer: Transfer) -> ProtoTransfer {
    ProtoTransfer {
        id: transfer.id,
        from_account_id: transfer.from_account_id,
        to_account_id: transfer.to_account_id,
        amount: transfer.amount,
        created_at: timestamp(transfer.created_at),
    }
}

fn status_label(code: Code) -> &'static str {
    match code {
        Code::Ok => "ok",
        Code::InvalidArgument => "invalid_argument",
        Code::NotFound => "not_found",
        Code::AlreadyExists => "already_exists",
        _ => "internal",
    }
}

/// Record the outcome of one call and convert its error, if any.
fn finish<T>(method: &str, result: Result<T, AppError>) -> GrpcResult<T> {
    let result = result.map(Response::new).map_err(IntoStatus::into_status);
    let code = result.as_ref().map(|_| Code::Ok).unwrap_or_else(Status::code);
    GRPC_REQUESTS_TOTAL
        .with_label_values(&[method, status_label(code)])
        .inc();
    result
}

#[tonic::async_trait]
impl BankService for BankServiceImpl {
    #[instrument(skip(self, request), fields(service = "bank-service", method = "CreateAccount"))]
    async fn create_account(
        &self,
        request: Request<CreateAccountRequest>,
    ) -> Result<Response<CreateAccountResponse>, Status> {
        let timer = GRPC_REQUEST_DURATION
            .with_label_values(&["CreateAccount"])
            .start_timer();

        let req = request.into_inner();
        let result = async {
            let input = CreateAccount::parse(&req.owner, &req.currency)?;
            let account = self.db.create_account(&input).await?;
            Ok::<_, AppError>(CreateAccountResponse {
                account: Some(account_to_proto(account)),
            })
        }
        .await;

        timer.observe_duration();
        finish("CreateAccount", result)
    }

    #[instrument(skip(self, request), fields(service = "bank-service", method = "GetAccount"))]
    async fn get_account(
        &self,
        request: Request<GetAccountRequest>,
    ) -> Result<Response<GetAccountResponse>, Status> {
        let timer = GRPC_REQUEST_DURATION
            .with_label_values(&["GetAccount"])
            .start_timer();

        let id = request.into_inner().id;
        let result = async {
            let account = self
                .db
                .get_account(id)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("account {} not found", id)))?;
            Ok::<_, AppError>(GetAccountResponse {
                account: Some(account_to_proto(account)),
            })
        }
        .await;

        timer.observe_duration();
        finish("GetAccount", result)
    }

    #[instrument(skip(self, request), fields(service = "bank-service", method = "Transfer"))]
    async fn transfer(
        &self,
        request: Request<TransferRequest>,
    ) -> Result<Response<TransferResponse>, Status> {
        let timer = GRPC_REQUEST_DURATION
            .with_label_values(&["Transfer"])
            .start_timer();

        let req = request.into_inner();
        let input = TransferInput {
            from_account_id: req.from_account_id,
            to_account_id: req.to_account_id,
            amount: req.amount,
        };
        let result = self.transfers.transfer(input).await.map(|res| TransferResponse {
            transfer: Some(transfer_to_proto(res.transfer)),
            from_entry: Some(entry_to_proto(res.from_entry)),
            to_entry: Some(entry_to_proto(res.to_entry)),
            from_account: Some(account_to_proto(res.from_account)),
            to_account: Some(account_to_proto(res.to_account)),
        });

        timer.observe_duration();
        finish("Transfer", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_conversion_keeps_balance_and_timestamp() {
        let created_at = DateTime::from_timestamp(1_717_200_000, 500).unwrap();
        let proto = account_to_proto(Account {
            id: 3,
            owner: "alice".to_string(),
            balance: 500,
            currency: "USD".to_string(),
            created_at,
        });

        assert_eq!(proto.id, 3);
        assert_eq!(proto.balance, 500);
        assert_eq!(proto.currency, "USD");
        let ts = proto.created_at.unwrap();
        assert_eq!(ts.seconds, 1_717_200_000);
        assert_eq!(ts.nanos, 500);
    }

    #[test]
    fn finish_maps_errors_to_status_codes() {
        let ok = finish("GetAccount", Ok::<_, AppError>(GetAccountResponse { account: None }));
        assert!(ok.is_ok());

        let err = finish::<GetAccountResponse>(
            "GetAccount",
            Err(AppError::NotFound(anyhow::anyhow!("account 1 not found"))),
        )
        .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
    }
}
