//! gRPC module for bank-service.

mod service;

pub use service::BankServiceImpl;

/// Generated protobuf code.
pub mod proto {
    tonic::include_proto!("bank.v1");

    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("bank_descriptor");
}
