//! gRPC helpers: mapping the service error taxonomy onto `tonic::Status`.

pub mod error;

pub use error::{GrpcResult, IntoStatus};
