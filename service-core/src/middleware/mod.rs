pub mod panic;
pub mod tracing;
