//! Pipeline stages for outgoing operations.

pub mod operation;

pub use operation::Request as OperationRequest;
pub use operation::Response as OperationResponse;
