//! Common types, protocol definitions, and errors shared by the PII vault
//! service and its callers.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
