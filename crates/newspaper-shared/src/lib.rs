//! # NewsPaper Shared
//!
//! Request/response types of the HTTP API, kept free of domain logic so
//! clients can depend on them directly.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldErrorResponse};
