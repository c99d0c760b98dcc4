//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ErrorCode`]: error taxonomy surfaced to callers
//! - [`error::DomainError`]: domain-level errors

pub mod error;
