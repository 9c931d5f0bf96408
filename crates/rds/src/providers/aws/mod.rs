//! AWS RDS database service.
//!
//! Implements the [`DatabaseService`](super::DatabaseService) trait on top of
//! the official `aws-sdk-rds` client. Credentials are resolved through the
//! standard AWS provider chain (environment, profile, instance metadata).

mod client;
mod models;

pub use client::Rds;
pub use models::*;
