//! Database service abstractions.
//!
//! This module defines the trait the provisioner talks to and the types that
//! cross it, plus the AWS implementation.

pub mod aws;
mod traits;

#[cfg(test)]
pub use traits::MockDatabaseService;
pub use traits::{
    CreateDbInstanceRequest, DatabaseService, DbEndpoint, DbInstance, DbInstanceStatus, RdsError,
};

pub use aws::Rds;
