//! Idempotent RDS provisioning for stack deployments.
//!
//! Every stack owns two MySQL databases on Amazon RDS:
//!
//! - **ID generator** - a small database backing the ID sequence service
//! - **Stack instance** - the main database for the stack
//!
//! [`MySqlDatabaseSetup`] builds a create request for each one from a
//! [`StackConfig`], looks the instance up by identifier and only creates it
//! when RDS reports that it does not exist.
//!
//! # Example
//!
//! ```rust,ignore
//! use stack_rds::{MySqlDatabaseSetup, Rds, StackConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StackConfig::load("stack.yaml".as_ref())?;
//!     config.validate()?;
//!
//!     let rds = Rds::new(&config.region).await?;
//!     let resources = MySqlDatabaseSetup::new(rds, config)
//!         .setup_all_database_instances()
//!         .await?;
//!
//!     println!("{:?}", resources.stack_instances_endpoint());
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod providers;
pub mod request;
pub mod resources;
pub mod setup;

pub use config::{ConfigError, DatabaseSettings, StackConfig};
pub use providers::{
    CreateDbInstanceRequest, DatabaseService, DbEndpoint, DbInstance, DbInstanceStatus, Rds,
    RdsError,
};
pub use resources::GeneratedResources;
pub use setup::{Lookup, MySqlDatabaseSetup, ProvisionError};
