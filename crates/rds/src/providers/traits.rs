//! Database service trait and common types.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during database service operations.
#[derive(Error, Debug)]
pub enum RdsError {
    /// No DB instance exists with the requested identifier.
    #[error("DB instance not found: {0}")]
    InstanceNotFound(String),

    /// API returned an error response.
    #[error("API error: {0}")]
    Api(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// ============================================================================
// DB instance types
// ============================================================================

/// DB instance lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DbInstanceStatus {
    /// Instance is being created.
    Creating,
    /// Instance is ready for connections.
    Available,
    /// A backup is in progress.
    BackingUp,
    /// Instance is being modified.
    Modifying,
    /// Instance is rebooting.
    Rebooting,
    /// Instance is being deleted.
    Deleting,
    /// Instance is stopped.
    Stopped,
    /// Instance failed and cannot recover on its own.
    Failed,
    /// Unknown status.
    #[serde(other)]
    Unknown,
}

impl DbInstanceStatus {
    /// Map an RDS status string onto a known status.
    #[must_use]
    pub fn from_api(status: &str) -> Self {
        match status {
            "creating" => Self::Creating,
            "available" => Self::Available,
            "backing-up" => Self::BackingUp,
            "modifying" | "upgrading" | "renaming" | "resetting-master-credentials" => {
                Self::Modifying
            }
            "rebooting" => Self::Rebooting,
            "deleting" => Self::Deleting,
            "stopped" | "stopping" => Self::Stopped,
            "failed" | "incompatible-parameters" | "incompatible-restore" | "storage-full" => {
                Self::Failed
            }
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for DbInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creating => write!(f, "creating"),
            Self::Available => write!(f, "available"),
            Self::BackingUp => write!(f, "backing-up"),
            Self::Modifying => write!(f, "modifying"),
            Self::Rebooting => write!(f, "rebooting"),
            Self::Deleting => write!(f, "deleting"),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed => write!(f, "failed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Network address of a DB instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbEndpoint {
    /// DNS address.
    pub address: String,
    /// Listener port.
    pub port: i32,
}

/// An RDS DB instance as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbInstance {
    /// DB instance identifier.
    pub identifier: String,
    /// Instance class (e.g. `db.m1.small`).
    pub instance_class: String,
    /// Database engine.
    pub engine: String,
    /// Engine version.
    pub engine_version: Option<String>,
    /// Current status.
    pub status: DbInstanceStatus,
    /// Initial schema name.
    pub db_name: Option<String>,
    /// Connection endpoint, absent while the instance is still being created.
    pub endpoint: Option<DbEndpoint>,
    /// Allocated storage in GB.
    pub allocated_storage_gb: i32,
    /// Whether a standby replica runs in a second availability zone.
    pub multi_az: bool,
    /// Availability zone of the primary.
    pub availability_zone: Option<String>,
    /// When the instance was created.
    pub created_at: Option<DateTime<Utc>>,
}

/// Request to create a new DB instance.
///
/// The master password is never rendered by `Debug` and never serialized.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CreateDbInstanceRequest {
    /// DB instance identifier.
    pub db_instance_identifier: String,
    /// Schema created on the instance.
    pub db_name: String,
    /// Allocated storage in GB.
    pub allocated_storage: i32,
    /// Instance class.
    pub db_instance_class: String,
    /// Database engine.
    pub engine: String,
    /// Engine version.
    pub engine_version: String,
    /// Master user name.
    pub master_username: String,
    /// Master user password.
    #[serde(skip_serializing)]
    pub master_user_password: String,
    /// DB security group names.
    pub db_security_groups: Vec<String>,
    /// DB parameter group name.
    pub db_parameter_group_name: Option<String>,
    /// Availability zone of the primary.
    pub availability_zone: String,
    /// Weekly maintenance window (UTC).
    pub preferred_maintenance_window: String,
    /// Daily backup window (UTC).
    pub preferred_backup_window: String,
    /// Days to retain automated backups.
    pub backup_retention_period: i32,
    /// Run a standby replica in a second availability zone.
    pub multi_az: bool,
    /// Apply minor engine upgrades during the maintenance window.
    pub auto_minor_version_upgrade: bool,
    /// License model.
    pub license_model: String,
}

impl fmt::Debug for CreateDbInstanceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateDbInstanceRequest")
            .field("db_instance_identifier", &self.db_instance_identifier)
            .field("db_name", &self.db_name)
            .field("allocated_storage", &self.allocated_storage)
            .field("db_instance_class", &self.db_instance_class)
            .field("engine", &self.engine)
            .field("engine_version", &self.engine_version)
            .field("master_username", &self.master_username)
            .field("master_user_password", &"<redacted>")
            .field("db_security_groups", &self.db_security_groups)
            .field("db_parameter_group_name", &self.db_parameter_group_name)
            .field("availability_zone", &self.availability_zone)
            .field(
                "preferred_maintenance_window",
                &self.preferred_maintenance_window,
            )
            .field("preferred_backup_window", &self.preferred_backup_window)
            .field("backup_retention_period", &self.backup_retention_period)
            .field("multi_az", &self.multi_az)
            .field(
                "auto_minor_version_upgrade",
                &self.auto_minor_version_upgrade,
            )
            .field("license_model", &self.license_model)
            .finish()
    }
}

/// Trait for services that manage RDS DB instances.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// Describe the DB instances matching `identifier`.
    ///
    /// Returns [`RdsError::InstanceNotFound`] when the service reports that no
    /// such instance exists.
    async fn describe_db_instances(&self, identifier: &str) -> Result<Vec<DbInstance>, RdsError>;

    /// Create a new DB instance.
    async fn create_db_instance(
        &self,
        request: &CreateDbInstanceRequest,
    ) -> Result<DbInstance, RdsError>;
}
