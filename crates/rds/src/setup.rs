//! Create-or-get reconciliation of the stack's MySQL databases.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::StackConfig;
use crate::providers::{
    CreateDbInstanceRequest, DatabaseService, DbInstance, DbInstanceStatus, RdsError,
};
use crate::request::{build_id_generator_request, build_stack_instances_request};
use crate::resources::GeneratedResources;

/// Polling interval when waiting for an instance to become available.
const POLL_INTERVAL_SECS: u64 = 30;

/// Errors that abort a provisioning run.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The service did not report exactly one instance for an identifier.
    #[error("Did not find exactly one database instance with the identifier: {identifier} (found {count})")]
    InconsistentState { identifier: String, count: usize },

    /// The database service failed.
    #[error(transparent)]
    Rds(#[from] RdsError),

    /// The instance did not become available in time.
    #[error("DB instance {identifier} not available after {timeout_secs} seconds")]
    Timeout { identifier: String, timeout_secs: u64 },

    /// The instance entered a status it will not recover from.
    #[error("DB instance {identifier} entered status {status}")]
    Failed {
        identifier: String,
        status: DbInstanceStatus,
    },
}

/// Result of looking up an instance by identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Exactly one instance exists.
    Found(DbInstance),
    /// The service reports no such instance.
    NotFound,
}

impl Lookup {
    /// The instance, if one was found.
    #[must_use]
    pub fn instance(&self) -> Option<&DbInstance> {
        match self {
            Self::Found(instance) => Some(instance),
            Self::NotFound => None,
        }
    }
}

/// Provisions the ID generator and stack-instance databases.
pub struct MySqlDatabaseSetup<S> {
    service: S,
    config: StackConfig,
    wait_timeout_secs: Option<u64>,
    poll_interval: Duration,
}

impl<S: DatabaseService> MySqlDatabaseSetup<S> {
    /// Create a setup over `service` for the given configuration.
    #[must_use]
    pub fn new(service: S, config: StackConfig) -> Self {
        Self {
            service,
            config,
            wait_timeout_secs: None,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
        }
    }

    /// Wait up to `timeout_secs` for each instance to become available.
    #[must_use]
    pub fn with_wait(mut self, timeout_secs: u64) -> Self {
        self.wait_timeout_secs = Some(timeout_secs);
        self
    }

    /// Override the polling interval used while waiting.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The underlying database service.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The configuration this setup provisions.
    #[must_use]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Create all database instances that do not already exist.
    ///
    /// The ID generator database is handled first. The first failure aborts
    /// the run.
    ///
    /// # Errors
    /// Returns the first [`ProvisionError`] encountered.
    pub async fn setup_all_database_instances(&self) -> Result<GeneratedResources, ProvisionError> {
        let request = build_id_generator_request(&self.config);
        let id_generator = self.ensure_database_instance(&request).await?;
        debug!(instance = ?id_generator, "ID generator database instance");

        let request = build_stack_instances_request(&self.config);
        let stack_instances = self.ensure_database_instance(&request).await?;
        debug!(instance = ?stack_instances, "Stack-instance database instance");

        Ok(GeneratedResources::new(id_generator, stack_instances))
    }

    async fn ensure_database_instance(
        &self,
        request: &CreateDbInstanceRequest,
    ) -> Result<DbInstance, ProvisionError> {
        let instance = self.create_or_get_database_instance(request).await?;
        match self.wait_timeout_secs {
            Some(timeout_secs) if instance.status != DbInstanceStatus::Available => {
                self.wait_instance_available(&request.db_instance_identifier, timeout_secs)
                    .await
            }
            _ => Ok(instance),
        }
    }

    /// Look up the instance with `identifier`.
    ///
    /// # Errors
    /// Returns [`ProvisionError::InconsistentState`] when the service reports
    /// zero or several instances, and propagates any service error other than
    /// not-found.
    pub async fn lookup(&self, identifier: &str) -> Result<Lookup, ProvisionError> {
        match self.service.describe_db_instances(identifier).await {
            Ok(instances) => match <[DbInstance; 1]>::try_from(instances) {
                Ok([instance]) => Ok(Lookup::Found(instance)),
                Err(instances) => Err(ProvisionError::InconsistentState {
                    identifier: identifier.to_string(),
                    count: instances.len(),
                }),
            },
            Err(RdsError::InstanceNotFound(_)) => Ok(Lookup::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Return the instance described by `request`, creating it if it does not
    /// exist yet.
    ///
    /// # Errors
    /// See [`Self::lookup`]; creation failures are propagated as well.
    pub async fn create_or_get_database_instance(
        &self,
        request: &CreateDbInstanceRequest,
    ) -> Result<DbInstance, ProvisionError> {
        let identifier = &request.db_instance_identifier;
        match self.lookup(identifier).await? {
            Lookup::Found(instance) => {
                info!(identifier = %identifier, status = %instance.status, "Database already exists");
                Ok(instance)
            }
            Lookup::NotFound => {
                info!(identifier = %identifier, "Database does not exist, creating");
                debug!(request = ?request, "CreateDBInstance request");
                Ok(self.service.create_db_instance(request).await?)
            }
        }
    }

    /// Poll until the instance reports `available`.
    ///
    /// # Errors
    /// Returns [`ProvisionError::Timeout`] when `timeout_secs` elapses and
    /// [`ProvisionError::Failed`] when the instance enters a failed status.
    pub async fn wait_instance_available(
        &self,
        identifier: &str,
        timeout_secs: u64,
    ) -> Result<DbInstance, ProvisionError> {
        info!(identifier = %identifier, timeout_secs, "Waiting for DB instance to be available");

        let start = tokio::time::Instant::now();
        let timeout = Duration::from_secs(timeout_secs);

        loop {
            let instance = match self.lookup(identifier).await? {
                Lookup::Found(instance) => instance,
                Lookup::NotFound => {
                    return Err(RdsError::InstanceNotFound(identifier.to_string()).into())
                }
            };

            debug!(
                identifier = %identifier,
                status = %instance.status,
                elapsed_secs = start.elapsed().as_secs(),
                "Polling DB instance status"
            );

            match instance.status {
                DbInstanceStatus::Available => {
                    info!(identifier = %identifier, "DB instance is available");
                    return Ok(instance);
                }
                DbInstanceStatus::Failed => {
                    return Err(ProvisionError::Failed {
                        identifier: identifier.to_string(),
                        status: instance.status,
                    });
                }
                _ => {}
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(ProvisionError::Timeout {
                    identifier: identifier.to_string(),
                    timeout_secs,
                });
            }

            // The last poll lands on the deadline rather than past it.
            tokio::time::sleep(self.poll_interval.min(timeout - elapsed)).await;
        }
    }
}
