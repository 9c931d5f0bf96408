//! Builders for the create requests of the stack's two databases.
//!
//! Both requests start from [`default_create_request`]. The only setting that
//! changes them per environment is [`StackConfig::is_production_stack`].

use crate::config::{DatabaseSettings, StackConfig};
use crate::providers::CreateDbInstanceRequest;

/// Small instance class used by every non-production database.
pub const DATABASE_INSTANCE_CLASS_SMALL: &str = "db.m1.small";

/// Large instance class used by the production stack-instance database.
pub const DATABASE_INSTANCE_CLASS_LARGE: &str = "db.m1.large";

/// Database engine.
pub const DATABASE_ENGINE_MYSQL: &str = "MySQL";

/// Database engine version.
pub const DATABASE_ENGINE_MYSQL_VERSION: &str = "5.5.12";

/// Availability zone for the primary instance.
pub const EC2_AVAILABILITY_ZONE_US_EAST_1D: &str = "us-east-1d";

/// Sunday night PDT, expressed in UTC.
pub const PREFERRED_DATABASE_MAINTENANCE_WINDOW_SUNDAY_NIGHT_PDT: &str = "Sun:07:00-Sun:10:00";

/// Daily backup window, expressed in UTC.
pub const PREFERRED_DATABASE_BACKUP_WINDOW_MIDNIGHT: &str = "03:00-06:00";

/// License model.
pub const LICENSE_MODEL_GENERAL_PUBLIC: &str = "general-public-license";

/// Days to keep automated backups.
pub const BACKUP_RETENTION_DAYS: i32 = 7;

/// Storage for the ID generator database, in GB.
pub const ID_GENERATOR_STORAGE_GB: i32 = 5;

/// Storage for the stack-instance database, in GB.
pub const STACK_INSTANCE_STORAGE_GB: i32 = 50;

/// A request filled with every default value.
///
/// Identifier, schema, credentials, security groups and parameter group are
/// left empty for the per-database builders to fill in.
#[must_use]
pub fn default_create_request() -> CreateDbInstanceRequest {
    CreateDbInstanceRequest {
        db_instance_identifier: String::new(),
        db_name: String::new(),
        allocated_storage: 5,
        db_instance_class: DATABASE_INSTANCE_CLASS_SMALL.to_string(),
        engine: DATABASE_ENGINE_MYSQL.to_string(),
        engine_version: DATABASE_ENGINE_MYSQL_VERSION.to_string(),
        master_username: String::new(),
        master_user_password: String::new(),
        db_security_groups: Vec::new(),
        db_parameter_group_name: None,
        availability_zone: EC2_AVAILABILITY_ZONE_US_EAST_1D.to_string(),
        preferred_maintenance_window: PREFERRED_DATABASE_MAINTENANCE_WINDOW_SUNDAY_NIGHT_PDT
            .to_string(),
        preferred_backup_window: PREFERRED_DATABASE_BACKUP_WINDOW_MIDNIGHT.to_string(),
        backup_retention_period: BACKUP_RETENTION_DAYS,
        multi_az: false,
        auto_minor_version_upgrade: true,
        license_model: LICENSE_MODEL_GENERAL_PUBLIC.to_string(),
    }
}

fn apply_settings(
    request: &mut CreateDbInstanceRequest,
    settings: &DatabaseSettings,
    parameter_group: &str,
) {
    request.db_instance_identifier.clone_from(&settings.identifier);
    request.db_name.clone_from(&settings.schema);
    request.master_username.clone_from(&settings.master_username);
    request.master_user_password.clone_from(&settings.master_password);
    request.db_security_groups = vec![settings.security_group.clone()];
    request.db_parameter_group_name = Some(parameter_group.to_string());
}

/// Request for the ID generator database.
///
/// Always a small instance with minimal storage; production stacks add a
/// multi-AZ standby.
#[must_use]
pub fn build_id_generator_request(config: &StackConfig) -> CreateDbInstanceRequest {
    let mut request = default_create_request();
    request.multi_az = config.is_production_stack();
    request.allocated_storage = ID_GENERATOR_STORAGE_GB;
    apply_settings(
        &mut request,
        &config.id_generator,
        &config.database_parameter_group,
    );
    request
}

/// Request for the stack-instance database.
///
/// Production stacks get a large multi-AZ instance, everything else a small
/// single-AZ one.
#[must_use]
pub fn build_stack_instances_request(config: &StackConfig) -> CreateDbInstanceRequest {
    let mut request = default_create_request();
    if config.is_production_stack() {
        request.multi_az = true;
        request.db_instance_class = DATABASE_INSTANCE_CLASS_LARGE.to_string();
    } else {
        request.multi_az = false;
        request.db_instance_class = DATABASE_INSTANCE_CLASS_SMALL.to_string();
    }
    request.allocated_storage = STACK_INSTANCE_STORAGE_GB;
    apply_settings(
        &mut request,
        &config.stack_instance,
        &config.database_parameter_group,
    );
    request
}
