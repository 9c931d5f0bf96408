//! Conversions between `aws-sdk-rds` types and the crate's own models.

use aws_sdk_rds::types::DbInstance as SdkDbInstance;
use chrono::{DateTime, Utc};

use crate::providers::traits::{DbEndpoint, DbInstance, DbInstanceStatus};

/// Convert an SDK DB instance to our type.
#[must_use]
pub fn to_db_instance(sdk: &SdkDbInstance) -> DbInstance {
    let status = sdk
        .db_instance_status()
        .map_or(DbInstanceStatus::Unknown, DbInstanceStatus::from_api);

    let endpoint = sdk.endpoint().and_then(|e| {
        e.address().map(|address| DbEndpoint {
            address: address.to_string(),
            port: e.port().unwrap_or(DEFAULT_MYSQL_PORT),
        })
    });

    DbInstance {
        identifier: sdk.db_instance_identifier().unwrap_or_default().to_string(),
        instance_class: sdk.db_instance_class().unwrap_or_default().to_string(),
        engine: sdk.engine().unwrap_or_default().to_string(),
        engine_version: sdk.engine_version().map(ToString::to_string),
        status,
        db_name: sdk.db_name().map(ToString::to_string),
        endpoint,
        allocated_storage_gb: sdk.allocated_storage().unwrap_or_default(),
        multi_az: sdk.multi_az().unwrap_or(false),
        availability_zone: sdk.availability_zone().map(ToString::to_string),
        created_at: sdk
            .instance_create_time()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), 0)),
    }
}

/// Port MySQL listens on when RDS omits it.
pub const DEFAULT_MYSQL_PORT: i32 = 3306;

/// Common AWS regions.
pub mod regions {
    /// US East (N. Virginia).
    pub const US_EAST_1: &str = "us-east-1";
}

#[cfg(test)]
mod tests {
    use aws_sdk_rds::types::Endpoint;

    use super::*;

    #[test]
    fn test_to_db_instance_maps_fields() {
        let sdk = SdkDbInstance::builder()
            .db_instance_identifier("prod-id-gen")
            .db_instance_class("db.m1.small")
            .engine("mysql")
            .engine_version("5.5.12")
            .db_instance_status("available")
            .db_name("idgen")
            .endpoint(
                Endpoint::builder()
                    .address("prod-id-gen.abc.us-east-1.rds.amazonaws.com")
                    .port(3306)
                    .build(),
            )
            .allocated_storage(5)
            .multi_az(true)
            .availability_zone("us-east-1d")
            .build();

        let converted = to_db_instance(&sdk);
        assert_eq!(converted.identifier, "prod-id-gen");
        assert_eq!(converted.status, DbInstanceStatus::Available);
        assert_eq!(converted.allocated_storage_gb, 5);
        assert!(converted.multi_az);
        assert_eq!(
            converted.endpoint.map(|e| e.address),
            Some("prod-id-gen.abc.us-east-1.rds.amazonaws.com".to_string())
        );
    }

    #[test]
    fn test_to_db_instance_while_creating() {
        let sdk = SdkDbInstance::builder()
            .db_instance_identifier("dev-stack")
            .db_instance_status("creating")
            .build();

        let converted = to_db_instance(&sdk);
        assert_eq!(converted.status, DbInstanceStatus::Creating);
        assert!(converted.endpoint.is_none());
        assert!(!converted.multi_az);
    }
}
