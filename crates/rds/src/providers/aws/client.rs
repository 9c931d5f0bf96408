//! AWS RDS client implementation.
//!
//! Requests are signed by the SDK using credentials from the default provider
//! chain.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_rds::error::DisplayErrorContext;
use aws_sdk_rds::Client;
use tracing::{debug, info};

use super::models::to_db_instance;
use crate::providers::traits::{CreateDbInstanceRequest, DatabaseService, DbInstance, RdsError};

/// AWS RDS database service.
#[derive(Clone)]
pub struct Rds {
    /// SDK client.
    client: Client,
    /// AWS region.
    region: String,
}

impl Rds {
    /// Create a new RDS service for `region`.
    ///
    /// # Errors
    /// Returns error if the region is empty.
    pub async fn new(region: impl Into<String>) -> Result<Self, RdsError> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(RdsError::Config("AWS region cannot be empty".to_string()));
        }

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        Ok(Self::from_client(Client::new(&sdk_config), region))
    }

    /// Wrap an already configured SDK client.
    #[must_use]
    pub fn from_client(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// Region this service talks to.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl DatabaseService for Rds {
    async fn describe_db_instances(&self, identifier: &str) -> Result<Vec<DbInstance>, RdsError> {
        debug!(identifier = %identifier, region = %self.region, "DescribeDBInstances");

        match self
            .client
            .describe_db_instances()
            .db_instance_identifier(identifier)
            .send()
            .await
        {
            Ok(output) => Ok(output.db_instances().iter().map(to_db_instance).collect()),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_db_instance_not_found_fault() {
                    Err(RdsError::InstanceNotFound(identifier.to_string()))
                } else {
                    Err(RdsError::Api(DisplayErrorContext(&err).to_string()))
                }
            }
        }
    }

    async fn create_db_instance(
        &self,
        request: &CreateDbInstanceRequest,
    ) -> Result<DbInstance, RdsError> {
        info!(
            identifier = %request.db_instance_identifier,
            instance_class = %request.db_instance_class,
            storage_gb = request.allocated_storage,
            multi_az = request.multi_az,
            region = %self.region,
            "Creating DB instance"
        );

        let output = self
            .client
            .create_db_instance()
            .db_instance_identifier(&request.db_instance_identifier)
            .db_name(&request.db_name)
            .allocated_storage(request.allocated_storage)
            .db_instance_class(&request.db_instance_class)
            .engine(&request.engine)
            .engine_version(&request.engine_version)
            .master_username(&request.master_username)
            .master_user_password(&request.master_user_password)
            .set_db_security_groups(Some(request.db_security_groups.clone()))
            .set_db_parameter_group_name(request.db_parameter_group_name.clone())
            .availability_zone(&request.availability_zone)
            .preferred_maintenance_window(&request.preferred_maintenance_window)
            .preferred_backup_window(&request.preferred_backup_window)
            .backup_retention_period(request.backup_retention_period)
            .multi_az(request.multi_az)
            .auto_minor_version_upgrade(request.auto_minor_version_upgrade)
            .license_model(&request.license_model)
            .send()
            .await
            .map_err(|e| RdsError::Api(DisplayErrorContext(&e).to_string()))?;

        let created = output.db_instance().ok_or_else(|| {
            RdsError::Api("No DB instance returned from creation".to_string())
        })?;

        info!(
            identifier = %request.db_instance_identifier,
            status = created.db_instance_status().unwrap_or("unknown"),
            "DB instance create accepted"
        );

        Ok(to_db_instance(created))
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_rds::config::{BehaviorVersion as SdkBehaviorVersion, Credentials};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::tests::sample;
    use crate::providers::traits::DbInstanceStatus;
    use crate::request::build_stack_instances_request;

    const STACK_INSTANCE_XML: &str = r"<DBInstance>
        <DBInstanceIdentifier>dev-stack-db</DBInstanceIdentifier>
        <DBInstanceClass>db.m1.large</DBInstanceClass>
        <Engine>mysql</Engine>
        <EngineVersion>5.5.12</EngineVersion>
        <DBInstanceStatus>available</DBInstanceStatus>
        <DBName>stackdb</DBName>
        <Endpoint>
          <Address>dev-stack-db.abc123.us-east-1.rds.amazonaws.com</Address>
          <Port>3306</Port>
        </Endpoint>
        <AllocatedStorage>50</AllocatedStorage>
        <MultiAZ>true</MultiAZ>
        <AvailabilityZone>us-east-1d</AvailabilityZone>
      </DBInstance>";

    fn error_xml(code: &str, message: &str) -> String {
        format!(
            r#"<ErrorResponse xmlns="http://rds.amazonaws.com/doc/2014-10-31/">
  <Error>
    <Type>Sender</Type>
    <Code>{code}</Code>
    <Message>{message}</Message>
  </Error>
  <RequestId>5c5d2b7e-0000-0000-0000-000000000000</RequestId>
</ErrorResponse>"#
        )
    }

    fn rds_for(server: &MockServer) -> Rds {
        let config = aws_sdk_rds::Config::builder()
            .behavior_version(SdkBehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
            .endpoint_url(server.uri())
            .build();
        Rds::from_client(Client::from_conf(config), "us-east-1")
    }

    #[tokio::test]
    async fn test_new_rejects_empty_region() {
        let result = Rds::new("  ").await;
        assert!(matches!(result, Err(RdsError::Config(_))));
    }

    #[tokio::test]
    async fn test_describe_maps_not_found_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeDBInstances"))
            .and(body_string_contains("DBInstanceIdentifier=missing-db"))
            .respond_with(ResponseTemplate::new(404).set_body_raw(
                error_xml("DBInstanceNotFound", "DBInstance missing-db not found."),
                "text/xml",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let err = rds_for(&server)
            .describe_db_instances("missing-db")
            .await
            .unwrap_err();
        assert!(
            matches!(&err, RdsError::InstanceNotFound(id) if id == "missing-db"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn test_describe_returns_instances() {
        let server = MockServer::start().await;
        let body = format!(
            r#"<DescribeDBInstancesResponse xmlns="http://rds.amazonaws.com/doc/2014-10-31/">
  <DescribeDBInstancesResult>
    <DBInstances>
      {STACK_INSTANCE_XML}
    </DBInstances>
  </DescribeDBInstancesResult>
  <ResponseMetadata>
    <RequestId>5c5d2b7e-0000-0000-0000-000000000001</RequestId>
  </ResponseMetadata>
</DescribeDBInstancesResponse>"#
        );
        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeDBInstances"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/xml"))
            .expect(1)
            .mount(&server)
            .await;

        let instances = rds_for(&server)
            .describe_db_instances("dev-stack-db")
            .await
            .unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].identifier, "dev-stack-db");
        assert_eq!(instances[0].status, DbInstanceStatus::Available);
        assert!(instances[0].multi_az);
        let endpoint = instances[0].endpoint.as_ref().unwrap();
        assert_eq!(
            endpoint.address,
            "dev-stack-db.abc123.us-east-1.rds.amazonaws.com"
        );
        assert_eq!(endpoint.port, 3306);
    }

    #[tokio::test]
    async fn test_describe_maps_other_errors_to_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_raw(
                error_xml(
                    "AccessDenied",
                    "User is not authorized to perform rds:DescribeDBInstances",
                ),
                "text/xml",
            ))
            .mount(&server)
            .await;

        let err = rds_for(&server)
            .describe_db_instances("dev-stack-db")
            .await
            .unwrap_err();
        assert!(matches!(err, RdsError::Api(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_create_sends_request_fields() {
        let server = MockServer::start().await;
        let body = format!(
            r#"<CreateDBInstanceResponse xmlns="http://rds.amazonaws.com/doc/2014-10-31/">
  <CreateDBInstanceResult>
    {STACK_INSTANCE_XML}
  </CreateDBInstanceResult>
  <ResponseMetadata>
    <RequestId>5c5d2b7e-0000-0000-0000-000000000002</RequestId>
  </ResponseMetadata>
</CreateDBInstanceResponse>"#
        );
        Mock::given(method("POST"))
            .and(body_string_contains("Action=CreateDBInstance"))
            .and(body_string_contains("DBInstanceIdentifier=dev-stack-db"))
            .and(body_string_contains("DBInstanceClass=db.m1.large"))
            .and(body_string_contains("MultiAZ=true"))
            .and(body_string_contains("AllocatedStorage=50"))
            .and(body_string_contains("DBParameterGroupName=stack-mysql-params"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/xml"))
            .expect(1)
            .mount(&server)
            .await;

        let request = build_stack_instances_request(&sample(true));
        let created = rds_for(&server)
            .create_db_instance(&request)
            .await
            .unwrap();
        assert_eq!(created.identifier, "dev-stack-db");
        assert_eq!(created.instance_class, "db.m1.large");
    }
}
