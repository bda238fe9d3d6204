use async_trait::async_trait;
use thiserror::Error;

use crate::domain::evidence::Evidence;
use crate::domain::kpi::{KpiActual, KpiDefinition, KpiId, KpiTarget, SubmissionEntry};
use crate::domain::organization::{Employee, EmployeeId, OrgUnitId, OrganizationUnit};
use crate::domain::submission::{EntryId, Submission, SubmissionId};

pub mod memory;

pub use memory::InMemoryGateway;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Employee and organization-unit lookups used by authorization.
///
/// `Ok(None)` means the record does not exist; `Err` means the lookup itself failed.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>, GatewayError>;
    async fn org_unit(&self, id: OrgUnitId) -> Result<Option<OrganizationUnit>, GatewayError>;
}

/// Everything the submission loader reads.
#[async_trait]
pub trait SubmissionGateway: DirectoryGateway {
    async fn submission(&self, id: SubmissionId) -> Result<Submission, GatewayError>;

    async fn entries(&self, id: SubmissionId) -> Result<Vec<SubmissionEntry>, GatewayError>;

    async fn kpi_definition(&self, id: KpiId) -> Result<Option<KpiDefinition>, GatewayError>;

    async fn kpi_targets(
        &self,
        entry_id: EntryId,
        submission_id: SubmissionId,
    ) -> Result<Vec<KpiTarget>, GatewayError>;

    async fn kpi_actuals(&self, kpi_id: KpiId, month: u8) -> Result<Vec<KpiActual>, GatewayError>;

    async fn evidence(&self, submission_id: SubmissionId) -> Result<Vec<Evidence>, GatewayError>;
}
