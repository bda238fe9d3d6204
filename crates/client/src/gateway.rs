use async_trait::async_trait;
use pmflow_core::domain::evidence::Evidence;
use pmflow_core::domain::kpi::{KpiActual, KpiDefinition, KpiId, KpiTarget, SubmissionEntry};
use pmflow_core::domain::organization::{Employee, EmployeeId, OrgUnitId, OrganizationUnit};
use pmflow_core::domain::submission::{EntryId, Submission, SubmissionId};
use pmflow_core::gateway::{DirectoryGateway, GatewayError, SubmissionGateway};

use crate::error::ApiError;
use crate::services::Services;

/// Core gateway traits backed by the REST services.
///
/// Single-record lookups answer `Ok(None)` on 404 so authorization and row
/// assembly can treat a missing record as absent rather than failed.
#[derive(Clone)]
pub struct HttpGateway {
    services: Services,
}

impl HttpGateway {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }
}

fn optional<T>(result: Result<T, ApiError>) -> Result<Option<T>, GatewayError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error.into()),
    }
}

#[async_trait]
impl DirectoryGateway for HttpGateway {
    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>, GatewayError> {
        optional(self.services.employees.get(id).await)
    }

    async fn org_unit(&self, id: OrgUnitId) -> Result<Option<OrganizationUnit>, GatewayError> {
        optional(self.services.org_units.get(id).await)
    }
}

#[async_trait]
impl SubmissionGateway for HttpGateway {
    async fn submission(&self, id: SubmissionId) -> Result<Submission, GatewayError> {
        Ok(self.services.submissions.get(id).await?)
    }

    async fn entries(&self, id: SubmissionId) -> Result<Vec<SubmissionEntry>, GatewayError> {
        Ok(self.services.submissions.entries(id).await?)
    }

    async fn kpi_definition(&self, id: KpiId) -> Result<Option<KpiDefinition>, GatewayError> {
        optional(self.services.kpi_definitions.get(id).await)
    }

    async fn kpi_targets(
        &self,
        entry_id: EntryId,
        submission_id: SubmissionId,
    ) -> Result<Vec<KpiTarget>, GatewayError> {
        Ok(self.services.kpi_targets.for_entry(entry_id, submission_id).await?)
    }

    async fn kpi_actuals(&self, kpi_id: KpiId, month: u8) -> Result<Vec<KpiActual>, GatewayError> {
        Ok(self.services.kpi_actuals.for_kpi_month(kpi_id, month).await?)
    }

    async fn evidence(&self, submission_id: SubmissionId) -> Result<Vec<Evidence>, GatewayError> {
        Ok(self.services.evidence.list(submission_id).await?)
    }
}
