//! One service per API resource, one method per endpoint.

pub mod approvals;
pub mod directory;
pub mod evidence;
pub mod kpi;
pub mod submissions;

pub use approvals::ApprovalService;
pub use directory::{EmployeeService, OrganizationUnitService};
pub use evidence::{EvidenceService, EvidenceUpload};
pub use kpi::{KpiActualService, KpiDefinitionService, KpiPerspectiveService, KpiTargetService};
pub use submissions::{ReviewNote, StatusChange, SubmissionService};

use crate::http::ApiClient;

/// All services over one shared `ApiClient`.
#[derive(Clone)]
pub struct Services {
    pub submissions: SubmissionService,
    pub kpi_definitions: KpiDefinitionService,
    pub kpi_targets: KpiTargetService,
    pub kpi_actuals: KpiActualService,
    pub kpi_perspectives: KpiPerspectiveService,
    pub employees: EmployeeService,
    pub org_units: OrganizationUnitService,
    pub evidence: EvidenceService,
    pub approvals: ApprovalService,
}

impl Services {
    pub fn new(api: ApiClient) -> Self {
        Self {
            submissions: SubmissionService::new(api.clone()),
            kpi_definitions: KpiDefinitionService::new(api.clone()),
            kpi_targets: KpiTargetService::new(api.clone()),
            kpi_actuals: KpiActualService::new(api.clone()),
            kpi_perspectives: KpiPerspectiveService::new(api.clone()),
            employees: EmployeeService::new(api.clone()),
            org_units: OrganizationUnitService::new(api.clone()),
            evidence: EvidenceService::new(api.clone()),
            approvals: ApprovalService::new(api),
        }
    }
}
