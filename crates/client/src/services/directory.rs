use pmflow_core::domain::organization::{
    Employee, EmployeeId, OrgUnitId, OrgUnitNode, OrganizationUnit,
};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone)]
pub struct EmployeeService {
    api: ApiClient,
}

impl EmployeeService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, id: EmployeeId) -> Result<Employee, ApiError> {
        self.api.get(&format!("/employees/{id}")).await
    }
}

#[derive(Clone)]
pub struct OrganizationUnitService {
    api: ApiClient,
}

impl OrganizationUnitService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, id: OrgUnitId) -> Result<OrganizationUnit, ApiError> {
        self.api.get(&format!("/organization-units/{id}")).await
    }

    /// Root nodes of the organization tree.
    pub async fn hierarchy(&self) -> Result<Vec<OrgUnitNode>, ApiError> {
        self.api.get("/organization-units/hierarchy").await
    }
}
