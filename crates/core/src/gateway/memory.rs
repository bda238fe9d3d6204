use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::evidence::Evidence;
use crate::domain::kpi::{KpiActual, KpiDefinition, KpiId, KpiTarget, SubmissionEntry};
use crate::domain::organization::{Employee, EmployeeId, OrgUnitId, OrganizationUnit};
use crate::domain::submission::{EntryId, Submission, SubmissionId};

use super::{DirectoryGateway, GatewayError, SubmissionGateway};

/// Map-backed gateway for tests and offline runs.
#[derive(Default)]
pub struct InMemoryGateway {
    submissions: RwLock<HashMap<SubmissionId, Submission>>,
    entries: RwLock<HashMap<SubmissionId, Vec<SubmissionEntry>>>,
    definitions: RwLock<HashMap<KpiId, KpiDefinition>>,
    targets: RwLock<HashMap<EntryId, Vec<KpiTarget>>>,
    actuals: RwLock<HashMap<(KpiId, u8), Vec<KpiActual>>>,
    evidence: RwLock<HashMap<SubmissionId, Vec<Evidence>>>,
    employees: RwLock<HashMap<EmployeeId, Employee>>,
    org_units: RwLock<HashMap<OrgUnitId, OrganizationUnit>>,
    failing_employees: RwLock<HashSet<EmployeeId>>,
    failing_org_units: RwLock<HashSet<OrgUnitId>>,
    failing_definitions: RwLock<HashSet<KpiId>>,
    submission_latency: RwLock<HashMap<SubmissionId, Duration>>,
    kpi_latency: RwLock<HashMap<KpiId, Duration>>,
    directory_calls: AtomicUsize,
}

impl InMemoryGateway {
    pub async fn put_submission(&self, submission: Submission) {
        self.submissions.write().await.insert(submission.id, submission);
    }

    pub async fn put_entries(&self, submission_id: SubmissionId, entries: Vec<SubmissionEntry>) {
        self.entries.write().await.insert(submission_id, entries);
    }

    pub async fn put_definition(&self, definition: KpiDefinition) {
        self.definitions.write().await.insert(definition.kpi_id, definition);
    }

    pub async fn put_target(&self, target: KpiTarget) {
        self.targets.write().await.entry(target.entry_id).or_default().push(target);
    }

    pub async fn put_actual(&self, actual: KpiActual) {
        self.actuals
            .write()
            .await
            .entry((actual.kpi_id, actual.actual_month))
            .or_default()
            .push(actual);
    }

    pub async fn put_evidence(&self, evidence: Evidence) {
        self.evidence.write().await.entry(evidence.submission_id).or_default().push(evidence);
    }

    pub async fn put_employee(&self, employee: Employee) {
        self.employees.write().await.insert(employee.employee_id, employee);
    }

    pub async fn put_org_unit(&self, unit: OrganizationUnit) {
        self.org_units.write().await.insert(unit.org_unit_id, unit);
    }

    pub async fn fail_employee(&self, id: EmployeeId) {
        self.failing_employees.write().await.insert(id);
    }

    pub async fn fail_org_unit(&self, id: OrgUnitId) {
        self.failing_org_units.write().await.insert(id);
    }

    pub async fn fail_definition(&self, id: KpiId) {
        self.failing_definitions.write().await.insert(id);
    }

    /// Delays `submission(id)` to simulate a slow response.
    pub async fn delay_submission(&self, id: SubmissionId, latency: Duration) {
        self.submission_latency.write().await.insert(id, latency);
    }

    /// Delays the definition and actuals lookups of one KPI.
    pub async fn delay_kpi(&self, id: KpiId, latency: Duration) {
        self.kpi_latency.write().await.insert(id, latency);
    }

    async fn kpi_pause(&self, id: KpiId) {
        let latency = self.kpi_latency.read().await.get(&id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Number of employee and org-unit lookups served so far.
    pub fn directory_calls(&self) -> usize {
        self.directory_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryGateway for InMemoryGateway {
    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>, GatewayError> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_employees.read().await.contains(&id) {
            return Err(GatewayError::Unavailable(format!("employee {id} lookup failed")));
        }
        Ok(self.employees.read().await.get(&id).cloned())
    }

    async fn org_unit(&self, id: OrgUnitId) -> Result<Option<OrganizationUnit>, GatewayError> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_org_units.read().await.contains(&id) {
            return Err(GatewayError::Unavailable(format!("org unit {id} lookup failed")));
        }
        Ok(self.org_units.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl SubmissionGateway for InMemoryGateway {
    async fn submission(&self, id: SubmissionId) -> Result<Submission, GatewayError> {
        let latency = self.submission_latency.read().await.get(&id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.submissions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("submission {id}")))
    }

    async fn entries(&self, id: SubmissionId) -> Result<Vec<SubmissionEntry>, GatewayError> {
        Ok(self.entries.read().await.get(&id).cloned().unwrap_or_default())
    }

    async fn kpi_definition(&self, id: KpiId) -> Result<Option<KpiDefinition>, GatewayError> {
        self.kpi_pause(id).await;
        if self.failing_definitions.read().await.contains(&id) {
            return Err(GatewayError::Unavailable(format!("kpi definition {id} lookup failed")));
        }
        Ok(self.definitions.read().await.get(&id).cloned())
    }

    async fn kpi_targets(
        &self,
        entry_id: EntryId,
        _submission_id: SubmissionId,
    ) -> Result<Vec<KpiTarget>, GatewayError> {
        Ok(self.targets.read().await.get(&entry_id).cloned().unwrap_or_default())
    }

    async fn kpi_actuals(&self, kpi_id: KpiId, month: u8) -> Result<Vec<KpiActual>, GatewayError> {
        self.kpi_pause(kpi_id).await;
        Ok(self.actuals.read().await.get(&(kpi_id, month)).cloned().unwrap_or_default())
    }

    async fn evidence(&self, submission_id: SubmissionId) -> Result<Vec<Evidence>, GatewayError> {
        Ok(self.evidence.read().await.get(&submission_id).cloned().unwrap_or_default())
    }
}
