use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::organization::{Employee, EmployeeId, OrgUnitId, OrganizationUnit};
use crate::domain::submission::SubmissionId;
use crate::gateway::DirectoryGateway;

/// Memoized directory lookups for one page session.
///
/// Found and not-found results are cached by id. Failed lookups are not, so the
/// next pass asks again. The cache belongs to a single submission: scoping it
/// to a different submission drops everything.
#[derive(Default)]
pub struct LookupCache {
    scope: RwLock<Option<SubmissionId>>,
    employees: RwLock<HashMap<EmployeeId, Option<Employee>>>,
    org_units: RwLock<HashMap<OrgUnitId, Option<OrganizationUnit>>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the cache to `submission_id`, clearing it if it was bound elsewhere.
    /// Returns true when entries were dropped.
    pub async fn scope_to(&self, submission_id: SubmissionId) -> bool {
        let previous = self.scope.write().await.replace(submission_id);
        match previous {
            None => false,
            Some(current) if current == submission_id => false,
            Some(_) => {
                self.clear().await;
                debug!(
                    event_name = "authz.cache.rescoped",
                    submission_id = submission_id.0,
                    "lookup cache cleared for new submission"
                );
                true
            }
        }
    }

    pub async fn clear(&self) {
        self.employees.write().await.clear();
        self.org_units.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.employees.read().await.len() + self.org_units.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn employee<G>(&self, gateway: &G, id: EmployeeId) -> Option<Employee>
    where
        G: DirectoryGateway + ?Sized,
    {
        if let Some(cached) = self.employees.read().await.get(&id) {
            return cached.clone();
        }

        match gateway.employee(id).await {
            Ok(found) => {
                self.employees.write().await.insert(id, found.clone());
                found
            }
            Err(error) => {
                warn!(
                    event_name = "authz.lookup.failed",
                    entity = "employee",
                    id = id.0,
                    error = %error,
                    "employee lookup failed; relationship treated as absent"
                );
                None
            }
        }
    }

    pub async fn org_unit<G>(&self, gateway: &G, id: OrgUnitId) -> Option<OrganizationUnit>
    where
        G: DirectoryGateway + ?Sized,
    {
        if let Some(cached) = self.org_units.read().await.get(&id) {
            return cached.clone();
        }

        match gateway.org_unit(id).await {
            Ok(found) => {
                self.org_units.write().await.insert(id, found.clone());
                found
            }
            Err(error) => {
                warn!(
                    event_name = "authz.lookup.failed",
                    entity = "org_unit",
                    id = id.0,
                    error = %error,
                    "org unit lookup failed; relationship treated as absent"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::organization::{Employee, EmployeeId};
    use crate::domain::submission::SubmissionId;
    use crate::gateway::InMemoryGateway;

    use super::LookupCache;

    fn employee(id: i64) -> Employee {
        Employee {
            employee_id: EmployeeId(id),
            employee_name: format!("Employee {id}"),
            employee_number: None,
            employee_supervisor_id: None,
            employee_org_unit_id: None,
        }
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_gateway_once() {
        let gateway = InMemoryGateway::default();
        gateway.put_employee(employee(5)).await;
        let cache = LookupCache::new();

        let first = cache.employee(&gateway, EmployeeId(5)).await;
        let second = cache.employee(&gateway, EmployeeId(5)).await;

        assert_eq!(first, second);
        assert_eq!(gateway.directory_calls(), 1);
    }

    #[tokio::test]
    async fn missing_records_are_cached_but_failures_are_not() {
        let gateway = InMemoryGateway::default();
        gateway.fail_employee(EmployeeId(9)).await;
        let cache = LookupCache::new();

        assert!(cache.employee(&gateway, EmployeeId(8)).await.is_none());
        assert!(cache.employee(&gateway, EmployeeId(8)).await.is_none());
        assert_eq!(gateway.directory_calls(), 1);

        assert!(cache.employee(&gateway, EmployeeId(9)).await.is_none());
        assert!(cache.employee(&gateway, EmployeeId(9)).await.is_none());
        assert_eq!(gateway.directory_calls(), 3);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn rescoping_to_another_submission_clears_entries() {
        let gateway = InMemoryGateway::default();
        gateway.put_employee(employee(5)).await;
        let cache = LookupCache::new();

        assert!(!cache.scope_to(SubmissionId(1)).await);
        cache.employee(&gateway, EmployeeId(5)).await;
        assert!(!cache.scope_to(SubmissionId(1)).await);
        assert_eq!(cache.len().await, 1);

        assert!(cache.scope_to(SubmissionId(2)).await);
        assert!(cache.is_empty().await);
    }
}
