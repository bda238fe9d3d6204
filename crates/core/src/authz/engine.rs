use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::organization::{CurrentUser, EmployeeId, OrgUnitId};
use crate::domain::submission::{Submission, SubmissionOwner, SubmissionStatus};
use crate::gateway::DirectoryGateway;

use super::cache::LookupCache;
use super::rules;
use super::AuthorizationStatus;

/// The derivation was abandoned because a newer request took its place.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("authorization derivation superseded by a newer request")]
pub struct Superseded;

#[derive(Clone, Copy, Debug)]
pub struct AuthorizationInput<'a> {
    pub submission: &'a Submission,
    pub user: &'a CurrentUser,
    pub evidence_count: usize,
}

impl AuthorizationInput<'_> {
    fn status(&self) -> SubmissionStatus {
        self.submission.status
    }

    fn has_evidence(&self) -> bool {
        self.evidence_count > 0
    }
}

#[derive(Clone, Debug, Default)]
pub struct AuthorizationEngine;

impl AuthorizationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Derives the permission vector. Lookup failures only narrow the result.
    pub async fn derive<G>(
        &self,
        input: AuthorizationInput<'_>,
        gateway: &G,
        cache: &LookupCache,
    ) -> AuthorizationStatus
    where
        G: DirectoryGateway + ?Sized,
    {
        let never = CancellationToken::new();
        self.derive_until_cancelled(input, gateway, cache, &never)
            .await
            .unwrap_or_default()
    }

    /// Same as [`derive`](Self::derive), abandoning the lookup chain once
    /// `cancel` fires.
    pub async fn derive_until_cancelled<G>(
        &self,
        input: AuthorizationInput<'_>,
        gateway: &G,
        cache: &LookupCache,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationStatus, Superseded>
    where
        G: DirectoryGateway + ?Sized,
    {
        let mut status = AuthorizationStatus::default();
        status |= rules::role_grants(input.user, input.status());

        match input.submission.owner {
            SubmissionOwner::Employee(owner) => {
                status |= self.employee_grants(input, owner, gateway, cache, cancel).await?;
            }
            SubmissionOwner::OrgUnit(owner) => {
                status |= self.org_unit_grants(input, owner, gateway, cache, cancel).await?;
            }
        }

        debug!(
            event_name = "authz.derived",
            submission_id = input.submission.id.0,
            submission_status = %input.status(),
            granted = ?status.granted(),
            "authorization status derived"
        );
        Ok(status)
    }

    async fn employee_grants<G>(
        &self,
        input: AuthorizationInput<'_>,
        owner: EmployeeId,
        gateway: &G,
        cache: &LookupCache,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationStatus, Superseded>
    where
        G: DirectoryGateway + ?Sized,
    {
        let Some(current) = input.user.employee_id else {
            return Ok(AuthorizationStatus::default());
        };

        if current == owner {
            return Ok(rules::employee_owner_grants(input.status()));
        }

        let owner_record = until_cancelled(cancel, cache.employee(gateway, owner)).await?;
        let supervises = owner_record
            .and_then(|employee| employee.employee_supervisor_id)
            .is_some_and(|supervisor| supervisor == current);

        if supervises {
            Ok(rules::supervisor_grants(input.status(), input.has_evidence()))
        } else {
            Ok(AuthorizationStatus::default())
        }
    }

    async fn org_unit_grants<G>(
        &self,
        input: AuthorizationInput<'_>,
        owner: OrgUnitId,
        gateway: &G,
        cache: &LookupCache,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationStatus, Superseded>
    where
        G: DirectoryGateway + ?Sized,
    {
        let current_employee = input.user.employee_id;
        let current_unit = input.user.org_unit_id;

        if current_unit == Some(owner) {
            return Ok(rules::org_unit_owner_grants(input.status(), input.has_evidence()));
        }
        if current_employee.is_none() && current_unit.is_none() {
            return Ok(AuthorizationStatus::default());
        }

        let mut status = AuthorizationStatus::default();

        let owner_unit = until_cancelled(cancel, cache.org_unit(gateway, owner)).await?;
        let Some(parent_id) = owner_unit.and_then(|unit| unit.org_unit_parent_id) else {
            return Ok(status);
        };

        // Two independent routes to approval: heading the parent unit, or
        // belonging to it. Both are kept.
        if let Some(current_employee) = current_employee {
            let parent = until_cancelled(cancel, cache.org_unit(gateway, parent_id)).await?;
            if let Some(head_id) = parent.and_then(|unit| unit.org_unit_head_id) {
                let head = until_cancelled(cancel, cache.employee(gateway, head_id)).await?;
                if head.is_some_and(|head| head.employee_id == current_employee) {
                    status |= rules::parent_head_grants(input.status());
                }
            }
        }

        if current_unit == Some(parent_id) {
            status |= rules::parent_unit_grants(input.status());
        }

        Ok(status)
    }
}

async fn until_cancelled<F>(cancel: &CancellationToken, lookup: F) -> Result<F::Output, Superseded>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Superseded),
        output = lookup => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use crate::authz::{AuthorizationEngine, AuthorizationInput, AuthorizationStatus, LookupCache};
    use crate::domain::organization::{
        CurrentUser, Employee, EmployeeId, OrgUnitId, OrganizationUnit,
    };
    use crate::domain::submission::{
        Submission, SubmissionId, SubmissionKind, SubmissionOwner, SubmissionStatus,
    };
    use crate::gateway::InMemoryGateway;

    use super::Superseded;

    fn employee(id: i64, supervisor: Option<i64>) -> Employee {
        Employee {
            employee_id: EmployeeId(id),
            employee_name: format!("Employee {id}"),
            employee_number: None,
            employee_supervisor_id: supervisor.map(EmployeeId),
            employee_org_unit_id: None,
        }
    }

    fn unit(id: i64, parent: Option<i64>, head: Option<i64>) -> OrganizationUnit {
        OrganizationUnit {
            org_unit_id: OrgUnitId(id),
            org_unit_name: format!("Unit {id}"),
            org_unit_code: None,
            org_unit_parent_id: parent.map(OrgUnitId),
            org_unit_head_id: head.map(EmployeeId),
        }
    }

    fn submission(owner: SubmissionOwner, status: SubmissionStatus) -> Submission {
        Submission {
            id: SubmissionId(100),
            kind: SubmissionKind::Target,
            period_id: Some(2025),
            month: None,
            status,
            owner,
            comments: None,
            submitted_at: None,
        }
    }

    fn employee_owned(id: i64, status: SubmissionStatus) -> Submission {
        submission(SubmissionOwner::Employee(EmployeeId(id)), status)
    }

    fn unit_owned(id: i64, status: SubmissionStatus) -> Submission {
        submission(SubmissionOwner::OrgUnit(OrgUnitId(id)), status)
    }

    fn user(employee: Option<i64>, unit: Option<i64>) -> CurrentUser {
        CurrentUser::new(employee.map(EmployeeId), unit.map(OrgUnitId))
    }

    /// Unit 1 (head 1) contains unit 3 (head 30) which contains unit 10 (head 40).
    /// Employee 5 is supervised by employee 7.
    async fn directory() -> InMemoryGateway {
        let gateway = InMemoryGateway::default();
        gateway.put_employee(employee(1, None)).await;
        gateway.put_employee(employee(5, Some(7))).await;
        gateway.put_employee(employee(7, Some(30))).await;
        gateway.put_employee(employee(30, Some(1))).await;
        gateway.put_employee(employee(40, Some(30))).await;
        gateway.put_org_unit(unit(1, None, Some(1))).await;
        gateway.put_org_unit(unit(3, Some(1), Some(30))).await;
        gateway.put_org_unit(unit(10, Some(3), Some(40))).await;
        gateway
    }

    async fn derive(
        gateway: &InMemoryGateway,
        submission: &Submission,
        user: &CurrentUser,
        evidence_count: usize,
    ) -> AuthorizationStatus {
        AuthorizationEngine::new()
            .derive(
                AuthorizationInput { submission, user, evidence_count },
                gateway,
                &LookupCache::new(),
            )
            .await
    }

    #[tokio::test]
    async fn owner_of_draft_can_attach_evidence_but_not_edit() {
        let gateway = directory().await;
        let status =
            derive(&gateway, &employee_owned(5, SubmissionStatus::Draft), &user(Some(5), None), 0)
                .await;

        assert!(status.is_owner);
        assert!(status.can_view);
        assert!(status.can_submit_evidence);
        assert!(!status.can_edit);
        assert_eq!(status.granted(), vec!["is_owner", "can_view", "can_submit_evidence"]);
        assert_eq!(gateway.directory_calls(), 0, "owner branch needs no lookups");
    }

    #[tokio::test]
    async fn owner_evidence_flag_ignores_evidence_presence() {
        let gateway = directory().await;
        let submission = employee_owned(5, SubmissionStatus::Draft);
        let current = user(Some(5), None);

        let without = derive(&gateway, &submission, &current, 0).await;
        let with = derive(&gateway, &submission, &current, 3).await;

        assert!(without.can_submit_evidence && with.can_submit_evidence);
        assert!(without.is_owner && with.is_owner);
    }

    #[tokio::test]
    async fn supervisor_submit_depends_on_evidence() {
        let gateway = directory().await;
        let submission = employee_owned(5, SubmissionStatus::Draft);
        let supervisor = user(Some(7), None);

        let without = derive(&gateway, &submission, &supervisor, 0).await;
        let with = derive(&gateway, &submission, &supervisor, 1).await;

        assert!(without.is_supervisor && without.can_edit);
        assert!(!without.can_submit);
        assert!(with.can_submit);
        assert!(!with.can_approve && !with.can_reject);
    }

    #[tokio::test]
    async fn supervisor_can_revert_rejected_submissions() {
        let gateway = directory().await;
        let supervisor = user(Some(7), None);

        for status in [SubmissionStatus::Rejected, SubmissionStatus::AdminRejected] {
            let derived = derive(&gateway, &employee_owned(5, status), &supervisor, 0).await;
            assert!(derived.can_revert_to_draft, "{status} should be revertible");
            assert!(!derived.can_edit);
        }

        let submitted =
            derive(&gateway, &employee_owned(5, SubmissionStatus::Submitted), &supervisor, 0).await;
        assert!(!submitted.can_revert_to_draft);
    }

    #[tokio::test]
    async fn unrelated_employee_gets_nothing() {
        let gateway = directory().await;
        let status =
            derive(&gateway, &employee_owned(5, SubmissionStatus::Draft), &user(Some(40), None), 1)
                .await;

        assert_eq!(status, AuthorizationStatus::default());
    }

    #[tokio::test]
    async fn org_unit_member_is_owner_head_and_manager() {
        let gateway = directory().await;
        for state in [
            SubmissionStatus::Draft,
            SubmissionStatus::Submitted,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            let status = derive(&gateway, &unit_owned(10, state), &user(Some(40), Some(10)), 0).await;
            assert!(status.is_owner && status.is_org_head && status.is_org_unit_manager);
            assert!(!status.can_approve && !status.can_reject, "no self-approval in {state}");
        }
    }

    #[tokio::test]
    async fn org_unit_owner_submit_requires_evidence() {
        let gateway = directory().await;
        let submission = unit_owned(10, SubmissionStatus::Draft);
        let member = user(Some(40), Some(10));

        let without = derive(&gateway, &submission, &member, 0).await;
        let with = derive(&gateway, &submission, &member, 2).await;

        assert!(!without.can_submit && with.can_submit);
        assert!(without.can_edit && without.can_submit_evidence);
    }

    #[tokio::test]
    async fn head_of_parent_unit_can_approve_submitted() {
        let gateway = directory().await;
        // Employee 30 heads unit 3 but is recorded in a different unit.
        let status =
            derive(&gateway, &unit_owned(10, SubmissionStatus::Submitted), &user(Some(30), Some(1)), 0)
                .await;

        assert!(status.is_org_head);
        assert!(status.can_approve);
        assert!(status.can_reject);
        assert!(status.can_view);
        assert!(!status.is_owner);
    }

    #[tokio::test]
    async fn parent_head_cannot_approve_outside_submitted() {
        let gateway = directory().await;
        let head = user(Some(30), Some(1));

        for state in [SubmissionStatus::Draft, SubmissionStatus::Approved, SubmissionStatus::Rejected] {
            let status = derive(&gateway, &unit_owned(10, state), &head, 1).await;
            assert!(status.is_org_head && status.can_view);
            assert!(!status.can_approve && !status.can_reject);
        }
    }

    #[tokio::test]
    async fn member_of_parent_unit_can_approve_without_heading_it() {
        let gateway = directory().await;
        let status =
            derive(&gateway, &unit_owned(10, SubmissionStatus::Submitted), &user(Some(7), Some(3)), 0)
                .await;

        assert!(status.can_approve && status.can_reject && status.can_view);
        assert!(!status.is_org_head);
    }

    #[tokio::test]
    async fn grandparent_head_gets_nothing() {
        let gateway = directory().await;
        let status =
            derive(&gateway, &unit_owned(10, SubmissionStatus::Submitted), &user(Some(1), Some(1)), 0)
                .await;

        assert_eq!(status, AuthorizationStatus::default());
    }

    #[tokio::test]
    async fn admin_and_owner_grants_combine() {
        let gateway = directory().await;
        let submission = employee_owned(5, SubmissionStatus::Approved);

        let owner_only = derive(&gateway, &submission, &user(Some(5), None), 0).await;
        let admin_only = derive(&gateway, &submission, &user(Some(99), None).with_role("admin"), 0).await;
        let both = derive(&gateway, &submission, &user(Some(5), None).with_role("admin"), 0).await;

        let mut union = owner_only;
        union |= admin_only;
        assert_eq!(both, union);
        assert!(both.is_owner && both.can_validate);
    }

    #[tokio::test]
    async fn repeated_derivation_is_identical() {
        let gateway = directory().await;
        let engine = AuthorizationEngine::new();
        let cache = LookupCache::new();
        let submission = unit_owned(10, SubmissionStatus::Submitted);
        let current = user(Some(30), Some(1));
        let input = AuthorizationInput { submission: &submission, user: &current, evidence_count: 0 };

        let first = engine.derive(input, &gateway, &cache).await;
        let calls_after_first = gateway.directory_calls();
        let second = engine.derive(input, &gateway, &cache).await;

        assert_eq!(first, second);
        assert_eq!(gateway.directory_calls(), calls_after_first, "second pass is served from cache");
    }

    #[tokio::test]
    async fn failed_employee_lookup_fails_closed() {
        let gateway = directory().await;
        gateway.fail_employee(EmployeeId(5)).await;

        let status =
            derive(&gateway, &employee_owned(5, SubmissionStatus::Draft), &user(Some(7), None), 1)
                .await;

        assert_eq!(status, AuthorizationStatus::default());
    }

    #[tokio::test]
    async fn failed_org_unit_lookup_fails_closed_but_keeps_role_grants() {
        let gateway = directory().await;
        gateway.fail_org_unit(OrgUnitId(3)).await;

        let status = derive(
            &gateway,
            &unit_owned(10, SubmissionStatus::Submitted),
            &user(Some(30), Some(1)).with_role("director"),
            0,
        )
        .await;

        assert!(status.can_view);
        assert!(!status.is_org_head && !status.can_approve && !status.can_reject);
    }

    #[tokio::test]
    async fn missing_head_record_fails_closed() {
        let gateway = InMemoryGateway::default();
        gateway.put_org_unit(unit(10, Some(3), None)).await;
        gateway.put_org_unit(unit(3, Some(1), Some(30))).await;

        let status =
            derive(&gateway, &unit_owned(10, SubmissionStatus::Submitted), &user(Some(30), None), 0)
                .await;

        assert_eq!(status, AuthorizationStatus::default());
    }

    #[tokio::test]
    async fn cancelled_token_abandons_lookup_chain() {
        let gateway = directory().await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let submission = employee_owned(5, SubmissionStatus::Draft);
        let supervisor = user(Some(7), None);

        let result = AuthorizationEngine::new()
            .derive_until_cancelled(
                AuthorizationInput { submission: &submission, user: &supervisor, evidence_count: 0 },
                &gateway,
                &LookupCache::new(),
                &cancel,
            )
            .await;

        assert_eq!(result, Err(Superseded));
    }
}
