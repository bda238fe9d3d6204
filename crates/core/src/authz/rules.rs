//! Grants contributed by each matched relationship.

use crate::domain::organization::CurrentUser;
use crate::domain::submission::SubmissionStatus;

use super::AuthorizationStatus;

pub fn role_grants(user: &CurrentUser, status: SubmissionStatus) -> AuthorizationStatus {
    let mut grants = AuthorizationStatus::default();

    if user.is_admin() {
        grants.can_view = true;
        grants.can_validate = status == SubmissionStatus::Approved;
        grants.can_admin_reject = status == SubmissionStatus::Approved;
    }

    if user.is_director() {
        grants.can_view = true;
    }

    grants
}

/// The current user is the employee the submission belongs to.
pub fn employee_owner_grants(status: SubmissionStatus) -> AuthorizationStatus {
    AuthorizationStatus {
        is_owner: true,
        can_view: true,
        can_submit_evidence: status == SubmissionStatus::Draft,
        ..AuthorizationStatus::default()
    }
}

/// The current user supervises the owning employee.
pub fn supervisor_grants(status: SubmissionStatus, has_evidence: bool) -> AuthorizationStatus {
    let draft = status == SubmissionStatus::Draft;
    AuthorizationStatus {
        is_supervisor: true,
        can_view: true,
        can_edit: draft,
        can_submit: draft && has_evidence,
        can_revert_to_draft: status.is_rejected(),
        ..AuthorizationStatus::default()
    }
}

/// The current user belongs to the owning organization unit.
pub fn org_unit_owner_grants(status: SubmissionStatus, has_evidence: bool) -> AuthorizationStatus {
    let draft = status == SubmissionStatus::Draft;
    AuthorizationStatus {
        is_owner: true,
        is_org_head: true,
        is_org_unit_manager: true,
        can_view: true,
        can_edit: draft,
        can_submit: draft && has_evidence,
        can_submit_evidence: draft,
        can_revert_to_draft: status.is_rejected(),
        ..AuthorizationStatus::default()
    }
}

/// The current user heads the parent of the owning organization unit.
pub fn parent_head_grants(status: SubmissionStatus) -> AuthorizationStatus {
    let submitted = status == SubmissionStatus::Submitted;
    AuthorizationStatus {
        is_org_head: true,
        can_view: true,
        can_approve: submitted,
        can_reject: submitted,
        ..AuthorizationStatus::default()
    }
}

/// The current user's organization unit is the direct parent of the owning unit.
pub fn parent_unit_grants(status: SubmissionStatus) -> AuthorizationStatus {
    let submitted = status == SubmissionStatus::Submitted;
    AuthorizationStatus {
        can_view: true,
        can_approve: submitted,
        can_reject: submitted,
        ..AuthorizationStatus::default()
    }
}
