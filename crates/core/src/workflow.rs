//! Client-side mirror of the submission status workflow.
//!
//! The API owns the canonical status; these rules decide which actions a
//! caller should even attempt for the snapshot it holds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::authz::AuthorizationStatus;
use crate::domain::submission::SubmissionStatus;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionAction {
    Submit,
    Approve,
    Reject,
    Validate,
    AdminReject,
    RevertToDraft,
}

impl SubmissionAction {
    pub const ALL: [SubmissionAction; 6] = [
        Self::Submit,
        Self::Approve,
        Self::Reject,
        Self::Validate,
        Self::AdminReject,
        Self::RevertToDraft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Validate => "validate",
            Self::AdminReject => "admin_reject",
            Self::RevertToDraft => "revert_to_draft",
        }
    }

    /// Name of the permission flag that gates this action.
    pub fn permission(&self) -> &'static str {
        match self {
            Self::Submit => "can_submit",
            Self::Approve => "can_approve",
            Self::Reject => "can_reject",
            Self::Validate => "can_validate",
            Self::AdminReject => "can_admin_reject",
            Self::RevertToDraft => "can_revert_to_draft",
        }
    }

    pub fn is_permitted(&self, auth: &AuthorizationStatus) -> bool {
        match self {
            Self::Submit => auth.can_submit,
            Self::Approve => auth.can_approve,
            Self::Reject => auth.can_reject,
            Self::Validate => auth.can_validate,
            Self::AdminReject => auth.can_admin_reject,
            Self::RevertToDraft => auth.can_revert_to_draft,
        }
    }

    /// Whether the action carries a free-text comment to the API.
    pub fn takes_comment(&self) -> bool {
        matches!(self, Self::Reject | Self::AdminReject | Self::Approve)
    }
}

impl fmt::Display for SubmissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionAction {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "submit" => Ok(Self::Submit),
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "validate" => Ok(Self::Validate),
            "admin_reject" => Ok(Self::AdminReject),
            "revert" | "revert_to_draft" => Ok(Self::RevertToDraft),
            other => Err(DomainError::InvariantViolation(format!(
                "unknown submission action `{other}` (expected submit|approve|reject|validate|admin_reject|revert_to_draft)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
    pub action: SubmissionAction,
}

pub fn next_status(
    current: SubmissionStatus,
    action: SubmissionAction,
) -> Result<TransitionOutcome, DomainError> {
    use SubmissionAction::*;
    use SubmissionStatus::*;

    let to = match (current, action) {
        (Draft, Submit) => Submitted,
        (Submitted, Approve) => Approved,
        (Submitted, Reject) => Rejected,
        (Approved, Validate) => Validated,
        (Approved, AdminReject) => AdminRejected,
        (Rejected | AdminRejected, RevertToDraft) => Draft,
        (from, action) => return Err(DomainError::InvalidTransition { from, action }),
    };

    Ok(TransitionOutcome { from: current, to, action })
}

/// Actions whose transition is valid from `status` and whose permission flag is set.
pub fn available_actions(
    status: SubmissionStatus,
    auth: &AuthorizationStatus,
) -> Vec<SubmissionAction> {
    SubmissionAction::ALL
        .into_iter()
        .filter(|action| next_status(status, *action).is_ok() && action.is_permitted(auth))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::authz::AuthorizationStatus;
    use crate::domain::submission::SubmissionStatus;
    use crate::errors::DomainError;

    use super::{available_actions, next_status, SubmissionAction};

    #[test]
    fn happy_path_reaches_validated() {
        let submitted =
            next_status(SubmissionStatus::Draft, SubmissionAction::Submit).expect("submit");
        let approved = next_status(submitted.to, SubmissionAction::Approve).expect("approve");
        let validated = next_status(approved.to, SubmissionAction::Validate).expect("validate");

        assert_eq!(submitted.to, SubmissionStatus::Submitted);
        assert_eq!(approved.to, SubmissionStatus::Approved);
        assert_eq!(validated.to, SubmissionStatus::Validated);
    }

    #[test]
    fn both_rejections_revert_to_draft() {
        for status in [SubmissionStatus::Rejected, SubmissionStatus::AdminRejected] {
            let outcome =
                next_status(status, SubmissionAction::RevertToDraft).expect("revert allowed");
            assert_eq!(outcome.to, SubmissionStatus::Draft);
        }
    }

    #[test]
    fn admin_reject_only_applies_to_approved() {
        let outcome = next_status(SubmissionStatus::Approved, SubmissionAction::AdminReject)
            .expect("admin reject approved");
        assert_eq!(outcome.to, SubmissionStatus::AdminRejected);

        assert_eq!(
            next_status(SubmissionStatus::Submitted, SubmissionAction::AdminReject),
            Err(DomainError::InvalidTransition {
                from: SubmissionStatus::Submitted,
                action: SubmissionAction::AdminReject,
            })
        );
    }

    #[test]
    fn validated_is_terminal() {
        for action in SubmissionAction::ALL {
            assert!(next_status(SubmissionStatus::Validated, action).is_err());
        }
    }

    #[test]
    fn available_actions_require_both_transition_and_permission() {
        let auth = AuthorizationStatus {
            can_approve: true,
            can_reject: true,
            can_submit: true,
            ..AuthorizationStatus::default()
        };

        assert_eq!(
            available_actions(SubmissionStatus::Submitted, &auth),
            vec![SubmissionAction::Approve, SubmissionAction::Reject]
        );
        assert_eq!(available_actions(SubmissionStatus::Draft, &auth), vec![SubmissionAction::Submit]);
        assert!(available_actions(SubmissionStatus::Approved, &auth).is_empty());
    }

    #[test]
    fn actions_parse_from_cli_spelling() {
        assert_eq!("admin-reject".parse::<SubmissionAction>(), Ok(SubmissionAction::AdminReject));
        assert_eq!("revert".parse::<SubmissionAction>(), Ok(SubmissionAction::RevertToDraft));
        assert!("escalate".parse::<SubmissionAction>().is_err());
    }
}
