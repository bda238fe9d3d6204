use pmflow_core::authz::AuthorizationStatus;
use pmflow_core::domain::submission::{Submission, SubmissionStatus};
use pmflow_core::errors::{ApplicationError, DomainError};
use pmflow_core::gateway::GatewayError;
use pmflow_core::workflow::{next_status, SubmissionAction};
use thiserror::Error;
use tracing::info;

use crate::error::ApiError;
use crate::services::{ReviewNote, StatusChange, SubmissionService};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("`{action}` requires `{permission}`, which the current user does not hold")]
    NotPermitted { action: SubmissionAction, permission: &'static str },
    #[error(transparent)]
    Transition(#[from] DomainError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WorkflowError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::NotPermitted { .. } => "forbidden",
            Self::Transition(_) => "invalid_transition",
            Self::Api(error) => error.error_class(),
        }
    }
}

impl From<WorkflowError> for ApplicationError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::NotPermitted { .. } => Self::Forbidden(error.to_string()),
            WorkflowError::Transition(error) => Self::Domain(error),
            WorkflowError::Api(ApiError::Unauthorized(detail)) => Self::Forbidden(detail),
            WorkflowError::Api(error) => Self::from(GatewayError::from(error)),
        }
    }
}

/// Runs a submission action after checking it locally.
#[derive(Clone)]
pub struct WorkflowCommands {
    submissions: SubmissionService,
}

impl WorkflowCommands {
    pub fn new(submissions: SubmissionService) -> Self {
        Self { submissions }
    }

    /// Nothing is sent unless the transition is valid from the held status and
    /// `auth` carries the action's permission.
    pub async fn perform(
        &self,
        submission: &Submission,
        auth: &AuthorizationStatus,
        action: SubmissionAction,
        comment: Option<String>,
    ) -> Result<Submission, WorkflowError> {
        let outcome = next_status(submission.status, action)?;
        if !action.is_permitted(auth) {
            return Err(WorkflowError::NotPermitted { action, permission: action.permission() });
        }

        let comment = comment.filter(|_| action.takes_comment());
        let updated = match action {
            SubmissionAction::Validate => {
                self.submissions
                    .validate(submission.id, &ReviewNote { submission_comments: comment })
                    .await?
            }
            SubmissionAction::AdminReject => {
                self.submissions
                    .admin_reject(submission.id, &ReviewNote { submission_comments: comment })
                    .await?
            }
            SubmissionAction::Submit
            | SubmissionAction::Approve
            | SubmissionAction::Reject
            | SubmissionAction::RevertToDraft => {
                let change = StatusChange { submission_status: outcome.to, submission_comments: comment };
                self.submissions.update_status(submission.id, &change).await?
            }
        };

        info!(
            event_name = "workflow.action.performed",
            submission_id = submission.id.0,
            action = action.as_str(),
            from = outcome.from.as_str(),
            to = updated.status.as_str(),
            "submission action accepted"
        );
        if updated.status != outcome.to {
            log_divergence(action, outcome.to, updated.status);
        }

        Ok(updated)
    }
}

fn log_divergence(action: SubmissionAction, expected: SubmissionStatus, actual: SubmissionStatus) {
    tracing::warn!(
        event_name = "workflow.status.diverged",
        action = action.as_str(),
        expected = expected.as_str(),
        actual = actual.as_str(),
        "api returned a different status than the local workflow predicts"
    );
}
