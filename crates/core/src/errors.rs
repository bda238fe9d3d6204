use thiserror::Error;

use crate::domain::submission::SubmissionStatus;
use crate::gateway::GatewayError;
use crate::loader::LoadError;
use crate::workflow::SubmissionAction;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("cannot {action} a submission in status {from}")]
    InvalidTransition { from: SubmissionStatus, action: SubmissionAction },
    #[error("submission ownership is invalid: {detail}")]
    OwnershipConflict { detail: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failure of a use case (load, workflow action) before it is shown to a person.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("not permitted: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("api unavailable: {0}")]
    Upstream(String),
    #[error("superseded by a newer request")]
    Superseded,
}

impl From<GatewayError> for ApplicationError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::NotFound(detail) => Self::NotFound(detail),
            GatewayError::Unavailable(detail) | GatewayError::Malformed(detail) => {
                Self::Upstream(detail)
            }
        }
    }
}

impl From<LoadError> for ApplicationError {
    fn from(error: LoadError) -> Self {
        match error {
            LoadError::Submission(source)
            | LoadError::Entries(source)
            | LoadError::Evidence(source) => Self::from(source),
            LoadError::InvalidRequest(message) => Self::InvalidRequest(message),
            LoadError::Superseded => Self::Superseded,
        }
    }
}

/// What an operator surface reports: a class, a user-safe message and the
/// correlation id to grep logs for.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("invalid transition: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Conflict { .. } => "The submission is not in a status that allows this action.",
            Self::Forbidden { .. } => "You do not have permission to perform this action.",
            Self::NotFound { .. } => "The requested record does not exist.",
            Self::ServiceUnavailable { .. } => {
                "The performance-management API is unavailable. Please retry shortly."
            }
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "invalid_request",
            Self::Conflict { .. } => "invalid_transition",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::ServiceUnavailable { .. } => "api_unavailable",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::Conflict { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::ServiceUnavailable { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::Forbidden { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let message = self.to_string();
        match self {
            Self::Domain(DomainError::InvalidTransition { .. }) | Self::Superseded => {
                InterfaceError::Conflict { message, correlation_id }
            }
            Self::Domain(_) | Self::InvalidRequest(_) => {
                InterfaceError::BadRequest { message, correlation_id }
            }
            Self::Forbidden(_) => InterfaceError::Forbidden { message, correlation_id },
            Self::NotFound(_) => InterfaceError::NotFound { message, correlation_id },
            Self::Upstream(_) => InterfaceError::ServiceUnavailable { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::submission::SubmissionStatus;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::gateway::GatewayError;
    use crate::loader::LoadError;
    use crate::workflow::SubmissionAction;

    #[test]
    fn invalid_transition_becomes_conflict_with_correlation_id() {
        let interface = ApplicationError::from(DomainError::InvalidTransition {
            from: SubmissionStatus::Validated,
            action: SubmissionAction::Submit,
        })
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::Conflict { ref correlation_id, ref message }
                if correlation_id == "req-1" && message.contains("Validated")
        ));
        assert_eq!(interface.error_class(), "invalid_transition");
    }

    #[test]
    fn missing_submission_load_maps_to_not_found() {
        let error = LoadError::Submission(GatewayError::NotFound("submission 9".to_owned()));
        let interface = ApplicationError::from(error).into_interface("load-7");

        assert_eq!(interface.error_class(), "not_found");
        assert_eq!(interface.correlation_id(), "load-7");
        assert!(interface.message().contains("submission 9"));
    }

    #[test]
    fn broken_evidence_fetch_maps_to_service_unavailable() {
        let error = LoadError::Evidence(GatewayError::Malformed("not json".to_owned()));
        let interface = ApplicationError::from(error).into_interface("load-8");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The performance-management API is unavailable. Please retry shortly."
        );
    }

    #[test]
    fn missing_month_is_a_bad_request() {
        let error = LoadError::InvalidRequest("month required".to_owned());
        let interface = ApplicationError::from(error).into_interface("load-9");

        assert_eq!(interface.error_class(), "invalid_request");
    }

    #[test]
    fn ownership_conflict_is_a_bad_request() {
        let interface = ApplicationError::from(DomainError::OwnershipConflict {
            detail: "two owners".to_owned(),
        })
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
    }

    #[test]
    fn forbidden_keeps_its_own_message() {
        let interface = ApplicationError::Forbidden("approve requires can_approve".to_owned())
            .into_interface("req-4");

        assert_eq!(interface.error_class(), "forbidden");
        assert!(interface.message().contains("can_approve"));
        assert_eq!(interface.user_message(), "You do not have permission to perform this action.");
    }
}
