pub mod authz;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod loader;
pub mod workflow;

pub use authz::{AuthorizationEngine, AuthorizationInput, AuthorizationStatus, LookupCache};
pub use domain::organization::{CurrentUser, EmployeeId, OrgUnitId, RoleCode};
pub use domain::submission::{Submission, SubmissionId, SubmissionKind, SubmissionStatus};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use gateway::{DirectoryGateway, GatewayError, SubmissionGateway};
pub use loader::{LoadError, LoadRequest, LoadState, SubmissionSession, SubmissionView};
pub use workflow::{available_actions, next_status, SubmissionAction, TransitionOutcome};
