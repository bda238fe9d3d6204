//! Typed access to the performance-management REST API.
//!
//! `ApiClient` owns transport concerns (base URL, bearer token, timeout,
//! error decoding). The `services` wrap one endpoint per method and
//! `HttpGateway` adapts them to the core gateway traits.

pub mod error;
pub mod gateway;
pub mod http;
pub mod notify;
pub mod services;
pub mod workflow;

pub use error::ApiError;
pub use gateway::HttpGateway;
pub use http::{ApiClient, ApiClientConfig};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use services::Services;
pub use workflow::{WorkflowCommands, WorkflowError};
