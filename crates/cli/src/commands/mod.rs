pub mod act;
pub mod approvals;
pub mod authorize;
pub mod config;
pub mod doctor;
pub mod evidence;
pub mod hierarchy;
pub mod load;

use std::sync::Arc;

use pmflow_client::{
    ApiClient, ApiClientConfig, ApiError, Notice, RecordingNotifier, Services, TracingNotifier,
};
use pmflow_core::config::{AppConfig, LoadOptions};
use pmflow_core::errors::InterfaceError;
use serde::Serialize;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Read commands print their data instead of the status envelope.
    pub fn data<T: Serialize>(command: &str, data: &T) -> Self {
        match serde_json::to_string_pretty(data) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }

    /// Failure of a load or workflow use case, tagged with its correlation id.
    pub(crate) fn interface_failure(command: &str, error: &InterfaceError) -> Self {
        let exit_code = match error {
            InterfaceError::BadRequest { .. } => 5,
            InterfaceError::Conflict { .. } | InterfaceError::Forbidden { .. } => 6,
            InterfaceError::NotFound { .. } | InterfaceError::ServiceUnavailable { .. } => 4,
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error.error_class().to_string()),
            message: format!("{} {}", error.user_message(), error.message()),
            correlation_id: Some(error.correlation_id().to_string()),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub(crate) fn api_failure(command: &str, error: &ApiError) -> Self {
        Self::failure(command, error.error_class(), error.detail(), 4)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Everything an API-backed command needs.
pub(crate) struct ApiContext {
    pub config: AppConfig,
    pub services: Services,
    pub notifier: Arc<RecordingNotifier>,
    pub runtime: Runtime,
}

impl ApiContext {
    pub fn notices(&self) -> Vec<Notice> {
        self.notifier.notices()
    }
}

pub(crate) fn connect(command: &str) -> Result<ApiContext, CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;

    let notifier = Arc::new(RecordingNotifier::forwarding(Arc::new(TracingNotifier)));
    let api = ApiClient::new(ApiClientConfig::from(&config.api), notifier.clone())
        .map_err(|error| CommandResult::api_failure(command, &error))?;

    Ok(ApiContext { config, services: Services::new(api), notifier, runtime })
}
