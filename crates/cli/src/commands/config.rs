use std::env;
use std::fs;
use std::path::Path;

use pmflow_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field<'a> {
    key: &'a str,
    env_keys: &'a [&'a str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        Field { key: "api.base_url", env_keys: &["PMFLOW_API_BASE_URL"], value: config.api.base_url.clone() },
        Field {
            key: "api.timeout_secs",
            env_keys: &["PMFLOW_API_TIMEOUT_SECS"],
            value: config.api.timeout_secs.to_string(),
        },
        Field {
            key: "api.token",
            env_keys: &["PMFLOW_API_TOKEN"],
            value: config
                .api
                .token
                .as_ref()
                .map(|token| redact_token(token.expose_secret()))
                .unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key: "session.employee_id",
            env_keys: &["PMFLOW_SESSION_EMPLOYEE_ID"],
            value: display_id(config.session.employee_id),
        },
        Field {
            key: "session.org_unit_id",
            env_keys: &["PMFLOW_SESSION_ORG_UNIT_ID"],
            value: display_id(config.session.org_unit_id),
        },
        Field {
            key: "session.roles",
            env_keys: &["PMFLOW_SESSION_ROLES"],
            value: format!("[{}]", config.session.roles.join(", ")),
        },
        Field {
            key: "logging.level",
            env_keys: &["PMFLOW_LOGGING_LEVEL", "PMFLOW_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_keys: &["PMFLOW_LOGGING_FORMAT", "PMFLOW_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in &fields {
        let source =
            field_source(field, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn display_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "<unset>".to_string())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &Field<'_>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, field.key) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the last four characters of long tokens so operators can tell them apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }

    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}
