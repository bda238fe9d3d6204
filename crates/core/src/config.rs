use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::organization::{CurrentUser, EmployeeId, OrgUnitId, RoleCode};

pub const DEFAULT_CONFIG_FILE: &str = "pmflow.toml";
pub const NESTED_CONFIG_FILE: &str = "config/pmflow.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<SecretString>,
    pub timeout_secs: u64,
}

/// Identity of the operator the CLI acts for. Token issuance is handled elsewhere.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub employee_id: Option<i64>,
    pub org_unit_id: Option<i64>,
    pub roles: Vec<String>,
}

impl SessionConfig {
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            employee_id: self.employee_id.map(EmployeeId),
            org_unit_id: self.org_unit_id.map(OrgUnitId),
            roles: self.roles.iter().map(RoleCode::new).collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub employee_id: Option<i64>,
    pub org_unit_id: Option<i64>,
    pub roles: Option<Vec<String>>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                token: None,
                timeout_secs: 30,
            },
            session: SessionConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(api) = patch.api {
            if let Some(base_url) = api.base_url {
                self.api.base_url = base_url;
            }
            if let Some(api_token_value) = api.token {
                self.api.token = Some(secret_value(api_token_value));
            }
            if let Some(timeout_secs) = api.timeout_secs {
                self.api.timeout_secs = timeout_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(employee_id) = session.employee_id {
                self.session.employee_id = Some(employee_id);
            }
            if let Some(org_unit_id) = session.org_unit_id {
                self.session.org_unit_id = Some(org_unit_id);
            }
            if let Some(roles) = session.roles {
                self.session.roles = roles;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PMFLOW_API_BASE_URL") {
            self.api.base_url = value;
        }
        if let Some(value) = read_env("PMFLOW_API_TOKEN") {
            self.api.token = Some(secret_value(value));
        }
        if let Some(value) = read_env("PMFLOW_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_u64("PMFLOW_API_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PMFLOW_SESSION_EMPLOYEE_ID") {
            self.session.employee_id = Some(parse_i64("PMFLOW_SESSION_EMPLOYEE_ID", &value)?);
        }
        if let Some(value) = read_env("PMFLOW_SESSION_ORG_UNIT_ID") {
            self.session.org_unit_id = Some(parse_i64("PMFLOW_SESSION_ORG_UNIT_ID", &value)?);
        }
        if let Some(value) = read_env("PMFLOW_SESSION_ROLES") {
            self.session.roles = parse_roles(&value);
        }

        let log_level = read_env("PMFLOW_LOGGING_LEVEL").or_else(|| read_env("PMFLOW_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PMFLOW_LOGGING_FORMAT").or_else(|| read_env("PMFLOW_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_base_url) = overrides.api_base_url {
            self.api.base_url = api_base_url;
        }
        if let Some(api_token) = overrides.api_token {
            self.api.token = Some(secret_value(api_token));
        }
        if let Some(employee_id) = overrides.employee_id {
            self.session.employee_id = Some(employee_id);
        }
        if let Some(org_unit_id) = overrides.org_unit_id {
            self.session.org_unit_id = Some(org_unit_id);
        }
        if let Some(roles) = overrides.roles {
            self.session.roles = roles;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_api(&self.api)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    let base_url = api.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "api.base_url must start with http:// or https://".to_string(),
        ));
    }

    if api.timeout_secs == 0 || api.timeout_secs > 300 {
        return Err(ConfigError::Validation("api.timeout_secs must be in range 1..=300".to_string()));
    }

    if let Some(token) = &api.token {
        if token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "api.token is set but empty; remove it or provide the bearer token".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.employee_id.is_some_and(|id| id <= 0) {
        return Err(ConfigError::Validation(
            "session.employee_id must be a positive id".to_string(),
        ));
    }
    if session.org_unit_id.is_some_and(|id| id <= 0) {
        return Err(ConfigError::Validation(
            "session.org_unit_id must be a positive id".to_string(),
        ));
    }
    if session.roles.iter().any(|role| role.trim().is_empty()) {
        return Err(ConfigError::Validation("session.roles must not contain blanks".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_roles(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    api: Option<ApiPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPatch {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    employee_id: Option<i64>,
    org_unit_id: Option<i64>,
    roles: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
