use std::sync::Arc;

use pmflow_client::{ApiClient, ApiClientConfig, TracingNotifier};
use pmflow_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_session_identity(&config));
            checks.push(check_api_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "session_identity",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "api_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_session_identity(config: &AppConfig) -> DoctorCheck {
    let user = config.session.current_user();
    if user.employee_id.is_none() && user.org_unit_id.is_none() {
        return DoctorCheck {
            name: "session_identity",
            status: CheckStatus::Fail,
            details: "set session.employee_id or session.org_unit_id; without either only role grants apply"
                .to_string(),
        };
    }

    let describe = |id: Option<i64>| id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    DoctorCheck {
        name: "session_identity",
        status: CheckStatus::Pass,
        details: format!(
            "employee {} in org unit {} with roles [{}]",
            describe(config.session.employee_id),
            describe(config.session.org_unit_id),
            config.session.roles.join(", ")
        ),
    }
}

fn check_api_reachability(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "api_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = ApiClient::new(ApiClientConfig::from(&config.api), Arc::new(TracingNotifier))
        .map_err(|error| format!("failed to build http client: {error}"))
        .and_then(|client| {
            runtime.block_on(client.ping()).map_err(|error| format!("api unreachable: {error}"))
        });

    match result {
        Ok(status) if status < 500 => DoctorCheck {
            name: "api_reachability",
            status: CheckStatus::Pass,
            details: format!("`{}` answered with HTTP {status}", config.api.base_url),
        },
        Ok(status) => DoctorCheck {
            name: "api_reachability",
            status: CheckStatus::Fail,
            details: format!("`{}` answered with HTTP {status}", config.api.base_url),
        },
        Err(details) => DoctorCheck { name: "api_reachability", status: CheckStatus::Fail, details },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
