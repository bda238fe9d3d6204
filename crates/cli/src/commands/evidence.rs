use std::path::Path;

use pmflow_client::services::EvidenceUpload;
use pmflow_core::domain::submission::SubmissionId;

use crate::commands::{connect, CommandResult};

pub fn list(submission_id: i64) -> CommandResult {
    let context = match connect("evidence.list") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    match context.runtime.block_on(context.services.evidence.list(SubmissionId(submission_id))) {
        Ok(evidence) => CommandResult::data("evidence.list", &evidence),
        Err(error) => CommandResult::api_failure("evidence.list", &error),
    }
}

pub fn upload(submission_id: i64, path: &Path, description: Option<String>) -> CommandResult {
    let Some(file_name) = path.file_name().map(|name| name.to_string_lossy().into_owned()) else {
        return CommandResult::failure(
            "evidence.upload",
            "invalid_path",
            format!("`{}` does not name a file", path.display()),
            5,
        );
    };
    let context = match connect("evidence.upload") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let bytes = match context.runtime.block_on(tokio::fs::read(path)) {
        Ok(bytes) => bytes,
        Err(error) => {
            return CommandResult::failure(
                "evidence.upload",
                "io",
                format!("could not read `{}`: {error}", path.display()),
                7,
            );
        }
    };

    let upload = EvidenceUpload::new(file_name, bytes).with_description(description);
    let id = SubmissionId(submission_id);
    match context.runtime.block_on(context.services.evidence.upload(id, upload)) {
        Ok(evidence) => CommandResult::success(
            "evidence.upload",
            format!(
                "uploaded `{}` to submission {id} as evidence {}",
                evidence.evidence_file_name, evidence.evidence_id
            ),
        ),
        Err(error) => CommandResult::api_failure("evidence.upload", &error),
    }
}
