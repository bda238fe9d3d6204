use std::sync::Arc;

use pmflow_client::{HttpGateway, Notice};
use pmflow_core::domain::submission::SubmissionId;
use pmflow_core::errors::ApplicationError;
use pmflow_core::loader::{LoadRequest, SubmissionSession, SubmissionView};
use pmflow_core::workflow::{available_actions, SubmissionAction};
use serde::Serialize;

use crate::commands::{connect, CommandResult};

#[derive(Debug, Serialize)]
struct LoadReport {
    #[serde(flatten)]
    view: SubmissionView,
    available_actions: Vec<SubmissionAction>,
    notices: Vec<Notice>,
}

pub fn run(submission_id: i64, month: Option<u8>) -> CommandResult {
    let context = match connect("load") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let request = LoadRequest { submission_id: SubmissionId(submission_id), month };
    let gateway = Arc::new(HttpGateway::new(context.services.clone()));
    let session = SubmissionSession::new(gateway, context.config.session.current_user());

    match context.runtime.block_on(session.load(request)) {
        Ok(view) => {
            let report = LoadReport {
                available_actions: available_actions(view.submission.status, &view.auth),
                view,
                notices: context.notices(),
            };
            CommandResult::data("load", &report)
        }
        Err(error) => {
            let correlation_id = session.state().correlation_id.unwrap_or_default();
            let interface = ApplicationError::from(error).into_interface(correlation_id);
            CommandResult::interface_failure("load", &interface)
        }
    }
}
