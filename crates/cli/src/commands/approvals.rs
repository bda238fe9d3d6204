use pmflow_core::domain::submission::SubmissionId;

use crate::commands::{connect, CommandResult};

pub fn run(submission_id: i64) -> CommandResult {
    let context = match connect("approvals") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let id = SubmissionId(submission_id);
    match context.runtime.block_on(context.services.approvals.for_submission(id)) {
        Ok(mut approvals) => {
            approvals.sort_by_key(|approval| approval.approval_level);
            CommandResult::data("approvals", &approvals)
        }
        Err(error) => CommandResult::api_failure("approvals", &error),
    }
}
