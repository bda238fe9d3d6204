use pmflow_client::{HttpGateway, WorkflowCommands, WorkflowError};
use pmflow_core::authz::{AuthorizationEngine, AuthorizationInput, LookupCache};
use pmflow_core::domain::submission::SubmissionId;
use pmflow_core::errors::ApplicationError;
use pmflow_core::workflow::SubmissionAction;
use tracing::warn;
use uuid::Uuid;

use crate::commands::{connect, CommandResult};

pub fn run(submission_id: i64, action: &str, comment: Option<String>) -> CommandResult {
    let action = match action.parse::<SubmissionAction>() {
        Ok(action) => action,
        Err(error) => return CommandResult::failure("act", "invalid_action", error.to_string(), 5),
    };
    let context = match connect("act") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let id = SubmissionId(submission_id);
    let user = context.config.session.current_user();
    let gateway = HttpGateway::new(context.services.clone());
    let commands = WorkflowCommands::new(context.services.submissions.clone());

    let result = context.runtime.block_on(async {
        let submission = context.services.submissions.get(id).await?;
        let evidence = context.services.evidence.list(id).await?;

        let cache = LookupCache::new();
        let input = AuthorizationInput {
            submission: &submission,
            user: &user,
            evidence_count: evidence.len(),
        };
        let auth = AuthorizationEngine::new().derive(input, &gateway, &cache).await;
        let updated = commands.perform(&submission, &auth, action, comment).await?;
        Ok::<_, WorkflowError>((submission, updated))
    });

    match result {
        Ok((before, after)) => CommandResult::success(
            "act",
            format!(
                "{action} applied to submission {id}: {} -> {}",
                before.status, after.status
            ),
        ),
        Err(error) => {
            let correlation_id = Uuid::new_v4().to_string();
            warn!(
                event_name = "cli.act.failed",
                correlation_id = %correlation_id,
                submission_id,
                action = %action,
                error_class = error.error_class(),
                error = %error,
                "workflow action failed"
            );
            let interface = ApplicationError::from(error).into_interface(correlation_id);
            CommandResult::interface_failure("act", &interface)
        }
    }
}
