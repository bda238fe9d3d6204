use pmflow_client::{ApiError, HttpGateway, Notice};
use pmflow_core::authz::{AuthorizationEngine, AuthorizationInput, AuthorizationStatus, LookupCache};
use pmflow_core::domain::organization::CurrentUser;
use pmflow_core::domain::submission::{Submission, SubmissionId};
use pmflow_core::workflow::{available_actions, SubmissionAction};
use serde::Serialize;

use crate::commands::{connect, CommandResult};

#[derive(Debug, Serialize)]
struct AuthorizationReport {
    submission: Submission,
    user: CurrentUser,
    evidence_count: usize,
    auth: AuthorizationStatus,
    granted: Vec<&'static str>,
    available_actions: Vec<SubmissionAction>,
    notices: Vec<Notice>,
}

pub fn run(submission_id: i64) -> CommandResult {
    let context = match connect("authorize") {
        Ok(context) => context,
        Err(failure) => return failure,
    };
    let id = SubmissionId(submission_id);
    let user = context.config.session.current_user();
    let gateway = HttpGateway::new(context.services.clone());

    let result = context.runtime.block_on(async {
        let submission = context.services.submissions.get(id).await?;
        let evidence = context.services.evidence.list(id).await?;

        let cache = LookupCache::new();
        cache.scope_to(id).await;
        let input = AuthorizationInput {
            submission: &submission,
            user: &user,
            evidence_count: evidence.len(),
        };
        let auth = AuthorizationEngine::new().derive(input, &gateway, &cache).await;
        Ok::<_, ApiError>((submission, evidence.len(), auth))
    });

    match result {
        Ok((submission, evidence_count, auth)) => {
            let report = AuthorizationReport {
                available_actions: available_actions(submission.status, &auth),
                granted: auth.granted(),
                submission,
                user,
                evidence_count,
                auth,
                notices: context.notices(),
            };
            CommandResult::data("authorize", &report)
        }
        Err(error) => CommandResult::api_failure("authorize", &error),
    }
}
