use pmflow_core::domain::approval::{Approval, ApprovalDecision, ApprovalId};
use pmflow_core::domain::submission::SubmissionId;

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone)]
pub struct ApprovalService {
    api: ApiClient,
}

impl ApprovalService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Approval chain ordered as the API returns it (by level).
    pub async fn for_submission(&self, submission_id: SubmissionId) -> Result<Vec<Approval>, ApiError> {
        self.api.get(&format!("/approvals/submission/{submission_id}")).await
    }

    pub async fn decide(
        &self,
        approval_id: ApprovalId,
        decision: &ApprovalDecision,
    ) -> Result<Approval, ApiError> {
        let approval: Approval =
            self.api.patch(&format!("/approvals/{}/status", approval_id.0), decision).await?;
        self.api.notify_success("Approval recorded");
        Ok(approval)
    }
}
