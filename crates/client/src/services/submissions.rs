use pmflow_core::domain::kpi::SubmissionEntry;
use pmflow_core::domain::submission::{
    Submission, SubmissionId, SubmissionRecord, SubmissionStatus,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::http::ApiClient;

/// Body of `PATCH /submissions/:id/status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub submission_status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_comments: Option<String>,
}

/// Body of the validate and admin-reject endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReviewNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_comments: Option<String>,
}

#[derive(Clone)]
pub struct SubmissionService {
    api: ApiClient,
}

impl SubmissionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, id: SubmissionId) -> Result<Submission, ApiError> {
        let record: SubmissionRecord = self.api.get(&format!("/submissions/{id}")).await?;
        self.into_submission(record)
    }

    pub async fn entries(&self, id: SubmissionId) -> Result<Vec<SubmissionEntry>, ApiError> {
        self.api.get(&format!("/submissions/entries/{id}")).await
    }

    pub async fn update_status(
        &self,
        id: SubmissionId,
        change: &StatusChange,
    ) -> Result<Submission, ApiError> {
        let record: SubmissionRecord =
            self.api.patch(&format!("/submissions/{id}/status"), change).await?;
        let submission = self.into_submission(record)?;
        self.api.notify_success(format!("Submission status updated to {}", submission.status));
        Ok(submission)
    }

    pub async fn validate(&self, id: SubmissionId, note: &ReviewNote) -> Result<Submission, ApiError> {
        let record: SubmissionRecord =
            self.api.post(&format!("/submissions/{id}/validate"), note).await?;
        let submission = self.into_submission(record)?;
        self.api.notify_success("Submission validated");
        Ok(submission)
    }

    pub async fn admin_reject(
        &self,
        id: SubmissionId,
        note: &ReviewNote,
    ) -> Result<Submission, ApiError> {
        let record: SubmissionRecord =
            self.api.post(&format!("/submissions/{id}/admin-reject"), note).await?;
        let submission = self.into_submission(record)?;
        self.api.notify_success("Submission rejected by admin");
        Ok(submission)
    }

    fn into_submission(&self, record: SubmissionRecord) -> Result<Submission, ApiError> {
        Submission::try_from(record)
            .map_err(|error| self.api.report(ApiError::Shape(error.to_string())))
    }
}
