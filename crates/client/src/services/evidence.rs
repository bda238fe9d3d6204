use pmflow_core::domain::evidence::Evidence;
use pmflow_core::domain::submission::SubmissionId;
use reqwest::multipart::{Form, Part};

use crate::error::ApiError;
use crate::http::ApiClient;

/// A file to attach as supporting evidence.
#[derive(Clone, Debug)]
pub struct EvidenceUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
}

impl EvidenceUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes, description: None }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|text| !text.trim().is_empty());
        self
    }

    fn into_form(self) -> Form {
        let form = Form::new().part("file", Part::bytes(self.bytes).file_name(self.file_name));
        match self.description {
            Some(description) => form.text("description", description),
            None => form,
        }
    }
}

#[derive(Clone)]
pub struct EvidenceService {
    api: ApiClient,
}

impl EvidenceService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, submission_id: SubmissionId) -> Result<Vec<Evidence>, ApiError> {
        self.api.get(&format!("/submissions/{submission_id}/evidence")).await
    }

    pub async fn upload(
        &self,
        submission_id: SubmissionId,
        upload: EvidenceUpload,
    ) -> Result<Evidence, ApiError> {
        let evidence: Evidence = self
            .api
            .post_multipart(&format!("/submissions/{submission_id}/evidence"), upload.into_form())
            .await?;
        self.api.notify_success(format!("Uploaded {}", evidence.evidence_file_name));
        Ok(evidence)
    }
}
