use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::submission::SubmissionId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub evidence_id: i64,
    pub submission_id: SubmissionId,
    pub evidence_file_name: String,
    #[serde(default)]
    pub evidence_description: Option<String>,
    #[serde(default)]
    pub evidence_file_path: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}
