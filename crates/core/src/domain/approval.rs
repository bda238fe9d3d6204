use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::organization::EmployeeId;
use crate::domain::submission::SubmissionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// One level of the approval chain recorded for a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub approval_id: ApprovalId,
    pub submission_id: SubmissionId,
    pub approval_level: u8,
    pub approver_id: EmployeeId,
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub approval_comments: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub approval_status: ApprovalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_comments: Option<String>,
}
