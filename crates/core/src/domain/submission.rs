use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::organization::{EmployeeId, OrgUnitId};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub i64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    #[serde(rename = "Admin_Rejected")]
    AdminRejected,
    Validated,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::AdminRejected => "Admin_Rejected",
            Self::Validated => "Validated",
        }
    }

    /// Rejected by either the approver chain or an administrator.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected | Self::AdminRejected)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "admin_rejected" => Ok(Self::AdminRejected),
            "validated" => Ok(Self::Validated),
            other => Err(DomainError::InvariantViolation(format!(
                "unknown submission status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionKind {
    Target,
    Actual,
}

/// Who a submission belongs to. Individual scorecards are employee-owned,
/// MPM scorecards are owned by an organization unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SubmissionOwner {
    Employee(EmployeeId),
    OrgUnit(OrgUnitId),
}

impl SubmissionOwner {
    /// Builds the owner from the two optional wire fields. Exactly one must be set.
    pub fn from_parts(
        employee_id: Option<EmployeeId>,
        org_unit_id: Option<OrgUnitId>,
    ) -> Result<Self, DomainError> {
        match (employee_id, org_unit_id) {
            (Some(employee_id), None) => Ok(Self::Employee(employee_id)),
            (None, Some(org_unit_id)) => Ok(Self::OrgUnit(org_unit_id)),
            (Some(employee_id), Some(org_unit_id)) => Err(DomainError::OwnershipConflict {
                detail: format!(
                    "both employee {employee_id} and org unit {org_unit_id} are set"
                ),
            }),
            (None, None) => Err(DomainError::OwnershipConflict {
                detail: "neither employee_id nor org_unit_id is set".to_string(),
            }),
        }
    }

    pub fn employee_id(&self) -> Option<EmployeeId> {
        match self {
            Self::Employee(id) => Some(*id),
            Self::OrgUnit(_) => None,
        }
    }

    pub fn org_unit_id(&self) -> Option<OrgUnitId> {
        match self {
            Self::OrgUnit(id) => Some(*id),
            Self::Employee(_) => None,
        }
    }
}

/// Wire shape of `GET /submissions/:id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: SubmissionId,
    pub submission_type: SubmissionKind,
    #[serde(default)]
    pub submission_period_id: Option<i64>,
    #[serde(default)]
    pub submission_month: Option<u8>,
    pub submission_status: SubmissionStatus,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub org_unit_id: Option<OrgUnitId>,
    #[serde(default)]
    pub submission_comments: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub kind: SubmissionKind,
    pub period_id: Option<i64>,
    pub month: Option<u8>,
    pub status: SubmissionStatus,
    pub owner: SubmissionOwner,
    pub comments: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubmissionRecord> for Submission {
    type Error = DomainError;

    fn try_from(record: SubmissionRecord) -> Result<Self, Self::Error> {
        let owner = SubmissionOwner::from_parts(record.employee_id, record.org_unit_id)?;
        if let Some(month) = record.submission_month {
            if !(1..=12).contains(&month) {
                return Err(DomainError::InvariantViolation(format!(
                    "submission {} has month {month} outside 1..=12",
                    record.submission_id
                )));
            }
        }

        Ok(Self {
            id: record.submission_id,
            kind: record.submission_type,
            period_id: record.submission_period_id,
            month: record.submission_month,
            status: record.submission_status,
            owner,
            comments: record.submission_comments,
            submitted_at: record.submitted_at,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::organization::{EmployeeId, OrgUnitId};
    use crate::domain::submission::{
        Submission, SubmissionId, SubmissionKind, SubmissionOwner, SubmissionRecord,
        SubmissionStatus,
    };
    use crate::errors::DomainError;

    fn record(employee_id: Option<i64>, org_unit_id: Option<i64>) -> SubmissionRecord {
        SubmissionRecord {
            submission_id: SubmissionId(7),
            submission_type: SubmissionKind::Target,
            submission_period_id: Some(2025),
            submission_month: None,
            submission_status: SubmissionStatus::Draft,
            employee_id: employee_id.map(EmployeeId),
            org_unit_id: org_unit_id.map(OrgUnitId),
            submission_comments: None,
            submitted_at: None,
        }
    }

    #[test]
    fn admin_rejected_uses_wire_spelling() {
        let json = serde_json::to_string(&SubmissionStatus::AdminRejected).expect("serialize");
        assert_eq!(json, "\"Admin_Rejected\"");

        let parsed: SubmissionStatus = serde_json::from_str("\"Admin_Rejected\"").expect("parse");
        assert_eq!(parsed, SubmissionStatus::AdminRejected);
    }

    #[test]
    fn status_parses_from_cli_spelling() {
        assert_eq!("admin-rejected".parse::<SubmissionStatus>(), Ok(SubmissionStatus::AdminRejected));
        assert!("archived".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn employee_owned_record_converts() {
        let submission = Submission::try_from(record(Some(5), None)).expect("valid record");
        assert_eq!(submission.owner, SubmissionOwner::Employee(EmployeeId(5)));
    }

    #[test]
    fn record_with_both_owners_is_rejected() {
        let error = Submission::try_from(record(Some(5), Some(10))).expect_err("conflict");
        assert!(matches!(error, DomainError::OwnershipConflict { .. }));
    }

    #[test]
    fn record_without_owner_is_rejected() {
        let error = Submission::try_from(record(None, None)).expect_err("no owner");
        assert!(matches!(error, DomainError::OwnershipConflict { .. }));
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let mut raw = record(None, Some(10));
        raw.submission_month = Some(13);
        assert!(Submission::try_from(raw).is_err());
    }
}
