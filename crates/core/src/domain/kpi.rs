use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::submission::{EntryId, SubmissionId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiId(pub i64);

impl fmt::Display for KpiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerspectiveId(pub i64);

/// One KPI line of a submission (`GET /submissions/entries/:id`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub entry_id: EntryId,
    pub submission_id: SubmissionId,
    pub kpi_id: KpiId,
    #[serde(default)]
    pub entry_weight: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub kpi_id: KpiId,
    #[serde(default)]
    pub kpi_code: String,
    #[serde(default)]
    pub kpi_name: String,
    #[serde(default)]
    pub kpi_unit: Option<String>,
    #[serde(default)]
    pub kpi_perspective_id: Option<PerspectiveId>,
    #[serde(default)]
    pub kpi_description: Option<String>,
}

impl KpiDefinition {
    /// Stand-in used when the definition could not be fetched.
    pub fn placeholder(kpi_id: KpiId) -> Self {
        Self {
            kpi_id,
            kpi_code: String::new(),
            kpi_name: String::new(),
            kpi_unit: None,
            kpi_perspective_id: None,
            kpi_description: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTarget {
    pub target_id: i64,
    pub entry_id: EntryId,
    pub target_month: u8,
    pub target_value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTargetUpdate {
    pub entry_id: EntryId,
    pub target_month: u8,
    pub target_value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiActual {
    pub actual_id: i64,
    pub kpi_id: KpiId,
    #[serde(default)]
    pub submission_id: Option<SubmissionId>,
    pub actual_month: u8,
    pub actual_value: Decimal,
    #[serde(default)]
    pub actual_problem_identification: Option<String>,
    #[serde(default)]
    pub actual_corrective_action: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiActualUpdate {
    pub kpi_id: KpiId,
    pub submission_id: SubmissionId,
    pub actual_month: u8,
    pub actual_value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_problem_identification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_corrective_action: Option<String>,
}

/// Balanced Scorecard perspective (financial, customer, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiPerspective {
    pub perspective_id: PerspectiveId,
    pub perspective_name: String,
    #[serde(default)]
    pub perspective_description: Option<String>,
}
