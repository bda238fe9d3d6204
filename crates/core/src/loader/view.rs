use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::authz::AuthorizationStatus;
use crate::domain::evidence::Evidence;
use crate::domain::kpi::{KpiActual, KpiDefinition, KpiId, KpiTarget, PerspectiveId, SubmissionEntry};
use crate::domain::submission::{EntryId, Submission, SubmissionId};

/// Denormalized table row, one per submission entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRow {
    pub entry_id: EntryId,
    pub kpi_id: KpiId,
    pub kpi_code: String,
    pub kpi_name: String,
    pub kpi_unit: Option<String>,
    pub perspective_id: Option<PerspectiveId>,
    pub weight: Decimal,
    pub monthly_targets: [Decimal; 12],
    pub month: Option<u8>,
    pub target_value: Decimal,
    pub actual_value: Decimal,
    pub achievement_pct: Decimal,
    pub problem_identification: Option<String>,
    pub corrective_action: Option<String>,
    /// Set when the KPI definition could not be fetched and defaults were used.
    pub definition_missing: bool,
}

impl EntryRow {
    pub fn assemble(
        entry: &SubmissionEntry,
        definition: Option<KpiDefinition>,
        targets: &[KpiTarget],
        actual: Option<&KpiActual>,
        month: Option<u8>,
    ) -> Self {
        let definition_missing = definition.is_none();
        let definition = definition.unwrap_or_else(|| KpiDefinition::placeholder(entry.kpi_id));

        let mut monthly_targets = [Decimal::ZERO; 12];
        for target in targets {
            if let Some(slot) = month_index(target.target_month) {
                monthly_targets[slot] = target.target_value;
            }
        }

        let target_value = month.and_then(month_index).map(|slot| monthly_targets[slot]);
        let target_value = target_value.unwrap_or_else(|| monthly_targets.iter().copied().sum());
        let actual_value = actual.map(|actual| actual.actual_value).unwrap_or(Decimal::ZERO);

        Self {
            entry_id: entry.entry_id,
            kpi_id: entry.kpi_id,
            kpi_code: definition.kpi_code,
            kpi_name: definition.kpi_name,
            kpi_unit: definition.kpi_unit,
            perspective_id: definition.kpi_perspective_id,
            weight: entry.entry_weight.unwrap_or(Decimal::ZERO),
            monthly_targets,
            month,
            target_value,
            actual_value,
            achievement_pct: achievement_pct(actual_value, target_value),
            problem_identification: actual
                .and_then(|actual| actual.actual_problem_identification.clone()),
            corrective_action: actual.and_then(|actual| actual.actual_corrective_action.clone()),
            definition_missing,
        }
    }
}

fn month_index(month: u8) -> Option<usize> {
    (1..=12).contains(&month).then(|| usize::from(month - 1))
}

/// `actual / target * 100` rounded to two places; zero when there is no target.
pub fn achievement_pct(actual: Decimal, target: Decimal) -> Decimal {
    if target.is_zero() {
        return Decimal::ZERO;
    }
    (actual / target * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Picks the actual recorded for `submission_id`, falling back to one not tied to any
/// submission. Actuals owned by another submission are never shown.
pub fn select_actual(actuals: &[KpiActual], submission_id: SubmissionId) -> Option<&KpiActual> {
    actuals
        .iter()
        .find(|actual| actual.submission_id == Some(submission_id))
        .or_else(|| actuals.iter().find(|actual| actual.submission_id.is_none()))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub submission: Submission,
    pub rows: Vec<EntryRow>,
    pub evidence: Vec<Evidence>,
    pub auth: AuthorizationStatus,
    pub correlation_id: String,
}

impl SubmissionView {
    pub fn total_weight(&self) -> Decimal {
        self.rows.iter().map(|row| row.weight).sum()
    }
}

/// What a page renders: a loading flag, an error message, or data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<SubmissionView>,
    pub auth_status: AuthorizationStatus,
    /// Correlation id of the load that produced this state.
    pub correlation_id: Option<String>,
}

impl LoadState {
    /// Loaded successfully but the user may not see the submission.
    pub fn permission_denied(&self) -> bool {
        !self.loading && self.data.is_some() && !self.auth_status.can_view
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::kpi::{KpiActual, KpiId, KpiTarget, SubmissionEntry};
    use crate::domain::submission::{EntryId, SubmissionId};

    use super::{achievement_pct, select_actual, EntryRow};

    fn entry() -> SubmissionEntry {
        SubmissionEntry {
            entry_id: EntryId(1),
            submission_id: SubmissionId(100),
            kpi_id: KpiId(42),
            entry_weight: None,
        }
    }

    fn target(month: u8, value: i64) -> KpiTarget {
        KpiTarget { target_id: i64::from(month), entry_id: EntryId(1), target_month: month, target_value: Decimal::from(value) }
    }

    fn actual(submission: Option<i64>, value: i64) -> KpiActual {
        KpiActual {
            actual_id: value,
            kpi_id: KpiId(42),
            submission_id: submission.map(SubmissionId),
            actual_month: 3,
            actual_value: Decimal::from(value),
            actual_problem_identification: None,
            actual_corrective_action: None,
        }
    }

    #[test]
    fn missing_definition_and_values_back_fill_with_zeros() {
        let row = EntryRow::assemble(&entry(), None, &[], None, Some(3));

        assert!(row.definition_missing);
        assert_eq!(row.kpi_id, KpiId(42));
        assert_eq!(row.kpi_name, "");
        assert_eq!(row.weight, Decimal::ZERO);
        assert_eq!(row.monthly_targets, [Decimal::ZERO; 12]);
        assert_eq!(row.actual_value, Decimal::ZERO);
        assert_eq!(row.achievement_pct, Decimal::ZERO);
    }

    #[test]
    fn targets_land_in_their_month_and_out_of_range_months_are_ignored() {
        let targets = vec![target(1, 10), target(12, 30), target(13, 99)];
        let row = EntryRow::assemble(&entry(), None, &targets, None, None);

        assert_eq!(row.monthly_targets[0], Decimal::from(10));
        assert_eq!(row.monthly_targets[11], Decimal::from(30));
        assert_eq!(row.target_value, Decimal::from(40), "no month selects the annual total");
    }

    #[test]
    fn achievement_is_rounded_percentage() {
        assert_eq!(achievement_pct(Decimal::from(1), Decimal::from(3)), Decimal::new(3333, 2));
        assert_eq!(achievement_pct(Decimal::from(5), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn actual_for_this_submission_is_preferred() {
        let actuals = vec![actual(Some(7), 1), actual(Some(100), 2)];
        assert_eq!(select_actual(&actuals, SubmissionId(100)).map(|a| a.actual_id), Some(2));
        assert!(select_actual(&actuals, SubmissionId(55)).is_none());
        assert!(select_actual(&[], SubmissionId(1)).is_none());
    }

    #[test]
    fn unowned_actual_is_used_when_none_belongs_to_the_submission() {
        let actuals = vec![actual(Some(7), 1), actual(None, 2)];
        assert_eq!(select_actual(&actuals, SubmissionId(100)).map(|a| a.actual_id), Some(2));
    }

    #[test]
    fn another_submissions_actual_back_fills_with_zero() {
        let foreign = vec![actual(Some(7), 77)];
        let chosen = select_actual(&foreign, SubmissionId(100));
        let row = EntryRow::assemble(&entry(), None, &[], chosen, Some(3));

        assert_eq!(row.actual_value, Decimal::ZERO);
        assert!(row.problem_identification.is_none());
    }
}
