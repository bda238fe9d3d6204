//! Permission derivation for a submission snapshot.
//!
//! Flags only ever accumulate: every rule produces a partial
//! [`AuthorizationStatus`] that is OR-merged into the running result, so a
//! later rule can never revoke what an earlier one granted.

use std::ops::BitOrAssign;

use serde::{Deserialize, Serialize};

pub mod cache;
pub mod engine;
pub mod rules;

pub use cache::LookupCache;
pub use engine::{AuthorizationEngine, AuthorizationInput, Superseded};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorizationStatus {
    pub is_owner: bool,
    pub is_supervisor: bool,
    pub is_org_head: bool,
    pub is_org_unit_manager: bool,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_submit: bool,
    pub can_submit_evidence: bool,
    pub can_approve: bool,
    pub can_reject: bool,
    pub can_validate: bool,
    pub can_admin_reject: bool,
    pub can_revert_to_draft: bool,
}

impl AuthorizationStatus {
    pub fn merge(&mut self, other: AuthorizationStatus) {
        self.is_owner |= other.is_owner;
        self.is_supervisor |= other.is_supervisor;
        self.is_org_head |= other.is_org_head;
        self.is_org_unit_manager |= other.is_org_unit_manager;
        self.can_view |= other.can_view;
        self.can_edit |= other.can_edit;
        self.can_submit |= other.can_submit;
        self.can_submit_evidence |= other.can_submit_evidence;
        self.can_approve |= other.can_approve;
        self.can_reject |= other.can_reject;
        self.can_validate |= other.can_validate;
        self.can_admin_reject |= other.can_admin_reject;
        self.can_revert_to_draft |= other.can_revert_to_draft;
    }

    /// Names of the flags that are set, in declaration order.
    pub fn granted(&self) -> Vec<&'static str> {
        [
            ("is_owner", self.is_owner),
            ("is_supervisor", self.is_supervisor),
            ("is_org_head", self.is_org_head),
            ("is_org_unit_manager", self.is_org_unit_manager),
            ("can_view", self.can_view),
            ("can_edit", self.can_edit),
            ("can_submit", self.can_submit),
            ("can_submit_evidence", self.can_submit_evidence),
            ("can_approve", self.can_approve),
            ("can_reject", self.can_reject),
            ("can_validate", self.can_validate),
            ("can_admin_reject", self.can_admin_reject),
            ("can_revert_to_draft", self.can_revert_to_draft),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// True when `self` grants everything `other` grants.
    pub fn covers(&self, other: &AuthorizationStatus) -> bool {
        let mut merged = *self;
        merged.merge(*other);
        merged == *self
    }
}

impl BitOrAssign for AuthorizationStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.merge(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::AuthorizationStatus;

    #[test]
    fn merge_never_clears_a_flag() {
        let mut status = AuthorizationStatus { can_view: true, can_edit: true, ..Default::default() };
        status |= AuthorizationStatus::default();

        assert!(status.can_view);
        assert!(status.can_edit);
    }

    #[test]
    fn granted_lists_set_flags_only() {
        let status = AuthorizationStatus { is_owner: true, can_view: true, ..Default::default() };
        assert_eq!(status.granted(), vec!["is_owner", "can_view"]);
        assert!(AuthorizationStatus::default().granted().is_empty());
    }

    #[test]
    fn covers_detects_missing_grants() {
        let wide = AuthorizationStatus { can_view: true, can_approve: true, ..Default::default() };
        let narrow = AuthorizationStatus { can_view: true, ..Default::default() };

        assert!(wide.covers(&narrow));
        assert!(!narrow.covers(&wide));
    }
}
