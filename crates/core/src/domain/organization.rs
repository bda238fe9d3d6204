use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgUnitId(pub i64);

impl fmt::Display for OrgUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub employee_supervisor_id: Option<EmployeeId>,
    #[serde(default)]
    pub employee_org_unit_id: Option<OrgUnitId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUnit {
    pub org_unit_id: OrgUnitId,
    #[serde(default)]
    pub org_unit_name: String,
    #[serde(default)]
    pub org_unit_code: Option<String>,
    #[serde(default)]
    pub org_unit_parent_id: Option<OrgUnitId>,
    #[serde(default)]
    pub org_unit_head_id: Option<EmployeeId>,
}

/// Node of `GET /organization-units/hierarchy`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnitNode {
    #[serde(flatten)]
    pub unit: OrganizationUnit,
    #[serde(default)]
    pub children: Vec<OrgUnitNode>,
}

impl OrgUnitNode {
    pub fn find(&self, id: OrgUnitId) -> Option<&OrgUnitNode> {
        if self.unit.org_unit_id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Depth-first flattening, parents before children.
    pub fn flatten(&self) -> Vec<&OrganizationUnit> {
        let mut units = vec![&self.unit];
        for child in &self.children {
            units.extend(child.flatten());
        }
        units
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCode(pub String);

impl RoleCode {
    pub const ADMIN: &'static str = "admin";
    pub const DIRECTOR: &'static str = "director";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn matches(&self, code: &str) -> bool {
        self.0.trim().eq_ignore_ascii_case(code)
    }
}

/// The authenticated user on whose behalf permissions are derived.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub employee_id: Option<EmployeeId>,
    pub org_unit_id: Option<OrgUnitId>,
    #[serde(default)]
    pub roles: Vec<RoleCode>,
}

impl CurrentUser {
    pub fn new(employee_id: Option<EmployeeId>, org_unit_id: Option<OrgUnitId>) -> Self {
        Self { employee_id, org_unit_id, roles: Vec::new() }
    }

    pub fn with_role(mut self, code: impl Into<String>) -> Self {
        self.roles.push(RoleCode::new(code));
        self
    }

    pub fn has_role(&self, code: &str) -> bool {
        self.roles.iter().any(|role| role.matches(code))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleCode::ADMIN)
    }

    pub fn is_director(&self) -> bool {
        self.has_role(RoleCode::DIRECTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::{CurrentUser, EmployeeId, OrgUnitId, OrgUnitNode, OrganizationUnit};

    fn unit(id: i64, parent: Option<i64>) -> OrganizationUnit {
        OrganizationUnit {
            org_unit_id: OrgUnitId(id),
            org_unit_name: format!("Unit {id}"),
            org_unit_code: None,
            org_unit_parent_id: parent.map(OrgUnitId),
            org_unit_head_id: None,
        }
    }

    #[test]
    fn role_checks_ignore_case() {
        let user = CurrentUser::new(Some(EmployeeId(1)), None).with_role("Admin");
        assert!(user.is_admin());
        assert!(!user.is_director());
    }

    #[test]
    fn hierarchy_node_deserializes_flattened_unit() {
        let node: OrgUnitNode = serde_json::from_str(
            r#"{
                "org_unit_id": 1,
                "org_unit_name": "Head Office",
                "children": [
                    {"org_unit_id": 3, "org_unit_name": "Finance", "org_unit_parent_id": 1,
                     "children": [{"org_unit_id": 10, "org_unit_parent_id": 3}]}
                ]
            }"#,
        )
        .expect("hierarchy should parse");

        assert_eq!(node.find(OrgUnitId(10)).map(|n| n.unit.org_unit_parent_id), Some(Some(OrgUnitId(3))));
        let ids: Vec<i64> = node.flatten().iter().map(|u| u.org_unit_id.0).collect();
        assert_eq!(ids, vec![1, 3, 10]);
    }

    #[test]
    fn find_returns_none_for_unknown_unit() {
        let node = OrgUnitNode { unit: unit(1, None), children: vec![] };
        assert!(node.find(OrgUnitId(99)).is_none());
    }
}
