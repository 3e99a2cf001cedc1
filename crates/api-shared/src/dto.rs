//! Request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogRes {
    pub scope_type: String,
    pub options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolveReq {
    pub scope_type: String,
    pub input: String,
}

/// `tag` is `null` when the input was blank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolveRes {
    pub tag: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateRuleSetReq {
    pub name: String,
    /// One of `clear_contracts`, `analyze`, `mrf_search`.
    pub product: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RuleSetSummary {
    pub id: String,
    pub name: String,
    pub product: String,
    pub role: Option<String>,
    /// True when there are unsaved changes.
    pub dirty: bool,
    /// RFC 3339 timestamp of the last save.
    pub saved_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListRuleSetsRes {
    pub rule_sets: Vec<RuleSetSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScopeView {
    pub id: u64,
    pub scope_type: String,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConditionView {
    pub id: u64,
    pub scopes: Vec<ScopeView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SectionView {
    pub key: String,
    pub label: String,
    pub conditions: Vec<ConditionView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RuleSetRes {
    pub summary: RuleSetSummary,
    /// Working copy of every section.
    pub sections: Vec<SectionView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SetRoleReq {
    /// One of `viewer`, `editor`, `admin`; `null` revokes the role.
    pub role: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddScopeReq {
    /// Condition to append to. When absent, all conditions of the section are replaced by a
    /// single new condition holding the new scope.
    #[serde(default)]
    pub condition_id: Option<u64>,
    pub scope_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddScopeRes {
    pub condition_id: u64,
    pub scope_id: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddConditionRes {
    pub condition_id: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddTagsReq {
    /// One or more comma-separated values.
    pub input: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddTagsRes {
    /// Tags actually appended, after resolution and de-duplication.
    pub added: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemoveTagRes {
    pub removed: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_scope_condition_id_is_optional() {
        let req: AddScopeReq = serde_json::from_str(r#"{"scope_type":"States"}"#).unwrap();
        assert_eq!(req.condition_id, None);

        let req: AddScopeReq =
            serde_json::from_str(r#"{"condition_id":4,"scope_type":"States"}"#).unwrap();
        assert_eq!(req.condition_id, Some(4));
    }
}
