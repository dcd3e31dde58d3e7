// vetter-core/src/domain/rules/raw.rs
//
// Check definitions as the rule repository hands them over.

use serde::{Deserialize, Serialize};

use crate::domain::metadata::{MatterId, MetaId, scalar_text};
use crate::domain::rules::sign::Polarity;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Normal,
    Reference,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawDefinitionSet {
    pub id: i64,
    pub target_meta_id: MetaId,
    #[serde(default)]
    pub checks: Vec<RawCheck>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawCheck {
    pub number: u32,
    #[serde(default)]
    pub summary: String,
    pub kind: CheckKind,
    #[serde(default)]
    pub reference_meta_id: Option<MetaId>,
    #[serde(default)]
    pub key_pairs: Vec<RawKeyPair>,
    #[serde(default)]
    pub details: Vec<RawDetail>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKeyPair {
    pub target_item: MatterId,
    pub reference_item: MatterId,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct RawDetail {
    /// Target-record conditions. The first active one is the primary condition.
    #[serde(default)]
    pub conditions: Vec<RawCondition>,
    #[serde(default)]
    pub item_conditions: Vec<RawCondition>,
    #[serde(default)]
    pub reference_conditions: Vec<RawCondition>,
    #[serde(default)]
    pub replacements: Vec<RawReplacement>,
    #[serde(default)]
    pub error_flag: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawCondition {
    pub item: MatterId,
    /// A condition without comparison is inactive.
    #[serde(default)]
    pub comparison: Option<Polarity>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub sign: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RawSourceKind {
    Constant,
    Reference,
    Target,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawReplacement {
    pub item: MatterId,
    pub source: RawSourceKind,
    /// Constant text, or the source field identifier for `reference` / `target`.
    #[serde(default, deserialize_with = "scalar_text")]
    pub value: String,
}
