// vetter-core/src/domain/rules/compiled.rs
//
// Executable form of the check definitions. Every field is already resolved
// to a slot, every sign string already parsed.

use crate::domain::metadata::{MatterId, MetaId};
use crate::domain::record::{DataFormat, FieldSlot};
use crate::domain::rules::raw::CheckKind;
use crate::domain::rules::sign::{Polarity, Sign, matches_any};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    pub matter_id: MatterId,
    pub name: String,
    pub slot: FieldSlot,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: FieldRef,
    pub polarity: Polarity,
    pub signs: Vec<Sign>,
}

impl Condition {
    pub fn admits(&self, value: &str) -> bool {
        self.polarity.admits(matches_any(&self.signs, value))
    }

    pub fn is_reference_off_code(&self) -> bool {
        self.signs.iter().any(|s| matches!(s, Sign::ReferenceOffCode))
    }

    /// Alternatives compared literally before the membership test is reached.
    pub fn leading_signs(&self) -> &[Sign] {
        let end = self
            .signs
            .iter()
            .position(|s| matches!(s, Sign::ReferenceOffCode))
            .unwrap_or(self.signs.len());
        &self.signs[..end]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    pub target: FieldRef,
    pub reference: FieldRef,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplacementSource {
    Constant(String),
    FromReference(FieldRef),
    FromTarget(FieldRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub target: FieldRef,
    pub source: ReplacementSource,
}

impl Replacement {
    /// An empty constant means "no replacement" for normal checks.
    pub fn is_blank(&self) -> bool {
        matches!(&self.source, ReplacementSource::Constant(text) if text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub primary: Condition,
    /// Reference key slot tested for membership when the primary condition is the reference off-code.
    pub membership_key: Option<FieldSlot>,
    /// Further target-record conditions, all of which must hold.
    pub items: Vec<Condition>,
    pub reference_conditions: Vec<Condition>,
    pub replacements: Vec<Replacement>,
    pub error_flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub number: u32,
    pub summary: String,
    pub kind: CheckKind,
    pub reference_meta_id: Option<MetaId>,
    pub key_pairs: Vec<KeyPair>,
    pub details: Vec<Detail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRules {
    pub definition_id: i64,
    pub target_meta_id: MetaId,
    pub target_format: DataFormat,
    /// Delimiter of unquoted delimited targets. Replacement values holding it
    /// would split the field on write.
    pub unquoted_delimiter: Option<char>,
    pub rules: Vec<CompiledRule>,
}

impl CompiledRules {
    /// Reference metadata ids in first-use order, without duplicates.
    pub fn reference_meta_ids(&self) -> Vec<MetaId> {
        let mut ids = Vec::new();
        for id in self.rules.iter().filter_map(|r| r.reference_meta_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}
