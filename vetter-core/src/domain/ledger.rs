// vetter-core/src/domain/ledger.rs

use serde::Serialize;
use std::fmt;

use crate::domain::rules::compiled::{CompiledRule, FieldRef};

/// Report column headers, in output order.
pub const REPORT_HEADERS: [&str; 9] = [
    "rule_number",
    "rule_summary",
    "row_number",
    "replaced_position",
    "replaced_name",
    "input_value",
    "replacement_value",
    "error_flag",
    "message",
];

/// One report row: a fired check, a per-check message, or the single abort entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViolationEntry {
    pub rule_number: Option<u32>,
    pub rule_summary: String,
    pub row_number: Option<usize>,
    pub replaced_position: Option<usize>,
    pub replaced_name: String,
    pub input_value: String,
    pub replacement_value: String,
    pub error_flag: String,
    pub message: String,
}

impl ViolationEntry {
    pub fn replacement(
        rule: &CompiledRule,
        row: usize,
        field: &FieldRef,
        input: String,
        replacement: String,
        error_flag: Option<&str>,
    ) -> Self {
        Self {
            rule_number: Some(rule.number),
            rule_summary: rule.summary.clone(),
            row_number: Some(row),
            replaced_position: Some(field.slot.position),
            replaced_name: field.name.clone(),
            input_value: input,
            replacement_value: replacement,
            error_flag: error_flag.unwrap_or_default().to_string(),
            message: String::new(),
        }
    }

    pub fn flag(rule: &CompiledRule, row: usize, error_flag: &str) -> Self {
        Self {
            rule_number: Some(rule.number),
            rule_summary: rule.summary.clone(),
            row_number: Some(row),
            error_flag: error_flag.to_string(),
            ..Default::default()
        }
    }

    pub fn message(rule: &CompiledRule, row: usize, message: impl Into<String>) -> Self {
        Self {
            rule_number: Some(rule.number),
            rule_summary: rule.summary.clone(),
            row_number: Some(row),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn abort(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn is_flagged(&self) -> bool {
        !self.error_flag.is_empty()
    }
}

/// Ordered report of one run. Append-only, except for [`ViolationLedger::abort`].
#[derive(Debug, Default, Clone)]
pub struct ViolationLedger {
    entries: Vec<ViolationEntry>,
    aborted: bool,
}

impl ViolationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ViolationEntry) {
        if !self.aborted {
            self.entries.push(entry);
        }
    }

    /// Drops every entry and keeps a single abort entry. Later appends are ignored.
    pub fn abort(&mut self, message: impl Into<String>) {
        self.entries.clear();
        self.entries.push(ViolationEntry::abort(message));
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn has_flagged(&self) -> bool {
        self.entries.iter().any(ViolationEntry::is_flagged)
    }

    pub fn entries(&self) -> &[ViolationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    CompletedWithViolations,
    Error,
}

impl RunStatus {
    /// An abort before the first full record is an error. An abort after it,
    /// or any flagged entry, completes with violations.
    pub fn assess(ledger: &ViolationLedger, rows_processed: usize) -> Self {
        if ledger.is_aborted() {
            if rows_processed == 0 {
                RunStatus::Error
            } else {
                RunStatus::CompletedWithViolations
            }
        } else if ledger.has_flagged() {
            RunStatus::CompletedWithViolations
        } else {
            RunStatus::Completed
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Completed => "completed",
            RunStatus::CompletedWithViolations => "completed with violations",
            RunStatus::Error => "error",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FieldSlot;
    use crate::domain::rules::raw::CheckKind;

    fn rule() -> CompiledRule {
        CompiledRule {
            number: 1,
            summary: "code".into(),
            kind: CheckKind::Normal,
            reference_meta_id: None,
            key_pairs: vec![],
            details: vec![],
        }
    }

    #[test]
    fn test_abort_replaces_all_entries() {
        let rule = rule();
        let mut ledger = ViolationLedger::new();
        ledger.append(ViolationEntry::flag(&rule, 1, "ERR1"));
        ledger.append(ViolationEntry::message(&rule, 2, "no matching reference record"));

        ledger.abort("X");
        ledger.append(ViolationEntry::flag(&rule, 3, "ERR1"));

        assert!(ledger.is_aborted());
        assert_eq!(ledger.entries(), &[ViolationEntry::abort("X")]);
        assert_eq!(ledger.entries()[0].rule_number, None);
    }

    #[test]
    fn test_status_assessment() {
        let rule = rule();
        let field = FieldRef {
            matter_id: 3,
            name: "code".into(),
            slot: FieldSlot::column(3),
            optional: false,
        };

        let mut ledger = ViolationLedger::new();
        assert_eq!(RunStatus::assess(&ledger, 10), RunStatus::Completed);

        ledger.append(ViolationEntry::replacement(&rule, 1, &field, "05".into(), "00".into(), None));
        assert_eq!(RunStatus::assess(&ledger, 10), RunStatus::Completed);

        ledger.append(ViolationEntry::flag(&rule, 2, "ERR1"));
        assert_eq!(RunStatus::assess(&ledger, 10), RunStatus::CompletedWithViolations);

        let mut early = ViolationLedger::new();
        early.abort("metadata missing");
        assert_eq!(RunStatus::assess(&early, 0), RunStatus::Error);
        assert_eq!(RunStatus::assess(&early, 4), RunStatus::CompletedWithViolations);
    }
}
