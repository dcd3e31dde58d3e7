// vetter-core/src/domain/engine/mod.rs
//
// Record loop. Every record runs through every compiled check in definition
// order; rewrites made by one check are visible to the next.

mod normal;
mod reference;

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::domain::error::DomainError;
use crate::domain::ledger::{ViolationEntry, ViolationLedger};
use crate::domain::metadata::MetaId;
use crate::domain::ports::ReferenceSource;
use crate::domain::record::{Record, ReplaceRejected};
use crate::domain::rules::compiled::{CompiledRule, CompiledRules, Condition, FieldRef};
use crate::domain::rules::raw::CheckKind;

pub const NO_MATCHING_REFERENCE: &str = "no matching reference record";
pub const REFERENCE_UNAVAILABLE: &str = "reference record unavailable for replacement";
pub const POSITION_OUTSIDE_RECORD: &str = "replacement position outside record";
pub const LENGTH_MISMATCH: &str = "replacement length does not match field length";
pub const VALUE_SPLITS_RECORD: &str = "replacement contains a delimiter or line break";

/// Per-record state: the row ordinal and the matched reference row per
/// reference dataset. Built fresh for every record.
#[derive(Debug)]
pub struct EvaluationContext {
    pub row: usize,
    unquoted_delimiter: Option<char>,
    matched: HashMap<MetaId, usize>,
}

impl EvaluationContext {
    pub fn new(row: usize, unquoted_delimiter: Option<char>) -> Self {
        Self {
            row,
            unquoted_delimiter,
            matched: HashMap::new(),
        }
    }

    /// True when writing `value` back would change the record's shape.
    pub fn splits_record(&self, value: &str) -> bool {
        value.contains(['\n', '\r'])
            || self.unquoted_delimiter.is_some_and(|d| value.contains(d))
    }

    pub fn matched(&self, meta_id: MetaId) -> Option<usize> {
        self.matched.get(&meta_id).copied()
    }

    pub fn remember(&mut self, meta_id: MetaId, index: usize) {
        self.matched.insert(meta_id, index);
    }
}

pub struct CheckEngine<'a> {
    rules: &'a CompiledRules,
}

impl<'a> CheckEngine<'a> {
    pub fn new(rules: &'a CompiledRules) -> Self {
        Self { rules }
    }

    /// Runs all checks over `records`, rewriting them in place.
    ///
    /// A fatal condition aborts the ledger and stops the pass. Returns the
    /// number of records fully processed.
    pub fn process(
        &self,
        records: &mut [Record],
        references: &mut dyn ReferenceSource,
        ledger: &mut ViolationLedger,
    ) -> usize {
        let mut processed = 0;

        for (index, record) in records.iter_mut().enumerate() {
            let mut context = EvaluationContext::new(index + 1, self.rules.unquoted_delimiter);

            for rule in &self.rules.rules {
                let outcome = match rule.kind {
                    CheckKind::Normal => normal::apply(rule, record, &context, ledger),
                    CheckKind::Reference => {
                        reference::apply(rule, record, &mut context, references, ledger)
                    }
                };

                if let Err(err) = outcome {
                    warn!(row = context.row, rule = rule.number, error = %err, "Check run aborted");
                    ledger.abort(err.to_string());
                    return processed;
                }
            }
            processed += 1;
        }

        info!(rows = processed, entries = ledger.len(), "Check pass finished");
        processed
    }
}

// Value of a condition field. Absent optional fields are `None`, absent
// mandatory fields are fatal.
fn read<'r>(record: &'r Record, field: &FieldRef, row: usize) -> Result<Option<&'r str>, DomainError> {
    match record.value(field.slot) {
        Some(value) => Ok(Some(value)),
        None if field.optional => Ok(None),
        None => Err(absent(field, row)),
    }
}

fn require<'r>(record: &'r Record, field: &FieldRef, row: usize) -> Result<&'r str, DomainError> {
    record.value(field.slot).ok_or_else(|| absent(field, row))
}

fn absent(field: &FieldRef, row: usize) -> DomainError {
    DomainError::FieldAbsent {
        row,
        position: field.slot.position,
        name: field.name.clone(),
    }
}

// AND over all conditions. A missing optional field fails the condition.
fn all_hold(conditions: &[Condition], record: &Record, row: usize) -> Result<bool, DomainError> {
    for condition in conditions {
        match read(record, &condition.field, row)? {
            Some(value) if condition.admits(value) => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

// Rewrites the target field and records the outcome.
fn write_replacement(
    rule: &CompiledRule,
    context: &EvaluationContext,
    target: &FieldRef,
    value: String,
    error_flag: Option<&str>,
    record: &mut Record,
    ledger: &mut ViolationLedger,
) {
    let row = context.row;
    if context.splits_record(&value) {
        ledger.append(ViolationEntry::message(rule, row, VALUE_SPLITS_RECORD));
        return;
    }
    match record.replace(target.slot, &value) {
        Ok(previous) => {
            debug!(rule = rule.number, row, position = target.slot.position, "Field replaced");
            ledger.append(ViolationEntry::replacement(
                rule, row, target, previous, value, error_flag,
            ));
        }
        Err(ReplaceRejected::OutOfRange) => {
            ledger.append(ViolationEntry::message(rule, row, POSITION_OUTSIDE_RECORD));
        }
        Err(ReplaceRejected::LengthMismatch) => {
            ledger.append(ViolationEntry::message(rule, row, LENGTH_MISMATCH));
        }
    }
}
