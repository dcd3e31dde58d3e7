// vetter-core/src/domain/engine/normal.rs

use crate::domain::error::DomainError;
use crate::domain::ledger::{ViolationEntry, ViolationLedger};
use crate::domain::record::Record;
use crate::domain::rules::compiled::{CompiledRule, ReplacementSource};

use super::{EvaluationContext, all_hold, read, require, write_replacement};

/// Single-dataset check. Every detail is evaluated; only the first
/// replacement of a detail is applied.
pub(super) fn apply(
    rule: &CompiledRule,
    record: &mut Record,
    context: &EvaluationContext,
    ledger: &mut ViolationLedger,
) -> Result<(), DomainError> {
    let row = context.row;
    for detail in &rule.details {
        let admitted = match read(record, &detail.primary.field, row)? {
            Some(value) => detail.primary.admits(value),
            None => false,
        };
        if !admitted || !all_hold(&detail.items, record, row)? {
            continue;
        }

        match detail.replacements.first().filter(|r| !r.is_blank()) {
            Some(replacement) => {
                let value = match &replacement.source {
                    ReplacementSource::Constant(text) => text.clone(),
                    ReplacementSource::FromTarget(field) => require(record, field, row)?.to_string(),
                    // Rejected by the compiler for normal checks.
                    ReplacementSource::FromReference(_) => continue,
                };
                write_replacement(
                    rule,
                    context,
                    &replacement.target,
                    value,
                    detail.error_flag.as_deref(),
                    record,
                    ledger,
                );
            }
            None => {
                if let Some(flag) = &detail.error_flag {
                    ledger.append(ViolationEntry::flag(rule, row, flag));
                }
            }
        }
    }
    Ok(())
}
