// vetter-core/src/domain/engine/reference.rs

use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::ledger::{ViolationEntry, ViolationLedger};
use crate::domain::ports::ReferenceSource;
use crate::domain::record::Record;
use crate::domain::rules::compiled::{CompiledRule, ReplacementSource};
use crate::domain::rules::sign::matches_any;

use super::{
    EvaluationContext, NO_MATCHING_REFERENCE, REFERENCE_UNAVAILABLE, all_hold, read, require,
    write_replacement,
};

/// Cross-dataset check.
///
/// Details are tried in order and the first one whose conditions hold is
/// applied; the rest are skipped. A failed join stops the detail list.
pub(super) fn apply(
    rule: &CompiledRule,
    record: &mut Record,
    context: &mut EvaluationContext,
    references: &mut dyn ReferenceSource,
    ledger: &mut ViolationLedger,
) -> Result<(), DomainError> {
    let meta_id = rule
        .reference_meta_id
        .ok_or(DomainError::ReferenceMetaMissing { rule: rule.number })?;
    let dataset = references.dataset(meta_id)?;
    let row = context.row;

    for detail in &rule.details {
        // Membership miss: no join, no reference conditions.
        let mut membership_miss = false;

        match detail.membership_key {
            Some(key_slot) => {
                let Some(value) = read(record, &detail.primary.field, row)? else {
                    continue;
                };
                if matches_any(detail.primary.leading_signs(), value) {
                    // A literal alternative ahead of the off-code decided the condition.
                    if !detail.primary.polarity.admits(true) || !all_hold(&detail.items, record, row)? {
                        continue;
                    }
                } else if dataset.contains_key(key_slot, value)? {
                    continue;
                } else {
                    membership_miss = true;
                }
            }
            None => {
                let admitted = match read(record, &detail.primary.field, row)? {
                    Some(value) => detail.primary.admits(value),
                    None => false,
                };
                if !admitted || !all_hold(&detail.items, record, row)? {
                    continue;
                }
            }
        }

        if !membership_miss && context.matched(meta_id).is_none() {
            let keys = rule
                .key_pairs
                .iter()
                .map(|pair| Ok((pair.reference.slot, require(record, &pair.target, row)?.to_string())))
                .collect::<Result<Vec<_>, DomainError>>()?;

            match dataset.find_match(&keys) {
                Some(index) => {
                    debug!(rule = rule.number, row, reference_row = index + 1, "Reference record matched");
                    context.remember(meta_id, index);
                }
                None => {
                    ledger.append(ViolationEntry::message(rule, row, NO_MATCHING_REFERENCE));
                    break;
                }
            }
        }

        let matched = if membership_miss {
            None
        } else {
            context.matched(meta_id).and_then(|index| dataset.row(index))
        };

        if let Some(reference_record) = matched {
            if !all_hold(&detail.reference_conditions, reference_record, row)? {
                continue;
            }
        }

        let mut fired = false;
        for replacement in detail.replacements.iter().filter(|r| !r.is_blank()) {
            fired = true;
            let value = match &replacement.source {
                ReplacementSource::Constant(text) => text.clone(),
                ReplacementSource::FromTarget(field) => require(record, field, row)?.to_string(),
                ReplacementSource::FromReference(field) => match matched {
                    Some(reference_record) => require(reference_record, field, row)?.to_string(),
                    None => {
                        ledger.append(ViolationEntry::message(rule, row, REFERENCE_UNAVAILABLE));
                        continue;
                    }
                },
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

        if !fired && let Some(flag) = &detail.error_flag {
            ledger.append(ViolationEntry::flag(rule, row, flag));
        }
        break;
    }
    Ok(())
}
