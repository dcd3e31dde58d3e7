// vetter-core/src/domain/rules/compiler.rs

use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::metadata::{MatterId, MetaDataset, MetaId};
use crate::domain::ports::ReferenceSource;
use crate::domain::project::CheckConfig;
use crate::domain::record::{DataFormat, FieldSlot};
use crate::domain::reference::ReferenceMetadata;
use crate::domain::rules::compiled::{
    CompiledRule, CompiledRules, Condition, Detail, FieldRef, KeyPair, Replacement,
    ReplacementSource,
};
use crate::domain::rules::raw::{
    CheckKind, RawCheck, RawCondition, RawDefinitionSet, RawDetail, RawKeyPair, RawReplacement,
    RawSourceKind,
};
use crate::domain::rules::sign::{Polarity, Sign, parse_signs};

/// Turns raw check definitions into [`CompiledRules`].
///
/// Runs once per execution. Any field that cannot be resolved stops the run.
pub struct DefinitionCompiler<'a> {
    config: &'a CheckConfig,
    target: &'a MetaDataset,
    target_format: DataFormat,
}

impl<'a> DefinitionCompiler<'a> {
    pub fn new(config: &'a CheckConfig, target: &'a MetaDataset, target_format: DataFormat) -> Self {
        Self {
            config,
            target,
            target_format,
        }
    }

    #[instrument(skip_all, fields(definition = raw.id, target_meta = self.target.id))]
    pub fn compile(
        &self,
        raw: &RawDefinitionSet,
        references: &mut dyn ReferenceSource,
    ) -> Result<CompiledRules, DomainError> {
        if raw.checks.is_empty() {
            return Err(DomainError::EmptyDefinitionSet(raw.id));
        }

        let mut key_cache: HashMap<(MetaId, Vec<RawKeyPair>), Vec<KeyPair>> = HashMap::new();
        let mut rules = Vec::with_capacity(raw.checks.len());

        for check in &raw.checks {
            let rule = match check.kind {
                CheckKind::Normal => self.compile_normal(check)?,
                CheckKind::Reference => self.compile_reference(check, references, &mut key_cache)?,
            };
            debug!(rule = rule.number, details = rule.details.len(), "Check compiled");
            rules.push(rule);
        }

        info!(checks = rules.len(), "Check definitions compiled");
        Ok(CompiledRules {
            definition_id: raw.id,
            target_meta_id: self.target.id,
            target_format: self.target_format,
            unquoted_delimiter: match (self.target_format, self.target.quote_mark) {
                (DataFormat::Csv, None) => Some(self.config.delimiter),
                _ => None,
            },
            rules,
        })
    }

    fn compile_normal(&self, check: &RawCheck) -> Result<CompiledRule, DomainError> {
        if check.details.is_empty() {
            return Err(DomainError::NoDetails { rule: check.number });
        }
        if check.reference_meta_id.is_some() || !check.key_pairs.is_empty() {
            warn!(rule = check.number, "Normal check declares reference settings, ignored");
        }

        let mut details = Vec::with_capacity(check.details.len());
        for (index, raw_detail) in check.details.iter().enumerate() {
            let (primary, mut items) = self.target_conditions(check.number, index + 1, raw_detail)?;
            for raw_condition in active(&raw_detail.item_conditions) {
                items.push(self.condition(raw_condition, self.target, self.target_format)?);
            }
            if !raw_detail.reference_conditions.is_empty() {
                warn!(rule = check.number, "Normal check declares reference conditions, ignored");
            }

            let replacements = raw_detail
                .replacements
                .iter()
                .map(|r| self.replacement(check, r, None))
                .collect::<Result<Vec<_>, _>>()?;

            details.push(Detail {
                primary,
                membership_key: None,
                items,
                reference_conditions: Vec::new(),
                replacements,
                error_flag: error_flag(raw_detail),
            });
        }

        Ok(CompiledRule {
            number: check.number,
            summary: check.summary.clone(),
            kind: CheckKind::Normal,
            reference_meta_id: None,
            key_pairs: Vec::new(),
            details,
        })
    }

    fn compile_reference(
        &self,
        check: &RawCheck,
        references: &mut dyn ReferenceSource,
        key_cache: &mut HashMap<(MetaId, Vec<RawKeyPair>), Vec<KeyPair>>,
    ) -> Result<CompiledRule, DomainError> {
        let meta_id = check
            .reference_meta_id
            .ok_or(DomainError::ReferenceMetaMissing { rule: check.number })?;
        if check.key_pairs.is_empty() {
            return Err(DomainError::KeyPairsMissing { rule: check.number });
        }
        if check.details.is_empty() {
            return Err(DomainError::NoDetails { rule: check.number });
        }

        let reference = references.metadata(meta_id)?;

        let cache_key = (meta_id, check.key_pairs.clone());
        let key_pairs = match key_cache.get(&cache_key) {
            Some(resolved) => resolved.clone(),
            None => {
                let resolved = check
                    .key_pairs
                    .iter()
                    .map(|pair| {
                        Ok(KeyPair {
                            target: resolve_field(self.target, self.target_format, pair.target_item)?,
                            reference: resolve_field(
                                &reference.meta,
                                reference.format,
                                pair.reference_item,
                            )?,
                        })
                    })
                    .collect::<Result<Vec<_>, DomainError>>()?;
                key_cache.insert(cache_key, resolved.clone());
                resolved
            }
        };

        let mut details = Vec::with_capacity(check.details.len());
        for (index, raw_detail) in check.details.iter().enumerate() {
            let (mut primary, items) = self.target_conditions(check.number, index + 1, raw_detail)?;

            let off_code = &self.config.reference_off_code;
            if let Some(at) = primary
                .signs
                .iter()
                .position(|s| matches!(s, Sign::ExactMatch(v) if v == off_code))
            {
                // Alternatives are tried in order; the membership test ends the list.
                if at + 1 < primary.signs.len() {
                    warn!(
                        rule = check.number,
                        detail = index + 1,
                        "Signs after the reference off-code are never evaluated, ignored"
                    );
                }
                primary.signs.truncate(at);
                primary.signs.push(Sign::ReferenceOffCode);
            }

            let membership_key = if primary.is_reference_off_code() {
                let pair = key_pairs
                    .iter()
                    .find(|k| k.target.matter_id == primary.field.matter_id)
                    .ok_or(DomainError::OffCodeKeyMissing {
                        rule: check.number,
                        matter_id: primary.field.matter_id,
                    })?;
                Some(pair.reference.slot)
            } else {
                None
            };

            if !raw_detail.item_conditions.is_empty() {
                warn!(rule = check.number, "Reference check declares item conditions, ignored");
            }

            let reference_conditions = active(&raw_detail.reference_conditions)
                .map(|c| self.condition(c, &reference.meta, reference.format))
                .collect::<Result<Vec<_>, _>>()?;

            let replacements = raw_detail
                .replacements
                .iter()
                .map(|r| self.replacement(check, r, Some(reference)))
                .collect::<Result<Vec<_>, _>>()?;

            details.push(Detail {
                primary,
                membership_key,
                items,
                reference_conditions,
                replacements,
                error_flag: error_flag(raw_detail),
            });
        }

        Ok(CompiledRule {
            number: check.number,
            summary: check.summary.clone(),
            kind: CheckKind::Reference,
            reference_meta_id: Some(meta_id),
            key_pairs,
            details,
        })
    }

    // Primary condition plus any further target conditions of the detail.
    fn target_conditions(
        &self,
        rule: u32,
        detail: usize,
        raw: &RawDetail,
    ) -> Result<(Condition, Vec<Condition>), DomainError> {
        let mut conditions = active(&raw.conditions);
        let first = conditions
            .next()
            .ok_or(DomainError::NoPrimaryCondition { rule, detail })?;

        let primary = self.condition(first, self.target, self.target_format)?;
        let items = conditions
            .map(|c| self.condition(c, self.target, self.target_format))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((primary, items))
    }

    fn condition(
        &self,
        (raw, polarity): (&RawCondition, Polarity),
        meta: &MetaDataset,
        format: DataFormat,
    ) -> Result<Condition, DomainError> {
        let sign = self.unblank(&raw.sign);
        Ok(Condition {
            field: resolve_field(meta, format, raw.item)?,
            polarity,
            signs: parse_signs(&sign, &self.config.sign_separator, &self.config.hyphen),
        })
    }

    fn replacement(
        &self,
        check: &RawCheck,
        raw: &RawReplacement,
        reference: Option<&ReferenceMetadata>,
    ) -> Result<Replacement, DomainError> {
        let target = resolve_field(self.target, self.target_format, raw.item)?;
        let source = match raw.source {
            RawSourceKind::Constant => ReplacementSource::Constant(self.unblank(&raw.value)),
            RawSourceKind::Target => ReplacementSource::FromTarget(resolve_field(
                self.target,
                self.target_format,
                source_item(check.number, &raw.value)?,
            )?),
            RawSourceKind::Reference => {
                let reference =
                    reference.ok_or(DomainError::ReferenceSourceInNormalCheck { rule: check.number })?;
                ReplacementSource::FromReference(resolve_field(
                    &reference.meta,
                    reference.format,
                    source_item(check.number, &raw.value)?,
                )?)
            }
        };
        Ok(Replacement { target, source })
    }

    fn unblank(&self, text: &str) -> String {
        text.replace(self.config.blank_marker.as_str(), " ")
    }
}

// Conditions without a comparison are inactive.
fn active(conditions: &[RawCondition]) -> impl Iterator<Item = (&RawCondition, Polarity)> {
    conditions
        .iter()
        .filter_map(|c| c.comparison.map(|polarity| (c, polarity)))
}

fn error_flag(raw: &RawDetail) -> Option<String> {
    raw.error_flag.clone().filter(|f| !f.is_empty())
}

fn source_item(rule: u32, value: &str) -> Result<MatterId, DomainError> {
    value
        .trim()
        .parse()
        .map_err(|_| DomainError::InvalidReplacementSource {
            rule,
            value: value.to_string(),
        })
}

/// Resolves a field identifier to its slot in records of the given format.
pub fn resolve_field(
    meta: &MetaDataset,
    format: DataFormat,
    matter_id: MatterId,
) -> Result<FieldRef, DomainError> {
    let undefined = || DomainError::MatterNotDefined {
        meta_id: meta.id,
        matter_id,
    };
    let invalid = |attribute| DomainError::InvalidMatterAttribute {
        meta_id: meta.id,
        matter_id,
        attribute,
    };

    let matter = meta.matter(matter_id).ok_or_else(undefined)?;
    let position_text = non_blank(matter.position.as_deref()).ok_or_else(undefined)?;
    let position = parse_positive(position_text).ok_or_else(|| invalid("position"))?;

    let slot = match format {
        DataFormat::Csv => FieldSlot::column(position),
        DataFormat::Fixed => {
            let bytes_text = non_blank(matter.bytes.as_deref()).ok_or(DomainError::ByteLengthMissing {
                meta_id: meta.id,
                matter_id,
            })?;
            let bytes = parse_positive(bytes_text).ok_or_else(|| invalid("byte length"))?;
            FieldSlot::fixed(position, bytes)
        }
    };

    Ok(FieldRef {
        matter_id,
        name: matter.name.clone(),
        slot,
        optional: matter.optional,
    })
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn parse_positive(text: &str) -> Option<usize> {
    text.parse::<usize>().ok().filter(|n| *n > 0)
}
