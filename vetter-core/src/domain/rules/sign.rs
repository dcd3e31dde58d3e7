// vetter-core/src/domain/rules/sign.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // No exponent, no thousands separators.
        Regex::new(r"^[+-]?\d+(\.\d+)?$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

fn parse_number(text: &str) -> Option<f64> {
    if number_regex().is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

/// One alternative of a sign list.
#[derive(Debug, Clone, PartialEq)]
pub enum Sign {
    /// Literal, case-sensitive equality ("off-code").
    ExactMatch(String),
    /// Inclusive numeric interval. Bounds keep their text for the length guard.
    Range { low: String, high: String },
    /// Key membership in the reference dataset. Handled by the reference processor.
    ReferenceOffCode,
}

impl Sign {
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Sign::ExactMatch(value) => candidate == value,
            Sign::Range { low, high } => check_range(candidate, low, high),
            Sign::ReferenceOffCode => false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Proceed only when a sign matched.
    Equal,
    /// Proceed only when no sign matched.
    Other,
}

impl Polarity {
    pub fn admits(self, matched: bool) -> bool {
        match self {
            Polarity::Equal => matched,
            Polarity::Other => !matched,
        }
    }
}

/// Splits a raw sign string into alternatives.
///
/// An alternative holding the hyphen that splits into exactly two numeric
/// tokens is a range, anything else is matched literally.
pub fn parse_signs(raw: &str, separator: &str, hyphen: &str) -> Vec<Sign> {
    raw.split(separator)
        .map(|alternative| classify(alternative, hyphen))
        .collect()
}

fn classify(alternative: &str, hyphen: &str) -> Sign {
    if alternative.contains(hyphen) {
        let parts: Vec<&str> = alternative.split(hyphen).collect();
        if let [low, high] = parts.as_slice() {
            if parse_number(low).is_some() && parse_number(high).is_some() {
                return Sign::Range {
                    low: low.to_string(),
                    high: high.to_string(),
                };
            }
        }
    }
    Sign::ExactMatch(alternative.to_string())
}

/// Inclusive range check with the zero-padding guard: when both bounds are
/// integers written with the same width, the candidate must have that width too.
pub fn check_range(candidate: &str, low: &str, high: &str) -> bool {
    let width = low.chars().count();
    if !low.contains('.')
        && !high.contains('.')
        && width == high.chars().count()
        && width != candidate.chars().count()
    {
        return false;
    }

    match (parse_number(candidate), parse_number(low), parse_number(high)) {
        (Some(value), Some(low), Some(high)) => low <= value && value <= high,
        _ => false,
    }
}

/// True when any alternative matches.
pub fn matches_any(signs: &[Sign], candidate: &str) -> bool {
    signs.iter().any(|sign| sign.matches(candidate))
}
