//! Korean price notation ("1억 2,500만") to integer won.
//!
//! Two dialects show up on price pages:
//! - marked text that carries 억/만 unit words, handled by [`parse_marked_amount`]
//! - bare comma-formatted numbers already counted in 만원, handled by
//!   [`parse_bare_manwon_amount`]
//!
//! [`normalize_amount`] keeps the lenient single-entry behavior where every
//! failure collapses to 0.

mod decimal;

use decimal::scale_decimal;
use thiserror::Error;

/// 억, one hundred million won
pub const EOK: char = '억';
/// 만, ten thousand won
pub const MAN: char = '만';

const EOK_EXPONENT: u32 = 8;
const MAN_EXPONENT: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount text is empty")]
    Empty,
    #[error("amount text contains no digits")]
    NoDigits,
    #[error("amount text has no 억/만 unit marker")]
    MissingUnit,
    #[error("unit marker '{0}' appears more than once")]
    RepeatedUnit(char),
    #[error("negative amounts are not supported")]
    Negative,
    #[error("malformed numeric token: {0:?}")]
    Malformed(String),
    #[error("amount exceeds the supported range")]
    Overflow,
}

/// Convert scraped price text to won, returning 0 when it can't be read.
///
/// A 0 result is ambiguous: the amount may be zero, absent, or unparseable.
/// Callers that care should use [`parse_amount`] instead.
pub fn normalize_amount(text: Option<&str>) -> u64 {
    text.and_then(|t| parse_amount(t).ok()).unwrap_or(0)
}

/// Same grammar as [`normalize_amount`], reporting why a parse failed.
///
/// Text without a unit marker is read as a plain integer with every
/// non-digit removed and no scaling applied, so `"59,000"` is `59000`.
pub fn parse_amount(text: &str) -> Result<u64, AmountError> {
    let cleaned = prepare(text)?;

    if has_unit(&cleaned) {
        return parse_units(&cleaned);
    }

    let digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(AmountError::NoDigits);
    }
    scale_decimal(&digits, 0)
}

/// Parse text that must carry at least one 억 or 만 marker.
pub fn parse_marked_amount(text: &str) -> Result<u64, AmountError> {
    let cleaned = prepare(text)?;

    if !has_unit(&cleaned) {
        return Err(AmountError::MissingUnit);
    }
    parse_units(&cleaned)
}

/// Parse a bare 만원-unit number such as `"59,000"` and scale it to won.
///
/// Only digits, thousands separators and surrounding whitespace are
/// accepted.
pub fn parse_bare_manwon_amount(text: &str) -> Result<u64, AmountError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let digits = strip_commas(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::Malformed(trimmed.to_string()));
    }
    scale_decimal(&digits, MAN_EXPONENT)
}

/// Whether the text carries an 억 or 만 marker.
pub fn has_unit(text: &str) -> bool {
    text.contains(EOK) || text.contains(MAN)
}

/// Shared front half of the marked grammar: reject blank and negative
/// input, then keep only digits, unit markers, commas and decimal points.
fn prepare(text: &str) -> Result<String, AmountError> {
    if text.trim().is_empty() {
        return Err(AmountError::Empty);
    }
    if has_leading_minus(text) {
        return Err(AmountError::Negative);
    }

    Ok(text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(*c, EOK | MAN | ',' | '.'))
        .collect())
}

fn parse_units(cleaned: &str) -> Result<u64, AmountError> {
    // A second 만 is usually a trailing note like "(평당 1,000만)" and only
    // the first one is read; a second 억 has no defined meaning.
    if cleaned.matches(EOK).count() > 1 {
        return Err(AmountError::RepeatedUnit(EOK));
    }

    match cleaned.split_once(EOK) {
        Some((eok_part, rest)) => {
            let eok = scale_optional(eok_part, EOK_EXPONENT)?;
            let man = match rest.split_once(MAN) {
                Some((man_part, _)) => scale_optional(man_part, MAN_EXPONENT)?,
                None => 0,
            };
            eok.checked_add(man).ok_or(AmountError::Overflow)
        }
        None => {
            let (man_part, _) = cleaned.split_once(MAN).ok_or(AmountError::MissingUnit)?;
            let man_part = strip_commas(man_part);
            if man_part.is_empty() {
                return Err(AmountError::NoDigits);
            }
            scale_decimal(&man_part, MAN_EXPONENT)
        }
    }
}

/// Empty parts next to an 억 marker count as zero.
fn scale_optional(part: &str, exponent: u32) -> Result<u64, AmountError> {
    let part = strip_commas(part);
    if part.is_empty() {
        return Ok(0);
    }
    scale_decimal(&part, exponent)
}

fn strip_commas(s: &str) -> String {
    s.replace(',', "")
}

fn has_leading_minus(text: &str) -> bool {
    match text.find(|c: char| c.is_ascii_digit()) {
        Some(pos) => text[..pos].ends_with(['-', '\u{2212}']),
        None => false,
    }
}
