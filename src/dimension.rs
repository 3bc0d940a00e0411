//! Dimension strings: parsing and validation of user-entered lengths.
//!
//! Accepted forms are a plain decimal (`10`, `10.5`, `.5`), a fraction
//! (`1/2`) or a whole part followed by a fraction (`10 1/2`). Blank input
//! means zero so a field can be cleared while typing without an error.

/// Parse a dimension string.
///
/// Returns `0.0` for blank input and `f64::NAN` for anything malformed or
/// too large to represent; callers must check with `is_nan()`. Never panics.
/// A non-NaN result is always finite.
#[must_use]
pub fn parse_dimension(text: &str) -> f64 {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.is_empty() {
        return 0.0;
    }
    if parts.len() > 2 {
        return f64::NAN;
    }

    let mut total = 0.0;
    let mut has_fraction = false;
    for part in parts {
        let value = match part.split_once('/') {
            Some((numerator, denominator)) => {
                if has_fraction {
                    return f64::NAN;
                }
                has_fraction = true;
                parse_fraction(numerator, denominator)
            }
            None => parse_decimal(part),
        };
        let Some(value) = value else {
            return f64::NAN;
        };
        total += value;
    }
    if total.is_finite() { total } else { f64::NAN }
}

/// Unsigned decimal: digits with at most one `.`, at least one digit.
/// Overflow to infinity is rejected.
fn parse_decimal(token: &str) -> Option<f64> {
    let digits = token.bytes().filter(u8::is_ascii_digit).count();
    let dots = token.bytes().filter(|b| *b == b'.').count();
    if digits == 0 || dots > 1 || digits + dots != token.len() {
        return None;
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

fn parse_fraction(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator = parse_decimal(numerator)?;
    let denominator = parse_decimal(denominator)?;
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Why a dimension field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Use digits, a decimal point or a fraction only.")]
    InvalidCharacters,
    #[error("Invalid number format. Examples: 10, 10.5 or 10 1/2")]
    InvalidNumber,
}

impl crate::error::ErrorCode for InputError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCharacters => "E_INPUT_CHARACTERS",
            Self::InvalidNumber => "E_INPUT_NUMBER",
        }
    }
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || c == '.' || c == '/'
}

/// Validate a dimension field. `None` means the text is acceptable.
#[must_use]
pub fn validate_input(text: &str) -> Option<InputError> {
    if !text.chars().all(is_allowed_char) {
        return Some(InputError::InvalidCharacters);
    }
    if !text.trim().is_empty() && parse_dimension(text).is_nan() {
        return Some(InputError::InvalidNumber);
    }
    None
}

#[cfg(test)]
#[path = "dimension_test.rs"]
mod tests;
