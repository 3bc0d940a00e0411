use super::*;

fn assert_parses(text: &str, expected: f64) {
    let value = parse_dimension(text);
    assert!((value - expected).abs() < 1e-12, "{text:?} parsed to {value}, expected {expected}");
}

// =========================================================================
// parse_dimension
// =========================================================================

#[test]
fn blank_is_zero() {
    assert_parses("", 0.0);
    assert_parses("   ", 0.0);
    assert_parses("\t\n", 0.0);
}

#[test]
fn plain_decimals() {
    assert_parses("10", 10.0);
    assert_parses("10.5", 10.5);
    assert_parses(" 10.5 ", 10.5);
    assert_parses(".5", 0.5);
    assert_parses("10.", 10.0);
}

#[test]
fn mixed_fraction_sums_parts() {
    assert_parses("10 1/2", 10.5);
    assert_parses("10   3/4", 10.75);
    assert_parses("1/4", 0.25);
    assert_parses("1/2 10", 10.5);
}

#[test]
fn two_decimals_are_summed() {
    assert_parses("10 5", 15.0);
}

#[test]
fn two_fractions_rejected() {
    assert!(parse_dimension("1/2 1/2").is_nan());
}

#[test]
fn zero_denominator_rejected() {
    assert!(parse_dimension("10/0").is_nan());
    assert!(parse_dimension("1/0.0").is_nan());
}

#[test]
fn non_numeric_rejected() {
    assert!(parse_dimension("a").is_nan());
    assert!(parse_dimension("1/a").is_nan());
    assert!(parse_dimension("/2").is_nan());
    assert!(parse_dimension("2/").is_nan());
    assert!(parse_dimension(".").is_nan());
    assert!(parse_dimension("1.2.3").is_nan());
    assert!(parse_dimension("inf").is_nan());
    assert!(parse_dimension("1e3").is_nan());
    assert!(parse_dimension("-5").is_nan());
}

#[test]
fn too_many_tokens_rejected() {
    assert!(parse_dimension("1 2 3").is_nan());
}

#[test]
fn nested_fraction_rejected() {
    assert!(parse_dimension("1/2/3").is_nan());
}

// =========================================================================
// validate_input
// =========================================================================

#[test]
fn blank_is_valid() {
    assert_eq!(validate_input(""), None);
    assert_eq!(validate_input("   "), None);
}

#[test]
fn parseable_text_is_valid() {
    for text in ["10", "10.5", "10 1/2", "3/8", " 7 "] {
        assert_eq!(validate_input(text), None, "{text:?}");
    }
}

#[test]
fn foreign_characters_rejected_before_parsing() {
    assert_eq!(validate_input("10a"), Some(InputError::InvalidCharacters));
    assert_eq!(validate_input("-5"), Some(InputError::InvalidCharacters));
    assert_eq!(validate_input("1e3"), Some(InputError::InvalidCharacters));
    assert_eq!(validate_input("10,5"), Some(InputError::InvalidCharacters));
}

#[test]
fn allowed_characters_that_fail_to_parse() {
    for text in ["1/2 1/2", "10/0", ".", "1 2 3", "1.2.3", "/"] {
        assert_eq!(validate_input(text), Some(InputError::InvalidNumber), "{text:?}");
    }
}

#[test]
fn validator_agrees_with_parser() {
    let samples = ["", "0", "12", "12.25", "5 5/8", "5/8 5/8", "x", "1//2", "4 ", " 1 1 1"];
    for text in samples {
        let parsed = parse_dimension(text);
        let error = validate_input(text);
        if parsed.is_nan() {
            assert!(error.is_some(), "{text:?} should be rejected");
        } else if text.chars().all(is_allowed_char) {
            assert!(error.is_none(), "{text:?} should be accepted");
        }
    }
}

#[test]
fn error_messages_are_human_readable() {
    assert!(InputError::InvalidNumber.to_string().contains("10 1/2"));
    assert!(InputError::InvalidCharacters.to_string().contains("digits"));
}

// =========================================================================
// overflow
// =========================================================================

#[test]
fn overflowing_decimal_is_rejected() {
    let huge = format!("1{}", "0".repeat(400));
    assert!(parse_dimension(&huge).is_nan());
    assert_eq!(validate_input(&huge), Some(InputError::InvalidNumber));
}

#[test]
fn fraction_over_subnormal_denominator_is_rejected() {
    // 5e-324, the smallest positive subnormal
    let tiny = format!("0.{}5", "0".repeat(323));
    assert!(parse_dimension(&tiny) > 0.0);
    let text = format!("1/{tiny}");
    assert!(parse_dimension(&text).is_nan());
    assert_eq!(validate_input(&text), Some(InputError::InvalidNumber));
}

#[test]
fn finite_parts_that_sum_past_max_are_rejected() {
    let near_max = format!("179769313486231570{}", "0".repeat(291));
    assert_eq!(parse_dimension(&near_max), f64::MAX);
    let text = format!("{near_max} 1{}/1", "0".repeat(300));
    assert!(parse_dimension(&text).is_nan());
}

#[test]
fn large_but_finite_values_still_parse() {
    let big = format!("1{}", "0".repeat(300));
    assert!(parse_dimension(&big).is_finite());
    assert_eq!(validate_input(&big), None);
}
