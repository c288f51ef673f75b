//! Comprehensive unit tests for validation.rs module

use chrono::NaiveDate;
use pharmacare::validation::InputValidator;
use std::path::Path;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

#[test]
fn test_validate_full_name_valid() {
    assert!(InputValidator::validate_full_name("John Doe").is_ok());
}

#[test]
fn test_validate_full_name_empty() {
    assert!(InputValidator::validate_full_name("").is_err());
}

#[test]
fn test_validate_full_name_whitespace_only() {
    assert!(InputValidator::validate_full_name("   ").is_err());
}

#[test]
fn test_validate_full_name_too_long() {
    let long_name = "a".repeat(101);
    assert!(InputValidator::validate_full_name(&long_name).is_err());
}

#[test]
fn test_validate_full_name_exactly_100_chars() {
    let name = "a".repeat(100);
    assert!(InputValidator::validate_full_name(&name).is_ok());
}

#[test]
fn test_validate_full_name_with_newline() {
    assert!(InputValidator::validate_full_name("John\nDoe").is_err());
}

#[test]
fn test_validate_full_name_unicode() {
    assert!(InputValidator::validate_full_name("José García").is_ok());
}

#[test]
fn test_validate_email_valid() {
    assert!(InputValidator::validate_email("test@example.com").is_ok());
}

#[test]
fn test_validate_email_valid_subdomain() {
    assert!(InputValidator::validate_email("user@mail.example.com").is_ok());
}

#[test]
fn test_validate_email_empty() {
    assert!(InputValidator::validate_email("").is_err());
}

#[test]
fn test_validate_email_no_at_symbol() {
    assert!(InputValidator::validate_email("testexample.com").is_err());
}

#[test]
fn test_validate_email_no_domain_dot() {
    assert!(InputValidator::validate_email("test@example").is_err());
}

#[test]
fn test_validate_email_with_spaces() {
    assert!(InputValidator::validate_email("te st@example.com").is_err());
}

#[test]
fn test_validate_email_too_long() {
    let long_email = format!("{}@example.com", "a".repeat(250));
    assert!(InputValidator::validate_email(&long_email).is_err());
}

#[test]
fn test_validate_phone_valid_us() {
    assert!(InputValidator::validate_phone("+1234567890").is_ok());
}

#[test]
fn test_validate_phone_with_formatting() {
    assert!(InputValidator::validate_phone("+1 (555) 123-4567").is_ok());
}

#[test]
fn test_validate_phone_empty() {
    assert!(InputValidator::validate_phone("").is_err());
}

#[test]
fn test_validate_phone_too_short() {
    assert!(InputValidator::validate_phone("123456").is_err());
}

#[test]
fn test_validate_phone_too_many_digits() {
    assert!(InputValidator::validate_phone("1234567890123456").is_err());
}

#[test]
fn test_validate_phone_with_letters() {
    assert!(InputValidator::validate_phone("555-CALL-NOW").is_err());
}

#[test]
fn test_validate_program_dates_valid() {
    assert!(InputValidator::validate_program_dates(date("2024-01-01"), date("2024-01-31")).is_ok());
}

#[test]
fn test_validate_program_dates_same_day() {
    assert!(InputValidator::validate_program_dates(date("2024-01-01"), date("2024-01-01")).is_ok());
}

#[test]
fn test_validate_program_dates_inverted() {
    assert!(InputValidator::validate_program_dates(date("2024-01-31"), date("2024-01-01")).is_err());
}

#[test]
fn test_validate_price_valid() {
    assert!(InputValidator::validate_price(49.99).is_ok());
}

#[test]
fn test_validate_price_zero() {
    assert!(InputValidator::validate_price(0.0).is_ok());
}

#[test]
fn test_validate_price_negative() {
    assert!(InputValidator::validate_price(-0.01).is_err());
}

#[test]
fn test_validate_price_nan() {
    assert!(InputValidator::validate_price(f64::NAN).is_err());
}

#[test]
fn test_validate_import_path_missing() {
    assert!(InputValidator::validate_import_path(Path::new("/no/such/file.csv")).is_err());
}

#[test]
fn test_validate_import_path_empty() {
    assert!(InputValidator::validate_import_path(Path::new("")).is_err());
}

#[test]
fn test_sanitize_text_strips_control_chars() {
    let sanitized = InputValidator::sanitize_text("Text\x00with\x01control");
    assert!(!sanitized.contains('\x00'));
    assert!(!sanitized.contains('\x01'));
}

#[test]
fn test_sanitize_text_preserves_newlines() {
    assert!(InputValidator::sanitize_text("Line1\nLine2").contains('\n'));
}

#[test]
fn test_sanitize_text_trims_whitespace() {
    assert_eq!(InputValidator::sanitize_text("  hello  "), "hello");
}
