use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"))
}

#[allow(clippy::expect_used)]
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+\d()\-\s]{7,}$").expect("static pattern"))
}

/// Validation utilities for form input and import arguments
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate the profile display name
    pub fn validate_full_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Please enter your name"));
        }

        if name.len() > 100 {
            return Err(anyhow!("Name too long (max 100 characters)"));
        }

        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(anyhow!("Name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(anyhow!("Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(anyhow!("Email too long (max 254 characters)"));
        }

        if !email_pattern().is_match(email) {
            return Err(anyhow!("Enter a valid email"));
        }

        Ok(())
    }

    /// Validate phone number format
    pub fn validate_phone(phone: &str) -> Result<()> {
        if phone.trim().is_empty() {
            return Err(anyhow!("Phone number cannot be empty"));
        }

        if !phone_pattern().is_match(phone) {
            return Err(anyhow!("Enter a valid phone number"));
        }

        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if !(7..=15).contains(&digits) {
            return Err(anyhow!("Phone number must be between 7 and 15 digits"));
        }

        Ok(())
    }

    /// Validate a wellness program's date range: the end date may not
    /// precede the start date.
    pub fn validate_program_dates(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if end < start {
            return Err(anyhow!("End date cannot be before start date"));
        }
        Ok(())
    }

    /// Validate a wellness program price
    pub fn validate_price(price: f64) -> Result<()> {
        if !price.is_finite() {
            return Err(anyhow!("Price must be a number"));
        }
        if price < 0.0 {
            return Err(anyhow!("Price cannot be negative"));
        }
        Ok(())
    }

    /// Validate an import file path
    pub fn validate_import_path(path: &Path) -> Result<()> {
        if path.to_string_lossy().is_empty() {
            return Err(anyhow!("Please select a file"));
        }

        if !path.exists() {
            return Err(anyhow!("File does not exist: {path:?}"));
        }

        if !path.is_file() {
            return Err(anyhow!("Not a file: {path:?}"));
        }

        Ok(())
    }

    /// Sanitize free-form text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect::<String>()
            .trim()
            .to_string()
    }
}
