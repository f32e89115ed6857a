// src/validation.rs
//! Form validation run before anything touches storage.

use reqwest::Url;
use serde::Serialize;
use std::fmt;

use crate::models::{ApplicationInput, CompanyInput, JobInput, JobUpdate};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_COVER_LETTER_LENGTH: usize = 5000;
pub const MAX_NOTIFICATION_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// One human readable line per failing field.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    fn optional_url(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            if !is_http_url(value) {
                self.add(field, "must be a valid http(s) URL");
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_http_url(value: &str) -> bool {
    Url::parse(value.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Problems with a password, empty when it is acceptable.
pub fn password_problems(password: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push("must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        problems.push("must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        problems.push("must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("must contain a digit");
    }
    problems
}

pub fn validate_password(password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for problem in password_problems(password) {
        errors.add("password", problem);
    }
    errors.into_result()
}

pub fn validate_sign_up(email: &str, password: &str, full_name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !is_valid_email(email) {
        errors.add("email", "must be a valid email address");
    }
    for problem in password_problems(password) {
        errors.add("password", problem);
    }
    errors.required("full_name", full_name);
    errors.into_result()
}

pub fn validate_company(input: &CompanyInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.required("name", &input.name);
    errors.required("industry", &input.industry);
    errors.required("location", &input.location);
    errors.optional_url("website", input.website.as_deref());
    errors.optional_url("linkedin_url", input.linkedin_url.as_deref());
    errors.optional_url("twitter_url", input.twitter_url.as_deref());
    errors.optional_url("facebook_url", input.facebook_url.as_deref());
    errors.into_result()
}

fn check_salaries(errors: &mut ValidationErrors, min: Option<i64>, max: Option<i64>) {
    if min.is_some_and(|v| v < 0) {
        errors.add("salary_min", "must not be negative");
    }
    if max.is_some_and(|v| v < 0) {
        errors.add("salary_max", "must not be negative");
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            errors.add("salary_max", "must be greater than or equal to salary_min");
        }
    }
}

pub fn validate_job(input: &JobInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.required("company_id", &input.company_id);
    errors.required("title", &input.title);
    errors.required("description", &input.description);
    errors.required("location", &input.location);
    check_salaries(&mut errors, input.salary_min, input.salary_max);
    errors.into_result()
}

/// `current` supplies stored salaries so a partial update is checked against them.
pub fn validate_job_update(
    update: &JobUpdate,
    current: (Option<i64>, Option<i64>),
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for (field, value) in [
        ("title", &update.title),
        ("description", &update.description),
        ("location", &update.location),
    ] {
        if let Some(value) = value {
            errors.required(field, value);
        }
    }
    check_salaries(
        &mut errors,
        update.salary_min.or(current.0),
        update.salary_max.or(current.1),
    );
    errors.into_result()
}

pub fn validate_application(input: &ApplicationInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.required("cover_letter", &input.cover_letter);
    if input.cover_letter.chars().count() > MAX_COVER_LETTER_LENGTH {
        errors.add("cover_letter", "must be at most 5000 characters");
    }
    errors.optional_url("resume_url", input.resume_url.as_deref());
    errors.into_result()
}

pub fn validate_notification_days(days: i64) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !(1..=MAX_NOTIFICATION_DAYS).contains(&days) {
        errors.add("notification_days", "must be between 1 and 30");
    }
    errors.into_result()
}

pub fn validate_contact(name: &str, email: &str, message: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.required("name", name);
    if !is_valid_email(email) {
        errors.add("email", "must be a valid email address");
    }
    errors.required("message", message);
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobType;

    #[test]
    fn test_password_without_digit_is_rejected() {
        let err = validate_sign_up("anna@example.de", "NoDigitsHere", "Anna")
            .unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].message, "must contain a digit");
    }

    #[test]
    fn test_password_rules() {
        assert!(password_problems("Sicher123").is_empty());
        assert_eq!(password_problems("Ab1").len(), 1);
        assert_eq!(password_problems("lowercase1").len(), 1);
        assert_eq!(password_problems("UPPERCASE1").len(), 1);
        assert_eq!(password_problems("").len(), 4);
    }

    #[test]
    fn test_sign_up_collects_every_field() {
        let err = validate_sign_up("not-an-email", "Sicher123", "  ").unwrap_err();
        assert!(err.has("email"));
        assert!(err.has("full_name"));
        assert!(!err.has("password"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("anna@example.de"));
        assert!(is_valid_email(" anna.schmidt+jobs@mail.example.de "));
        assert!(!is_valid_email("anna@"));
        assert!(!is_valid_email("@example.de"));
        assert!(!is_valid_email("anna@example"));
        assert!(!is_valid_email("an na@example.de"));
        assert!(!is_valid_email("a@b@c.de"));
    }

    #[test]
    fn test_company_urls() {
        let mut input = CompanyInput {
            name: "Acme".to_string(),
            industry: "Software".to_string(),
            location: "Berlin".to_string(),
            website: Some("https://acme.de".to_string()),
            ..Default::default()
        };
        assert!(validate_company(&input).is_ok());

        input.linkedin_url = Some("linkedin.com/acme".to_string());
        input.twitter_url = Some("ftp://acme.de".to_string());
        input.facebook_url = Some(String::new());
        let err = validate_company(&input).unwrap_err();
        assert!(err.has("linkedin_url"));
        assert!(err.has("twitter_url"));
        assert!(!err.has("facebook_url"));
    }

    #[test]
    fn test_job_salary_range() {
        let mut input = JobInput {
            company_id: "c1".to_string(),
            title: "Engineer".to_string(),
            description: "Build things".to_string(),
            location: "Berlin".to_string(),
            job_type: JobType::FullTime,
            salary_min: Some(70000),
            salary_max: Some(50000),
            requirements: vec![],
            application_deadline: None,
        };
        assert!(validate_job(&input).unwrap_err().has("salary_max"));

        input.salary_max = Some(90000);
        assert!(validate_job(&input).is_ok());

        let update = JobUpdate {
            salary_min: Some(95000),
            ..Default::default()
        };
        assert!(validate_job_update(&update, (Some(70000), Some(90000))).is_err());
        assert!(validate_job_update(&JobUpdate::default(), (Some(1), Some(2))).is_ok());

        let blank_title = JobUpdate {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(validate_job_update(&blank_title, (None, None)).unwrap_err().has("title"));
    }

    #[test]
    fn test_application_rules() {
        let ok = ApplicationInput {
            cover_letter: "Hello".to_string(),
            resume_url: Some("https://files.example.de/cv.pdf".to_string()),
        };
        assert!(validate_application(&ok).is_ok());

        let too_long = ApplicationInput {
            cover_letter: "x".repeat(MAX_COVER_LETTER_LENGTH + 1),
            resume_url: Some("cv.pdf".to_string()),
        };
        let err = validate_application(&too_long).unwrap_err();
        assert!(err.has("cover_letter"));
        assert!(err.has("resume_url"));
    }

    #[test]
    fn test_notification_days_and_contact() {
        assert!(validate_notification_days(1).is_ok());
        assert!(validate_notification_days(0).is_err());
        assert!(validate_notification_days(31).is_err());

        assert!(validate_contact("Anna", "anna@example.de", "Hallo").is_ok());
        let err = validate_contact("", "x", "").unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert!(err.to_string().starts_with("validation failed"));
    }
}
