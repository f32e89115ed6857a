// src/repository/mod.rs
//! Typed data access over the relational store, one repository per table.

pub mod applications;
pub mod companies;
pub mod content;
pub mod jobs;
pub mod profiles;
pub mod saved_jobs;

pub use applications::ApplicationRepository;
pub use companies::CompanyRepository;
pub use content::ContentRepository;
pub use jobs::JobRepository;
pub use profiles::{ProfileRepository, SettingsUpdate};
pub use saved_jobs::SavedJobRepository;

/// Trimmed, lower-cased search term; a blank term filters nothing.
pub(crate) fn search_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Case-insensitive containment over full Unicode. `needle` comes from `search_term`.
///
/// SQLite's `LIKE` only folds ASCII, so free-text filters run here instead.
pub(crate) fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// True when the root cause is a UNIQUE constraint failure.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::core::Database;
    use crate::models::{CompanyInput, JobInput, JobType, NewProfile, UserType};

    pub async fn seed_user(db: &Database, id: &str, user_type: UserType) {
        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, 'x', ?)")
            .bind(id)
            .bind(format!("{}@example.de", id))
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();
        ProfileRepository::create_profile(
            db.pool(),
            &NewProfile {
                id: id.to_string(),
                email: format!("{}@example.de", id),
                user_type,
                full_name: format!("User {}", id),
            },
        )
        .await
        .unwrap();
    }

    pub fn company_input(name: &str, location: &str) -> CompanyInput {
        CompanyInput {
            name: name.to_string(),
            industry: "Software".to_string(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    pub fn job_input(company_id: &str, title: &str, salary: (Option<i64>, Option<i64>)) -> JobInput {
        JobInput {
            company_id: company_id.to_string(),
            title: title.to_string(),
            description: format!("{} wanted", title),
            location: "Berlin".to_string(),
            job_type: JobType::FullTime,
            salary_min: salary.0,
            salary_max: salary.1,
            requirements: vec!["Rust".to_string()],
            application_deadline: NaiveDate::from_ymd_opt(2030, 1, 31),
        }
    }

    /// Employer `owner` with one company; returns the company id.
    pub async fn seed_company(db: &Database, owner: &str, name: &str) -> String {
        seed_user(db, owner, UserType::Employer).await;
        CompanyRepository::new(db.pool())
            .create_company(owner, &company_input(name, "Berlin"))
            .await
            .unwrap()
            .id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_folds_umlauts() {
        assert_eq!(search_term(Some("  ÄRZTIN ")), Some("ärztin".to_string()));
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(None), None);
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Ärztin (m/w/d)", "ärztin"));
        assert!(contains_folded("Wien, Österreich", "österreich"));
        assert!(contains_folded("100% remote", "100%"));
        assert!(!contains_folded("Rust_Engineer", "rust engineer"));
    }
}
