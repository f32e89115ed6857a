// src/recommend.rs
//! Additive job recommendation score for a job seeker's profile.

use serde::Serialize;

use crate::models::{Job, JobWithCompany, Profile};

pub const LOCATION_POINTS: u32 = 30;
pub const SALARY_POINTS: u32 = 20;
pub const SKILL_POINTS: u32 = 10;
pub const MAX_MATCHED_SKILLS: u32 = 3;
pub const ROLE_POINTS: u32 = 20;
pub const RECOMMENDATION_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredJob {
    pub score: u32,
    #[serde(flatten)]
    pub job: JobWithCompany,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn score_job(profile: &Profile, job: &Job) -> u32 {
    let mut score = 0;

    if let Some(preferred) = profile.preferred_location.as_deref() {
        if contains_ignore_case(&job.location, preferred) {
            score += LOCATION_POINTS;
        }
    }

    if let (Some(expectation), Some(max)) = (profile.salary_expectation, job.salary_max) {
        if max >= expectation {
            score += SALARY_POINTS;
        }
    }

    let matched = profile
        .skills
        .iter()
        .filter(|skill| {
            job.requirements
                .iter()
                .any(|requirement| contains_ignore_case(requirement, skill))
        })
        .count() as u32;
    score += matched.min(MAX_MATCHED_SKILLS) * SKILL_POINTS;

    if let Some(role) = profile.desired_role.as_deref() {
        if contains_ignore_case(&job.title, role) {
            score += ROLE_POINTS;
        }
    }

    score
}

/// Score every job, best first, keeping at most the top ten. The sort is
/// stable, so equal scores keep the order the jobs came in.
pub fn recommend(profile: &Profile, jobs: Vec<JobWithCompany>) -> Vec<ScoredJob> {
    let mut scored: Vec<ScoredJob> = jobs
        .into_iter()
        .map(|job| ScoredJob {
            score: score_job(profile, &job.job),
            job,
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(RECOMMENDATION_LIMIT);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobType, ProfileSettings, UserType};
    use chrono::Utc;
    use sqlx::types::Json;

    fn profile() -> Profile {
        Profile {
            id: "anna".to_string(),
            email: "anna@example.de".to_string(),
            user_type: UserType::JobSeeker,
            full_name: "Anna".to_string(),
            phone: None,
            location: None,
            bio: None,
            skills: Json(vec![
                "Rust".to_string(),
                "PostgreSQL".to_string(),
                "Docker".to_string(),
                "Kubernetes".to_string(),
            ]),
            experience_years: Some(5),
            resume_url: None,
            desired_role: Some("backend".to_string()),
            preferred_location: Some("berlin".to_string()),
            salary_expectation: Some(70000),
            settings: Json(ProfileSettings::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn job(title: &str, location: &str, salary_max: Option<i64>, requirements: &[&str]) -> Job {
        Job {
            id: title.to_string(),
            company_id: "c1".to_string(),
            title: title.to_string(),
            description: String::new(),
            location: location.to_string(),
            job_type: JobType::FullTime,
            salary_min: None,
            salary_max,
            requirements: Json(requirements.iter().map(|r| r.to_string()).collect()),
            application_deadline: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn with_company(job: Job) -> JobWithCompany {
        JobWithCompany { job, company: None }
    }

    #[test]
    fn test_full_match_scores_one_hundred() {
        let j = job(
            "Senior Backend Engineer",
            "Berlin, Germany",
            Some(85000),
            &["3+ years of Rust", "PostgreSQL", "Docker and Kubernetes"],
        );
        assert_eq!(score_job(&profile(), &j), 100);
    }

    #[test]
    fn test_each_rule_in_isolation() {
        let p = profile();
        assert_eq!(score_job(&p, &job("Designer", "Berlin", None, &[])), 30);
        assert_eq!(score_job(&p, &job("Designer", "Köln", Some(70000), &[])), 20);
        assert_eq!(score_job(&p, &job("Designer", "Köln", Some(69999), &[])), 0);
        assert_eq!(score_job(&p, &job("Designer", "Köln", None, &["rust"])), 10);
        assert_eq!(score_job(&p, &job("Backend Dev", "Köln", None, &[])), 20);
    }

    #[test]
    fn test_skill_points_are_capped() {
        let j = job("X", "Y", None, &["Rust", "PostgreSQL", "Docker", "Kubernetes"]);
        assert_eq!(score_job(&profile(), &j), 30);
    }

    #[test]
    fn test_missing_preferences_score_nothing() {
        let mut p = profile();
        p.preferred_location = Some("  ".to_string());
        p.desired_role = None;
        p.salary_expectation = None;
        p.skills = Json(vec![]);
        assert_eq!(score_job(&p, &job("Backend", "Berlin", Some(1_000_000), &["Rust"])), 0);
    }

    #[test]
    fn test_recommend_sorts_and_limits() {
        let p = profile();
        let mut jobs = Vec::new();
        for i in 0..12 {
            jobs.push(with_company(job(&format!("Job {}", i), "Hamburg", None, &[])));
        }
        jobs.push(with_company(job("Backend Engineer", "Berlin", Some(90000), &[])));

        let result = recommend(&p, jobs);
        assert_eq!(result.len(), RECOMMENDATION_LIMIT);
        assert_eq!(result[0].job.job.title, "Backend Engineer");
        assert_eq!(result[0].score, 70);
        // ties keep input order
        assert_eq!(result[1].job.job.title, "Job 0");
        assert_eq!(result[2].job.job.title, "Job 1");
    }
}
