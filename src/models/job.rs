// src/models/job.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::str::FromStr;

use super::CompanySummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl FromStr for JobType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_time" => Ok(JobType::FullTime),
            "part_time" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "internship" => Ok(JobType::Internship),
            "freelance" => Ok(JobType::Freelance),
            other => anyhow::bail!("Unknown job type: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub requirements: Json<Vec<String>>,
    pub application_deadline: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job with its company relation flattened to a single optional object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobWithCompany {
    #[serde(flatten)]
    pub job: Job,
    pub company: Option<CompanySummary>,
}

/// Row shape of `jobs LEFT JOIN companies`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct JobCompanyRow {
    #[sqlx(flatten)]
    pub job: Job,
    pub c_id: Option<String>,
    pub c_name: Option<String>,
    pub c_logo_url: Option<String>,
    pub c_location: Option<String>,
    pub c_industry: Option<String>,
}

impl From<JobCompanyRow> for JobWithCompany {
    fn from(row: JobCompanyRow) -> Self {
        let company = match (row.c_id, row.c_name) {
            (Some(id), Some(name)) => Some(CompanySummary {
                id,
                name,
                logo_url: row.c_logo_url,
                location: row.c_location.unwrap_or_default(),
                industry: row.c_industry.unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            job: row.job,
            company,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub requirements: Option<Vec<String>>,
    pub application_deadline: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Query parameters for job listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobFilter {
    /// Pattern match against title and description.
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub company_id: Option<String>,
    /// Only jobs whose `salary_min` is at least this value.
    pub salary_min: Option<i64>,
    /// Only jobs whose `salary_max` is at most this value.
    pub salary_max: Option<i64>,
    pub active_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_parses_snake_case() {
        assert_eq!("part_time".parse::<JobType>().unwrap(), JobType::PartTime);
        assert!("Part Time".parse::<JobType>().is_err());
    }

    #[test]
    fn test_missing_company_flattens_to_none() {
        let json = serde_json::json!({
            "id": "j1", "company_id": "c1", "title": "Dev", "description": "d",
            "location": "Berlin", "job_type": "contract", "salary_min": null,
            "salary_max": null, "requirements": [], "application_deadline": null,
            "is_active": true, "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z", "company": null
        });
        let job: JobWithCompany = serde_json::from_value(json).unwrap();
        assert!(job.company.is_none());
        assert_eq!(job.job.job_type, JobType::Contract);
    }
}
