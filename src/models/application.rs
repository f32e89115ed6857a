// src/models/application.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CompanySummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationInput {
    pub cover_letter: String,
    #[serde(default)]
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

/// An application as seen by the applicant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobSummary>,
    pub company: Option<CompanySummary>,
}

/// An application as seen by the employer that owns the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedApplication {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobSummary>,
    pub applicant: Option<ApplicantSummary>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ApplicationJobRow {
    #[sqlx(flatten)]
    pub application: Application,
    pub j_title: Option<String>,
    pub j_location: Option<String>,
    pub c_id: Option<String>,
    pub c_name: Option<String>,
    pub c_logo_url: Option<String>,
    pub c_location: Option<String>,
    pub c_industry: Option<String>,
}

impl From<ApplicationJobRow> for ApplicationWithJob {
    fn from(row: ApplicationJobRow) -> Self {
        let job = row.j_title.map(|title| JobSummary {
            id: row.application.job_id.clone(),
            title,
            location: row.j_location.unwrap_or_default(),
        });
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
            application: row.application,
            job,
            company,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReceivedApplicationRow {
    #[sqlx(flatten)]
    pub application: Application,
    pub j_title: Option<String>,
    pub j_location: Option<String>,
    pub p_full_name: Option<String>,
    pub p_email: Option<String>,
}

impl From<ReceivedApplicationRow> for ReceivedApplication {
    fn from(row: ReceivedApplicationRow) -> Self {
        let job = row.j_title.map(|title| JobSummary {
            id: row.application.job_id.clone(),
            title,
            location: row.j_location.unwrap_or_default(),
        });
        let applicant = row.p_full_name.map(|full_name| ApplicantSummary {
            id: row.application.user_id.clone(),
            full_name,
            email: row.p_email.unwrap_or_default(),
        });
        Self {
            application: row.application,
            job,
            applicant,
        }
    }
}
