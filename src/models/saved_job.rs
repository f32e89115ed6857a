// src/models/saved_job.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::JobWithCompany;

pub const DEFAULT_NOTIFICATION_DAYS: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedJob {
    pub id: String,
    pub user_id: String,
    pub job_id: String,
    pub notify_before_deadline: bool,
    pub notification_days: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedJobWithJob {
    #[serde(flatten)]
    pub saved: SavedJob,
    pub job: Option<JobWithCompany>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveJobInput {
    pub job_id: String,
    #[serde(default)]
    pub notify_before_deadline: bool,
    #[serde(default = "default_notification_days")]
    pub notification_days: i64,
}

fn default_notification_days() -> i64 {
    DEFAULT_NOTIFICATION_DAYS
}

/// A saved job joined with the fields needed to decide on a reminder.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReminderCandidate {
    pub saved_job_id: String,
    pub user_id: String,
    pub email: String,
    pub job_id: String,
    pub job_title: String,
    pub application_deadline: NaiveDate,
    pub notification_days: i64,
}
