// src/repository/saved_jobs.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::JobRepository;
use crate::models::{new_id, ReminderCandidate, SaveJobInput, SavedJob, SavedJobWithJob};

const SAVED_JOB_COLUMNS: &str =
    "id, user_id, job_id, notify_before_deadline, notification_days, created_at";

pub struct SavedJobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SavedJobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn is_saved(&self, user_id: &str, job_id: &str) -> Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM saved_jobs WHERE user_id = ? AND job_id = ?")
                .bind(user_id)
                .bind(job_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    pub async fn save_job(&self, user_id: &str, input: &SaveJobInput) -> Result<SavedJob> {
        let saved = SavedJob {
            id: new_id(),
            user_id: user_id.to_string(),
            job_id: input.job_id.clone(),
            notify_before_deadline: input.notify_before_deadline,
            notification_days: input.notification_days,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO saved_jobs (id, user_id, job_id, notify_before_deadline, notification_days, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&saved.id)
        .bind(&saved.user_id)
        .bind(&saved.job_id)
        .bind(saved.notify_before_deadline)
        .bind(saved.notification_days)
        .bind(saved.created_at)
        .execute(self.pool)
        .await
        .context("Failed to save job")?;

        info!("User {} saved job {}", user_id, saved.job_id);
        Ok(saved)
    }

    pub async fn get_saved_job(&self, id: &str) -> Result<Option<SavedJob>> {
        let saved = sqlx::query_as::<_, SavedJob>(&format!(
            "SELECT {} FROM saved_jobs WHERE id = ?",
            SAVED_JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(saved)
    }

    /// Saved jobs of a user, each with its job and company flattened in.
    pub async fn get_saved_jobs(&self, user_id: &str) -> Result<Vec<SavedJobWithJob>> {
        let saved = sqlx::query_as::<_, SavedJob>(&format!(
            "SELECT {} FROM saved_jobs WHERE user_id = ? ORDER BY created_at DESC",
            SAVED_JOB_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let jobs = JobRepository::new(self.pool);
        let mut result = Vec::with_capacity(saved.len());
        for entry in saved {
            let job = jobs.get_job(&entry.job_id).await?;
            result.push(SavedJobWithJob { saved: entry, job });
        }
        Ok(result)
    }

    pub async fn update_notification(
        &self,
        id: &str,
        user_id: &str,
        notify_before_deadline: bool,
        notification_days: i64,
    ) -> Result<Option<SavedJob>> {
        let result = sqlx::query(
            r#"
            UPDATE saved_jobs SET notify_before_deadline = ?, notification_days = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(notify_before_deadline)
        .bind(notification_days)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_saved_job(id).await
    }

    pub async fn unsave_job(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Saved jobs that asked for a reminder and whose job has a deadline.
    pub async fn reminder_candidates(&self, user_id: Option<&str>) -> Result<Vec<ReminderCandidate>> {
        let candidates = sqlx::query_as::<_, ReminderCandidate>(
            r#"
            SELECT s.id AS saved_job_id, s.user_id, p.email, j.id AS job_id, j.title AS job_title,
                   j.application_deadline, s.notification_days
            FROM saved_jobs s
            JOIN jobs j ON j.id = s.job_id
            JOIN profiles p ON p.id = s.user_id
            WHERE s.notify_before_deadline = TRUE
              AND j.application_deadline IS NOT NULL
              AND j.is_active = TRUE
              AND (? IS NULL OR s.user_id = ?)
            ORDER BY j.application_deadline ASC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::models::UserType;
    use crate::repository::test_support::{job_input, seed_company, seed_user};

    #[tokio::test]
    async fn test_save_list_update_unsave() {
        let db = Database::in_memory().await.unwrap();
        let company = seed_company(&db, "firma", "Acme").await;
        seed_user(&db, "anna", UserType::JobSeeker).await;
        let job = JobRepository::new(db.pool())
            .create_job(&job_input(&company, "Engineer", (None, None)))
            .await
            .unwrap();
        let repo = SavedJobRepository::new(db.pool());

        let saved = repo
            .save_job(
                "anna",
                &SaveJobInput {
                    job_id: job.id.clone(),
                    notify_before_deadline: false,
                    notification_days: 3,
                },
            )
            .await
            .unwrap();
        assert!(repo.is_saved("anna", &job.id).await.unwrap());

        let listed = repo.get_saved_jobs("anna").await.unwrap();
        assert_eq!(listed.len(), 1);
        let listed_job = listed[0].job.as_ref().unwrap();
        assert_eq!(listed_job.job.title, "Engineer");
        assert_eq!(listed_job.company.as_ref().unwrap().name, "Acme");

        assert!(repo.reminder_candidates(Some("anna")).await.unwrap().is_empty());
        let updated = repo
            .update_notification(&saved.id, "anna", true, 7)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.notify_before_deadline);
        assert_eq!(updated.notification_days, 7);

        let candidates = repo.reminder_candidates(None).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].email, "anna@example.de");

        assert!(repo.update_notification(&saved.id, "other", true, 1).await.unwrap().is_none());
        assert!(!repo.unsave_job(&saved.id, "other").await.unwrap());
        assert!(repo.unsave_job(&saved.id, "anna").await.unwrap());
        assert!(!repo.is_saved("anna", &job.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_save_is_rejected() {
        let db = Database::in_memory().await.unwrap();
        let company = seed_company(&db, "firma", "Acme").await;
        seed_user(&db, "anna", UserType::JobSeeker).await;
        let job = JobRepository::new(db.pool())
            .create_job(&job_input(&company, "Engineer", (None, None)))
            .await
            .unwrap();
        let repo = SavedJobRepository::new(db.pool());
        let input = SaveJobInput {
            job_id: job.id.clone(),
            notify_before_deadline: true,
            notification_days: 3,
        };

        repo.save_job("anna", &input).await.unwrap();
        assert!(repo.save_job("anna", &input).await.is_err());
    }
}
