// src/repository/applications.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{
    new_id, Application, ApplicationInput, ApplicationJobRow, ApplicationStatus,
    ApplicationWithJob, ReceivedApplication, ReceivedApplicationRow,
};

const APPLICATION_COLUMNS: &str =
    "a.id, a.job_id, a.user_id, a.status, a.cover_letter, a.resume_url, a.created_at, a.updated_at";

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn has_applied(&self, job_id: &str, user_id: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM job_applications WHERE job_id = ? AND user_id = ?",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn apply(&self, job_id: &str, user_id: &str, input: &ApplicationInput) -> Result<Application> {
        let now = Utc::now();
        let application = Application {
            id: new_id(),
            job_id: job_id.to_string(),
            user_id: user_id.to_string(),
            status: ApplicationStatus::Pending,
            cover_letter: input.cover_letter.trim().to_string(),
            resume_url: input.resume_url.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO job_applications (id, job_id, user_id, status, cover_letter, resume_url,
                                          created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&application.id)
        .bind(&application.job_id)
        .bind(&application.user_id)
        .bind(application.status)
        .bind(&application.cover_letter)
        .bind(&application.resume_url)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(self.pool)
        .await
        .context("Failed to insert application")?;

        info!("User {} applied to job {}", user_id, job_id);
        Ok(application)
    }

    pub async fn get_application(&self, id: &str) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM job_applications a WHERE a.id = ?",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(application)
    }

    /// Owner id of the company behind an application's job.
    pub async fn owner_of(&self, application_id: &str) -> Result<Option<String>> {
        let owner: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT c.owner_id
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN companies c ON c.id = j.company_id
            WHERE a.id = ?
            "#,
        )
        .bind(application_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner.map(|(id,)| id))
    }

    pub async fn get_user_applications(&self, user_id: &str) -> Result<Vec<ApplicationWithJob>> {
        let rows = sqlx::query_as::<_, ApplicationJobRow>(&format!(
            r#"
            SELECT {},
                   j.title AS j_title, j.location AS j_location,
                   c.id AS c_id, c.name AS c_name, c.logo_url AS c_logo_url,
                   c.location AS c_location, c.industry AS c_industry
            FROM job_applications a
            LEFT JOIN jobs j ON j.id = a.job_id
            LEFT JOIN companies c ON c.id = j.company_id
            WHERE a.user_id = ?
            ORDER BY a.created_at DESC
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ApplicationWithJob::from).collect())
    }

    /// Applications to every job of every company owned by `owner_id`.
    pub async fn get_applications_for_owner(&self, owner_id: &str) -> Result<Vec<ReceivedApplication>> {
        let rows = sqlx::query_as::<_, ReceivedApplicationRow>(&format!(
            r#"
            SELECT {},
                   j.title AS j_title, j.location AS j_location,
                   p.full_name AS p_full_name, p.email AS p_email
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN companies c ON c.id = j.company_id
            LEFT JOIN profiles p ON p.id = a.user_id
            WHERE c.owner_id = ?
            ORDER BY a.created_at DESC
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ReceivedApplication::from).collect())
    }

    pub async fn update_status(&self, id: &str, status: ApplicationStatus) -> Result<Option<Application>> {
        let result = sqlx::query("UPDATE job_applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Application {} moved to {:?}", id, status);
        self.get_application(id).await
    }

    /// Remove an application owned by `user_id`.
    pub async fn withdraw(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_applications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
