// src/repository/jobs.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::{contains_folded, search_term};
use crate::models::{new_id, Job, JobCompanyRow, JobFilter, JobInput, JobUpdate, JobWithCompany};

const JOB_WITH_COMPANY_SELECT: &str = r#"
    SELECT j.id, j.company_id, j.title, j.description, j.location, j.job_type, j.salary_min,
           j.salary_max, j.requirements, j.application_deadline, j.is_active, j.created_at,
           j.updated_at,
           c.id AS c_id, c.name AS c_name, c.logo_url AS c_logo_url,
           c.location AS c_location, c.industry AS c_industry
    FROM jobs j
    LEFT JOIN companies c ON c.id = j.company_id
"#;

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Jobs matching `filter`, newest first, with their company flattened in.
    pub async fn get_jobs(&self, filter: &JobFilter) -> Result<Vec<JobWithCompany>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(JOB_WITH_COMPANY_SELECT);
        builder.push(" WHERE 1 = 1");

        if let Some(job_type) = filter.job_type {
            builder.push(" AND j.job_type = ").push_bind(job_type);
        }
        if let Some(company_id) = &filter.company_id {
            builder.push(" AND j.company_id = ").push_bind(company_id);
        }
        if let Some(salary_min) = filter.salary_min {
            builder.push(" AND j.salary_min >= ").push_bind(salary_min);
        }
        if let Some(salary_max) = filter.salary_max {
            builder.push(" AND j.salary_max <= ").push_bind(salary_max);
        }
        if filter.active_only {
            builder.push(" AND j.is_active = TRUE");
        }
        builder.push(" ORDER BY j.created_at DESC");

        let rows = builder
            .build_query_as::<JobCompanyRow>()
            .fetch_all(self.pool)
            .await?;

        let search = search_term(filter.search.as_deref());
        let location = search_term(filter.location.as_deref());

        Ok(rows
            .into_iter()
            .map(JobWithCompany::from)
            .filter(|row| {
                search.as_deref().map_or(true, |term| {
                    contains_folded(&row.job.title, term) || contains_folded(&row.job.description, term)
                })
            })
            .filter(|row| {
                location
                    .as_deref()
                    .map_or(true, |term| contains_folded(&row.job.location, term))
            })
            .collect())
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<JobWithCompany>> {
        let row = sqlx::query_as::<_, JobCompanyRow>(&format!(
            "{} WHERE j.id = ?",
            JOB_WITH_COMPANY_SELECT
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(JobWithCompany::from))
    }

    pub async fn latest_jobs(&self, limit: i64) -> Result<Vec<JobWithCompany>> {
        let rows = sqlx::query_as::<_, JobCompanyRow>(&format!(
            "{} WHERE j.is_active = TRUE ORDER BY j.created_at DESC LIMIT ?",
            JOB_WITH_COMPANY_SELECT
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(JobWithCompany::from).collect())
    }

    pub async fn create_job(&self, input: &JobInput) -> Result<Job> {
        let now = Utc::now();
        let job = Job {
            id: new_id(),
            company_id: input.company_id.clone(),
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            location: input.location.trim().to_string(),
            job_type: input.job_type,
            salary_min: input.salary_min,
            salary_max: input.salary_max,
            requirements: Json(input.requirements.clone()),
            application_deadline: input.application_deadline,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO jobs (id, company_id, title, description, location, job_type, salary_min,
                              salary_max, requirements, application_deadline, is_active,
                              created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, TRUE, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.company_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.job_type)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.requirements)
        .bind(job.application_deadline)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(self.pool)
        .await
        .context("Failed to insert job")?;

        info!("Created job {} ({}) for company {}", job.title, job.id, job.company_id);
        Ok(job)
    }

    pub async fn update_job(&self, id: &str, update: &JobUpdate) -> Result<Option<JobWithCompany>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE jobs SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(v) = &update.title {
            builder.push(", title = ").push_bind(v.trim());
        }
        if let Some(v) = &update.description {
            builder.push(", description = ").push_bind(v);
        }
        if let Some(v) = &update.location {
            builder.push(", location = ").push_bind(v.trim());
        }
        if let Some(v) = update.job_type {
            builder.push(", job_type = ").push_bind(v);
        }
        if let Some(v) = update.salary_min {
            builder.push(", salary_min = ").push_bind(v);
        }
        if let Some(v) = update.salary_max {
            builder.push(", salary_max = ").push_bind(v);
        }
        if let Some(v) = &update.requirements {
            builder.push(", requirements = ").push_bind(Json(v.clone()));
        }
        if let Some(v) = update.application_deadline {
            builder.push(", application_deadline = ").push_bind(v);
        }
        if let Some(v) = update.is_active {
            builder.push(", is_active = ").push_bind(v);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Updated job {}", id);
        self.get_job(id).await
    }

    pub async fn delete_job(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted job {}", id);
        }
        Ok(deleted)
    }
}
