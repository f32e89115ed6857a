// src/repository/companies.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::{contains_folded, search_term};
use crate::models::{new_id, Company, CompanyFilter, CompanyInput};

const COMPANY_COLUMNS: &str = "id, owner_id, name, description, industry, size, location, website, \
     logo_url, benefits, linkedin_url, twitter_url, facebook_url, created_at, updated_at";

pub struct CompanyRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CompanyRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_companies(&self, filter: &CompanyFilter) -> Result<Vec<Company>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM companies WHERE 1 = 1", COMPANY_COLUMNS));

        if let Some(industry) = &filter.industry {
            builder.push(" AND industry = ").push_bind(industry);
        }
        if let Some(size) = &filter.size {
            builder.push(" AND size = ").push_bind(size);
        }
        if let Some(owner_id) = &filter.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        builder.push(" ORDER BY name ASC");

        let companies = builder
            .build_query_as::<Company>()
            .fetch_all(self.pool)
            .await?;

        let search = search_term(filter.search.as_deref());
        let location = search_term(filter.location.as_deref());

        Ok(companies
            .into_iter()
            .filter(|c| search.as_deref().map_or(true, |term| contains_folded(&c.name, term)))
            .filter(|c| {
                location
                    .as_deref()
                    .map_or(true, |term| contains_folded(&c.location, term))
            })
            .collect())
    }

    pub async fn get_company(&self, id: &str) -> Result<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies WHERE id = ?",
            COMPANY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(company)
    }

    pub async fn get_companies_by_owner(&self, owner_id: &str) -> Result<Vec<Company>> {
        self.get_companies(&CompanyFilter {
            owner_id: Some(owner_id.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn latest_companies(&self, limit: i64) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies ORDER BY created_at DESC LIMIT ?",
            COMPANY_COLUMNS
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(companies)
    }

    pub async fn create_company(&self, owner_id: &str, input: &CompanyInput) -> Result<Company> {
        let now = Utc::now();
        let company = Company {
            id: new_id(),
            owner_id: owner_id.to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            industry: input.industry.trim().to_string(),
            size: input.size.clone(),
            location: input.location.trim().to_string(),
            website: input.website.clone(),
            logo_url: None,
            benefits: Json(input.benefits.clone()),
            linkedin_url: input.linkedin_url.clone(),
            twitter_url: input.twitter_url.clone(),
            facebook_url: input.facebook_url.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO companies (id, owner_id, name, description, industry, size, location, website,
                                   logo_url, benefits, linkedin_url, twitter_url, facebook_url,
                                   created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&company.id)
        .bind(&company.owner_id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(&company.industry)
        .bind(&company.size)
        .bind(&company.location)
        .bind(&company.website)
        .bind(&company.benefits)
        .bind(&company.linkedin_url)
        .bind(&company.twitter_url)
        .bind(&company.facebook_url)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(self.pool)
        .await
        .context("Failed to insert company")?;

        info!("Created company {} ({}) for owner {}", company.name, company.id, owner_id);
        Ok(company)
    }

    /// Replace the editable fields of a company.
    pub async fn update_company(&self, id: &str, input: &CompanyInput) -> Result<Option<Company>> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET name = ?, description = ?, industry = ?, size = ?, location = ?, website = ?,
                benefits = ?, linkedin_url = ?, twitter_url = ?, facebook_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.industry.trim())
        .bind(&input.size)
        .bind(input.location.trim())
        .bind(&input.website)
        .bind(Json(&input.benefits))
        .bind(&input.linkedin_url)
        .bind(&input.twitter_url)
        .bind(&input.facebook_url)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Updated company {}", id);
        self.get_company(id).await
    }

    pub async fn set_logo_url(&self, id: &str, logo_url: Option<&str>) -> Result<bool> {
        let result = sqlx::query("UPDATE companies SET logo_url = ?, updated_at = ? WHERE id = ?")
            .bind(logo_url)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the company's jobs, then the company itself. Returns the number
    /// of jobs removed, or `None` when the company does not exist.
    pub async fn delete_company(&self, id: &str) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let jobs = sqlx::query("DELETE FROM jobs WHERE company_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete company jobs")?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete company")?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        info!("Deleted company {} and {} jobs", id, jobs);
        Ok(Some(jobs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::models::UserType;
    use crate::repository::test_support::{company_input, job_input, seed_company, seed_user};
    use crate::repository::JobRepository;

    #[tokio::test]
    async fn test_filters_combine() {
        let db = Database::in_memory().await.unwrap();
        seed_user(&db, "owner", UserType::Employer).await;
        let repo = CompanyRepository::new(db.pool());

        repo.create_company("owner", &company_input("Acme Berlin", "Berlin")).await.unwrap();
        repo.create_company("owner", &company_input("Muster GmbH", "München")).await.unwrap();
        let mut health = company_input("Care AG", "Berlin-Mitte");
        health.industry = "Healthcare".to_string();
        repo.create_company("owner", &health).await.unwrap();

        let berlin = repo
            .get_companies(&CompanyFilter {
                location: Some("berlin".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(berlin.len(), 2);

        let software_berlin = repo
            .get_companies(&CompanyFilter {
                location: Some("Berlin".to_string()),
                industry: Some("Software".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(software_berlin.len(), 1);
        assert_eq!(software_berlin[0].name, "Acme Berlin");

        let searched = repo
            .get_companies(&CompanyFilter {
                search: Some("GMBH".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);

        repo.create_company("owner", &company_input("Ärztekammer", "Österreich")).await.unwrap();
        let chamber = repo
            .get_companies(&CompanyFilter {
                search: Some("ärzte".to_string()),
                location: Some("österreich".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(chamber.len(), 1);
        assert_eq!(chamber[0].name, "Ärztekammer");
    }

    #[tokio::test]
    async fn test_get_missing_company_is_none() {
        let db = Database::in_memory().await.unwrap();
        let repo = CompanyRepository::new(db.pool());
        assert!(repo.get_company("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_company_replaces_fields() {
        let db = Database::in_memory().await.unwrap();
        let id = seed_company(&db, "owner", "Acme").await;
        let repo = CompanyRepository::new(db.pool());

        let mut input = company_input("Acme SE", "Hamburg");
        input.benefits = vec!["Remote".to_string()];
        let updated = repo.update_company(&id, &input).await.unwrap().unwrap();
        assert_eq!(updated.name, "Acme SE");
        assert_eq!(updated.location, "Hamburg");
        assert_eq!(updated.benefits.0, vec!["Remote"]);
    }

    #[tokio::test]
    async fn test_delete_company_removes_jobs_first() {
        let db = Database::in_memory().await.unwrap();
        let id = seed_company(&db, "owner", "Acme").await;
        let jobs = JobRepository::new(db.pool());
        jobs.create_job(&job_input(&id, "Engineer", (None, None))).await.unwrap();
        jobs.create_job(&job_input(&id, "Designer", (None, None))).await.unwrap();

        // jobs.company_id has no cascade, so this only succeeds when jobs go first
        let removed = CompanyRepository::new(db.pool()).delete_company(&id).await.unwrap();
        assert_eq!(removed, Some(2));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(CompanyRepository::new(db.pool()).get_company(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_company_row_cannot_go_while_jobs_remain() {
        let db = Database::in_memory().await.unwrap();
        let id = seed_company(&db, "owner", "Acme").await;
        JobRepository::new(db.pool())
            .create_job(&job_input(&id, "Engineer", (None, None)))
            .await
            .unwrap();

        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(&id)
            .execute(db.pool())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_company() {
        let db = Database::in_memory().await.unwrap();
        let repo = CompanyRepository::new(db.pool());
        assert_eq!(repo.delete_company("nope").await.unwrap(), None);
    }
}
