// src/repository/content.rs
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{BlogPost, Resource};

pub struct ContentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ContentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_blog_posts(&self, category: Option<&str>) -> Result<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT id, slug, title, excerpt, content, author, category, published_at
            FROM blog_posts
            WHERE (? IS NULL OR category = ?)
            ORDER BY published_at DESC
            "#,
        )
        .bind(category)
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(posts)
    }

    pub async fn get_blog_post(&self, slug: &str) -> Result<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT id, slug, title, excerpt, content, author, category, published_at
            FROM blog_posts WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(post)
    }

    pub async fn get_resources(&self, category: Option<&str>) -> Result<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT id, title, description, category, url, resource_type, created_at
            FROM resources
            WHERE (? IS NULL OR category = ?)
            ORDER BY title ASC
            "#,
        )
        .bind(category)
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(resources)
    }

    /// Insert or replace a post keyed by its slug.
    pub async fn upsert_blog_post(&self, post: &BlogPost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blog_posts (id, slug, title, excerpt, content, author, category, published_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title, excerpt = excluded.excerpt, content = excluded.content,
                author = excluded.author, category = excluded.category,
                published_at = excluded.published_at
            "#,
        )
        .bind(&post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.author)
        .bind(&post.category)
        .bind(post.published_at)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to store blog post {}", post.slug))?;

        info!("Stored blog post {}", post.slug);
        Ok(())
    }

    pub async fn insert_resource(&self, resource: &Resource) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO resources (id, title, description, category, url, resource_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&resource.id)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(&resource.category)
        .bind(&resource.url)
        .bind(&resource.resource_type)
        .bind(resource.created_at)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to store resource {}", resource.title))?;

        info!("Stored resource {}", resource.title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::models::new_id;
    use chrono::{Duration, Utc};

    fn post(slug: &str, category: &str, age_days: i64) -> BlogPost {
        BlogPost {
            id: new_id(),
            slug: slug.to_string(),
            title: slug.replace('-', " "),
            excerpt: None,
            content: "Inhalt".to_string(),
            author: Some("Redaktion".to_string()),
            category: Some(category.to_string()),
            published_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn test_blog_posts_by_category_and_slug() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(db.pool());
        repo.upsert_blog_post(&post("visa-guide", "visa", 3)).await.unwrap();
        repo.upsert_blog_post(&post("salary-report", "career", 1)).await.unwrap();
        repo.upsert_blog_post(&post("cv-tips", "career", 5)).await.unwrap();

        let all = repo.get_blog_posts(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].slug, "salary-report");

        let career = repo.get_blog_posts(Some("career")).await.unwrap();
        assert_eq!(career.len(), 2);

        assert!(repo.get_blog_post("visa-guide").await.unwrap().is_some());
        assert!(repo.get_blog_post("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_slug() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(db.pool());
        repo.upsert_blog_post(&post("visa-guide", "visa", 3)).await.unwrap();
        let mut updated = post("visa-guide", "visa", 0);
        updated.title = "Visa Guide 2026".to_string();
        repo.upsert_blog_post(&updated).await.unwrap();

        let all = repo.get_blog_posts(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Visa Guide 2026");
    }

    #[tokio::test]
    async fn test_resources_by_category() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(db.pool());
        for (title, category) in [("Anmeldung", "relocation"), ("Blue Card", "visa")] {
            repo.insert_resource(&Resource {
                id: new_id(),
                title: title.to_string(),
                description: None,
                category: Some(category.to_string()),
                url: None,
                resource_type: Some("guide".to_string()),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.get_resources(None).await.unwrap().len(), 2);
        let visa = repo.get_resources(Some("visa")).await.unwrap();
        assert_eq!(visa.len(), 1);
        assert_eq!(visa[0].title, "Blue Card");
    }
}
