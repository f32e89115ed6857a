// src/admin_cli.rs
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::{ConfigManager, Database};
use crate::models::{new_id, BlogPost, Resource};
use crate::reminders::load_due_reminders;
use crate::repository::{ContentRepository, ProfileRepository};
use crate::utils::{non_empty, slugify};

#[derive(Args)]
pub struct AdminCli {
    #[command(subcommand)]
    pub command: AdminCommand,

    /// Overrides the configured database path
    #[arg(long)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Initialize the database
    Init,
    /// List all profiles
    ListProfiles,
    /// Import blog posts from a CSV file (slug,title,excerpt,content,author,category,published_at)
    ImportBlogPosts { csv_file: PathBuf },
    /// Import resources from a CSV file (title,description,category,url,resource_type)
    ImportResources { csv_file: PathBuf },
    /// Show saved-job deadline reminders due on a date (default today)
    Reminders {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct BlogPostRecord {
    #[serde(default)]
    slug: Option<String>,
    title: String,
    #[serde(default)]
    excerpt: Option<String>,
    content: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceRecord {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    resource_type: Option<String>,
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD` date.
fn parse_published_at(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub async fn import_blog_posts(db: &Database, csv_content: &str) -> Result<ImportSummary> {
    let repo = ContentRepository::new(db.pool());
    let mut reader = csv::Reader::from_reader(csv_content.as_bytes());
    let mut summary = ImportSummary::default();

    for result in reader.deserialize::<BlogPostRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                summary.skipped += 1;
                warn!("❌ CSV parsing error: {}", e);
                continue;
            }
        };

        let title = record.title.trim();
        if title.is_empty() || record.content.trim().is_empty() {
            summary.skipped += 1;
            warn!("⚠️  Skipping post without title or content");
            continue;
        }

        let slug = non_empty(record.slug.as_deref()).unwrap_or_else(|| slugify(title));
        let post = BlogPost {
            id: new_id(),
            slug,
            title: title.to_string(),
            excerpt: non_empty(record.excerpt.as_deref()),
            content: record.content,
            author: non_empty(record.author.as_deref()),
            category: non_empty(record.category.as_deref()),
            published_at: parse_published_at(record.published_at.as_deref()).unwrap_or_else(Utc::now),
        };

        match repo.upsert_blog_post(&post).await {
            Ok(()) => {
                summary.imported += 1;
                info!("✅ Added: {}", post.slug);
            }
            Err(e) => {
                summary.skipped += 1;
                warn!("❌ Failed to add {}: {}", post.slug, e);
            }
        }
    }

    Ok(summary)
}

pub async fn import_resources(db: &Database, csv_content: &str) -> Result<ImportSummary> {
    let repo = ContentRepository::new(db.pool());
    let mut reader = csv::Reader::from_reader(csv_content.as_bytes());
    let mut summary = ImportSummary::default();

    for result in reader.deserialize::<ResourceRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                summary.skipped += 1;
                warn!("❌ CSV parsing error: {}", e);
                continue;
            }
        };

        let Some(title) = non_empty(Some(record.title.as_str())) else {
            summary.skipped += 1;
            warn!("⚠️  Skipping resource without title");
            continue;
        };

        let resource = Resource {
            id: new_id(),
            title,
            description: non_empty(record.description.as_deref()),
            category: non_empty(record.category.as_deref()),
            url: non_empty(record.url.as_deref()),
            resource_type: non_empty(record.resource_type.as_deref()),
            created_at: Utc::now(),
        };

        match repo.insert_resource(&resource).await {
            Ok(()) => {
                summary.imported += 1;
                info!("✅ Added: {}", resource.title);
            }
            Err(e) => {
                summary.skipped += 1;
                warn!("❌ Failed to add {}: {}", resource.title, e);
            }
        }
    }

    Ok(summary)
}

async fn read_csv(csv_file: &PathBuf) -> Result<String> {
    tokio::fs::read_to_string(csv_file)
        .await
        .with_context(|| format!("CSV file not readable: {}", csv_file.display()))
}

pub async fn handle_admin_command(cli: AdminCli, config: &ConfigManager) -> Result<()> {
    let database_path = cli
        .database_path
        .unwrap_or_else(|| config.environment.database_path.clone());
    let db = Database::new(&database_path).await?;

    match cli.command {
        AdminCommand::Init => {
            info!("✅ Database initialized at: {}", database_path.display());
        }

        AdminCommand::ListProfiles => {
            let profiles = ProfileRepository::new(db.pool()).list_profiles().await?;
            if profiles.is_empty() {
                info!("No profiles found");
            }
            for profile in profiles {
                info!(
                    "{}  {:<10}  {}  <{}>",
                    profile.id, profile.user_type.as_str(), profile.full_name, profile.email
                );
            }
        }

        AdminCommand::ImportBlogPosts { csv_file } => {
            let summary = import_blog_posts(&db, &read_csv(&csv_file).await?).await?;
            info!("Import completed: {} imported, {} skipped", summary.imported, summary.skipped);
        }

        AdminCommand::ImportResources { csv_file } => {
            let summary = import_resources(&db, &read_csv(&csv_file).await?).await?;
            info!("Import completed: {} imported, {} skipped", summary.imported, summary.skipped);
        }

        AdminCommand::Reminders { date } => {
            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            let reminders = load_due_reminders(db.pool(), None, today).await?;
            info!("{} reminders due on {}", reminders.len(), today);
            for reminder in reminders {
                info!(
                    "{} <{}>: '{}' closes {} ({} days left)",
                    reminder.candidate.user_id,
                    reminder.candidate.email,
                    reminder.candidate.job_title,
                    reminder.candidate.application_deadline,
                    reminder.days_left
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_published_at() {
        let ts = parse_published_at(Some("2026-03-01")).unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert!(parse_published_at(Some("2026-03-01T10:00:00+01:00")).is_some());
        assert!(parse_published_at(Some("gestern")).is_none());
        assert!(parse_published_at(None).is_none());
    }

    #[tokio::test]
    async fn test_import_blog_posts() {
        let db = Database::in_memory().await.unwrap();
        let csv = "\
slug,title,excerpt,content,author,category,published_at
,Arbeiten in München,Kurz,Langer Text,Redaktion,career,2026-02-01
blue-card,Blue Card Guide,,Alles zur Blue Card,,visa,
,,,missing title,,,
";
        let summary = import_blog_posts(&db, csv).await.unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, skipped: 1 });

        let repo = ContentRepository::new(db.pool());
        let post = repo.get_blog_post("arbeiten-in-muenchen").await.unwrap().unwrap();
        assert_eq!(post.category.as_deref(), Some("career"));
        assert!(repo.get_blog_post("blue-card").await.unwrap().unwrap().author.is_none());
    }

    #[tokio::test]
    async fn test_import_resources() {
        let db = Database::in_memory().await.unwrap();
        let csv = "\
title,description,category,url,resource_type
Anmeldung,Register your address,relocation,https://example.de/anmeldung,guide
 ,no title,,,
";
        let summary = import_resources(&db, csv).await.unwrap();
        assert_eq!(summary, ImportSummary { imported: 1, skipped: 1 });
        let resources = ContentRepository::new(db.pool()).get_resources(None).await.unwrap();
        assert_eq!(resources[0].url.as_deref(), Some("https://example.de/anmeldung"));
    }
}
