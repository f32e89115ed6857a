// src/repository/profiles.rs
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::info;

use crate::models::{NewProfile, Profile, ProfileSettings, ProfileUpdate};
use crate::validation::ValidationErrors;

const PROFILE_COLUMNS: &str = "id, email, user_type, full_name, phone, location, bio, skills, \
     experience_years, resume_url, desired_role, preferred_location, salary_expectation, \
     settings, created_at, updated_at";

/// Outcome of a settings patch.
#[derive(Debug)]
pub enum SettingsUpdate {
    Saved(ProfileSettings),
    /// The merged object no longer fits the settings schema; nothing was written.
    Invalid(ValidationErrors),
    MissingProfile,
}

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE id = ?",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE email = ? COLLATE NOCASE",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles ORDER BY created_at ASC",
            PROFILE_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(profiles)
    }

    /// Insert a profile row; takes any executor so sign-up can run it in a transaction.
    pub async fn create_profile<'e, E>(executor: E, new: &NewProfile) -> Result<()>
    where
        E: SqliteExecutor<'e>,
    {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, user_type, full_name, skills, settings, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.id)
        .bind(&new.email)
        .bind(new.user_type)
        .bind(&new.full_name)
        .bind(Json(Vec::<String>::new()))
        .bind(Json(ProfileSettings::default()))
        .bind(now)
        .bind(now)
        .execute(executor)
        .await
        .context("Failed to insert profile")?;

        info!("Created {} profile {}", new.user_type, new.id);
        Ok(())
    }

    /// Apply the supplied fields and return the stored profile.
    pub async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<Profile>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE profiles SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(v) = &update.full_name {
            builder.push(", full_name = ").push_bind(v);
        }
        if let Some(v) = &update.phone {
            builder.push(", phone = ").push_bind(v);
        }
        if let Some(v) = &update.location {
            builder.push(", location = ").push_bind(v);
        }
        if let Some(v) = &update.bio {
            builder.push(", bio = ").push_bind(v);
        }
        if let Some(v) = &update.skills {
            builder.push(", skills = ").push_bind(Json(v.clone()));
        }
        if let Some(v) = update.experience_years {
            builder.push(", experience_years = ").push_bind(v);
        }
        if let Some(v) = &update.resume_url {
            builder.push(", resume_url = ").push_bind(v);
        }
        if let Some(v) = &update.desired_role {
            builder.push(", desired_role = ").push_bind(v);
        }
        if let Some(v) = &update.preferred_location {
            builder.push(", preferred_location = ").push_bind(v);
        }
        if let Some(v) = update.salary_expectation {
            builder.push(", salary_expectation = ").push_bind(v);
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Updated profile {}", id);
        self.get_profile(id).await
    }

    /// Deep-merge `patch` into the stored settings object and return the result.
    pub async fn update_settings(&self, id: &str, patch: &Value) -> Result<SettingsUpdate> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT settings FROM profiles WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((Json(mut settings),)) = current else {
            return Ok(SettingsUpdate::MissingProfile);
        };

        merge_json(&mut settings, patch);
        let merged: ProfileSettings = match serde_json::from_value(settings) {
            Ok(merged) => merged,
            Err(e) => {
                let mut errors = ValidationErrors::default();
                errors.add("settings", e.to_string());
                return Ok(SettingsUpdate::Invalid(errors));
            }
        };

        sqlx::query("UPDATE profiles SET settings = ?, updated_at = ? WHERE id = ?")
            .bind(Json(&merged))
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Updated settings for profile {}", id);
        Ok(SettingsUpdate::Saved(merged))
    }
}

/// Recursively merge `patch` into `target`; objects merge key by key, anything else replaces.
pub fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
