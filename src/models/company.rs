// src/models/company.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: String,
    pub size: Option<String>,
    pub location: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub benefits: Json<Vec<String>>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset of a company embedded in job listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub location: String,
    pub industry: String,
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
            logo_url: company.logo_url.clone(),
            location: company.location.clone(),
            industry: company.industry.clone(),
        }
    }
}

/// Fields accepted when creating or fully editing a company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInput {
    pub name: String,
    pub description: Option<String>,
    pub industry: String,
    pub size: Option<String>,
    pub location: String,
    pub website: Option<String>,
    pub benefits: Vec<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyFilter {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub owner_id: Option<String>,
}
