// src/models/profile.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserType {
    JobSeeker,
    Employer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::JobSeeker => "job_seeker",
            UserType::Employer => "employer",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_seeker" => Ok(UserType::JobSeeker),
            "employer" => Ok(UserType::Employer),
            other => anyhow::bail!("Unknown user type: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_alerts: bool,
    pub application_updates: bool,
    pub job_recommendations: bool,
    pub newsletter: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_alerts: true,
            application_updates: true,
            job_recommendations: true,
            newsletter: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileVisibility {
    #[default]
    Public,
    EmployersOnly,
    Private,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacySettings {
    pub profile_visibility: ProfileVisibility,
    pub show_email: bool,
    pub show_phone: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub notifications: NotificationSettings,
    pub privacy: PrivacySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
    pub full_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Json<Vec<String>>,
    pub experience_years: Option<i64>,
    pub resume_url: Option<String>,
    pub desired_role: Option<String>,
    pub preferred_location: Option<String>,
    pub salary_expectation: Option<i64>,
    pub settings: Json<ProfileSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_employer(&self) -> bool {
        self.user_type == UserType::Employer
    }

    /// Whether `viewer` may see this profile under its privacy settings.
    pub fn visible_to(&self, viewer: Option<&Profile>) -> bool {
        if viewer.is_some_and(|v| v.id == self.id) {
            return true;
        }
        match self.settings.privacy.profile_visibility {
            ProfileVisibility::Public => true,
            ProfileVisibility::EmployersOnly => viewer.is_some_and(|v| v.is_employer()),
            ProfileVisibility::Private => false,
        }
    }

    /// Copy with contact fields hidden according to the privacy settings.
    pub fn public_view(&self) -> Profile {
        let mut view = self.clone();
        if !self.settings.privacy.show_email {
            view.email = String::new();
        }
        if !self.settings.privacy.show_phone {
            view.phone = None;
        }
        view
    }
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
    pub full_name: String,
}

/// Partial profile update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_years: Option<i64>,
    pub resume_url: Option<String>,
    pub desired_role: Option<String>,
    pub preferred_location: Option<String>,
    pub salary_expectation: Option<i64>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.bio.is_none()
            && self.skills.is_none()
            && self.experience_years.is_none()
            && self.resume_url.is_none()
            && self.desired_role.is_none()
            && self.preferred_location.is_none()
            && self.salary_expectation.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, user_type: UserType, visibility: ProfileVisibility) -> Profile {
        let mut settings = ProfileSettings::default();
        settings.privacy.profile_visibility = visibility;
        Profile {
            id: id.to_string(),
            email: format!("{}@example.de", id),
            user_type,
            full_name: id.to_string(),
            phone: Some("+49 30 123".to_string()),
            location: None,
            bio: None,
            skills: Json(vec![]),
            experience_years: None,
            resume_url: None,
            desired_role: None,
            preferred_location: None,
            salary_expectation: None,
            settings: Json(settings),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_type_round_trips_through_str() {
        assert_eq!("employer".parse::<UserType>().unwrap(), UserType::Employer);
        assert_eq!(UserType::JobSeeker.to_string(), "job_seeker");
        assert!("admin".parse::<UserType>().is_err());
    }

    #[test]
    fn test_settings_fill_missing_keys_with_defaults() {
        let settings: ProfileSettings =
            serde_json::from_str(r#"{"privacy":{"show_email":true}}"#).unwrap();
        assert!(settings.privacy.show_email);
        assert_eq!(settings.privacy.profile_visibility, ProfileVisibility::Public);
        assert!(settings.notifications.email_alerts);
    }

    #[test]
    fn test_visibility_rules() {
        let seeker = profile("anna", UserType::JobSeeker, ProfileVisibility::EmployersOnly);
        let employer = profile("firma", UserType::Employer, ProfileVisibility::Public);
        let other = profile("ben", UserType::JobSeeker, ProfileVisibility::Public);

        assert!(seeker.visible_to(Some(&seeker)));
        assert!(seeker.visible_to(Some(&employer)));
        assert!(!seeker.visible_to(Some(&other)));
        assert!(!seeker.visible_to(None));

        let hidden = profile("carl", UserType::JobSeeker, ProfileVisibility::Private);
        assert!(!hidden.visible_to(Some(&employer)));
    }

    #[test]
    fn test_public_view_hides_contact_details() {
        let p = profile("anna", UserType::JobSeeker, ProfileVisibility::Public);
        let view = p.public_view();
        assert!(view.email.is_empty());
        assert!(view.phone.is_none());
    }
}
