// src/reminders.rs
//! Which saved jobs are due a deadline reminder.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::ReminderCandidate;
use crate::repository::SavedJobRepository;

#[derive(Debug, Clone, Serialize)]
pub struct DeadlineReminder {
    #[serde(flatten)]
    pub candidate: ReminderCandidate,
    pub days_left: i64,
}

/// Due when the deadline is today or later and at most `notification_days` away.
pub fn is_reminder_due(deadline: NaiveDate, today: NaiveDate, notification_days: i64) -> bool {
    let days_left = (deadline - today).num_days();
    (0..=notification_days).contains(&days_left)
}

pub fn due_reminders(candidates: Vec<ReminderCandidate>, today: NaiveDate) -> Vec<DeadlineReminder> {
    candidates
        .into_iter()
        .filter(|c| is_reminder_due(c.application_deadline, today, c.notification_days))
        .map(|candidate| DeadlineReminder {
            days_left: (candidate.application_deadline - today).num_days(),
            candidate,
        })
        .collect()
}

/// Reminders due on `today`, for one user or for everyone.
pub async fn load_due_reminders(
    pool: &SqlitePool,
    user_id: Option<&str>,
    today: NaiveDate,
) -> Result<Vec<DeadlineReminder>> {
    let candidates = SavedJobRepository::new(pool)
        .reminder_candidates(user_id)
        .await?;
    Ok(due_reminders(candidates, today))
}
