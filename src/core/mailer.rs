// src/core/mailer.rs
//! HTTP client for the template-based email-send service

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{error, info, trace};

use crate::core::config_manager::EmailSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    settings: EmailSettings,
}

impl EmailClient {
    pub fn new(settings: EmailSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, settings })
    }

    /// Request body understood by the email service.
    pub fn build_payload(&self, template_id: &str, params: Map<String, Value>) -> Value {
        json!({
            "service_id": self.settings.service_id,
            "template_id": template_id,
            "user_id": self.settings.public_key,
            "template_params": params,
        })
    }

    pub async fn send_template(&self, template_id: &str, params: Map<String, Value>) -> Result<()> {
        let payload = self.build_payload(template_id, params);
        trace!("Calling email service: {}", self.settings.service_url);

        let response = self
            .client
            .post(&self.settings.service_url)
            .json(&payload)
            .send()
            .await
            .context("Failed to call email service")?;

        let status = response.status();
        if status.is_success() {
            info!("Email sent with template {}", template_id);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Email service error response: {}", error_text);
            anyhow::bail!("Email service returned error status {}: {}", status, error_text)
        }
    }

    pub async fn send_contact_message(&self, message: &ContactMessage) -> Result<()> {
        let params = to_params(message)?;
        self.send_template(&self.settings.template_id, params).await
    }

    pub async fn send_password_reset(&self, email: &str, token: &str) -> Result<()> {
        let template_id = self
            .settings
            .reset_template_id
            .as_deref()
            .unwrap_or(&self.settings.template_id);

        let mut params = Map::new();
        params.insert("to_email".to_string(), Value::from(email));
        params.insert("reset_token".to_string(), Value::from(token));
        self.send_template(template_id, params).await
    }
}

fn to_params<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value).context("Failed to serialize template params")? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Template params must serialize to an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            service_url: "http://127.0.0.1:9/send".to_string(),
            service_id: "service_jobs".to_string(),
            template_id: "template_contact".to_string(),
            reset_template_id: None,
            public_key: "public-key".to_string(),
            timeout_seconds: 1,
        }
    }

    #[test]
    fn test_payload_carries_service_and_params() {
        let client = EmailClient::new(settings()).unwrap();
        let params = to_params(&ContactMessage {
            name: "Anna".to_string(),
            email: "anna@example.de".to_string(),
            subject: None,
            message: "Hallo".to_string(),
        })
        .unwrap();

        let payload = client.build_payload("template_contact", params);
        assert_eq!(payload["service_id"], "service_jobs");
        assert_eq!(payload["user_id"], "public-key");
        assert_eq!(payload["template_params"]["name"], "Anna");
        assert!(payload["template_params"].get("subject").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let client = EmailClient::new(settings()).unwrap();
        let result = client.send_password_reset("anna@example.de", "token").await;
        assert!(result.is_err());
    }
}
