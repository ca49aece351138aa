use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::webhooks::WebhookType;

/// Environment fallbacks for outbound webhook URLs.
///
/// A URL stored in `webhook_configs` wins when its row is active; these are used otherwise.
#[derive(Debug, Clone, Default)]
pub struct WebhookUrls {
    pub research: Option<String>,
    pub scripting: Option<String>,
    pub optimizer: Option<String>,
    pub production: Option<String>,
    pub notification: Option<String>,
}

impl WebhookUrls {
    pub fn get(&self, webhook_type: WebhookType) -> Option<&str> {
        let url = match webhook_type {
            WebhookType::Research => &self.research,
            WebhookType::Scripting => &self.scripting,
            WebhookType::Optimizer => &self.optimizer,
            WebhookType::Production => &self.production,
            WebhookType::Notification => &self.notification,
        };
        url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Workflow and webhook tuning shared by the orchestrator and the callback handler.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub webhook_urls: WebhookUrls,
    /// Global secret: sent on outbound calls without a per-webhook secret, required on callbacks.
    pub webhook_secret: Option<String>,
    pub webhook_timeout_secs: u64,
    pub max_retries: i32,
    /// Fire the research webhook as soon as a project is created
    pub auto_start: bool,
    /// Fire the scripting webhook as soon as research completes
    pub auto_advance: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            webhook_urls: WebhookUrls::default(),
            webhook_secret: None,
            webhook_timeout_secs: 30,
            max_retries: 5,
            auto_start: true,
            auto_advance: true,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub public_url: String,
    pub allowed_origins: Vec<String>,
    pub auth_rate_limit_enabled: bool,
    pub bcrypt_cost: u32,
    pub dev_mode: bool,
    pub workflow: WorkflowSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = WorkflowSettings::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "avatar-agency".to_string()),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            auth_rate_limit_enabled: env_flag("AUTH_RATE_LIMIT_ENABLED", true)?,
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("BCRYPT_COST must be a valid number")?,
            dev_mode: env_flag("DEV_MODE", false)?,
            workflow: WorkflowSettings {
                webhook_urls: WebhookUrls {
                    research: env::var("WEBHOOK_RESEARCH_URL").ok(),
                    scripting: env::var("WEBHOOK_SCRIPTING_URL").ok(),
                    optimizer: env::var("WEBHOOK_OPTIMIZER_URL").ok(),
                    production: env::var("WEBHOOK_PRODUCTION_URL").ok(),
                    notification: env::var("WEBHOOK_NOTIFICATION_URL").ok(),
                },
                webhook_secret: env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()),
                webhook_timeout_secs: env::var("WEBHOOK_TIMEOUT_SECS")
                    .unwrap_or_else(|_| defaults.webhook_timeout_secs.to_string())
                    .parse()
                    .context("WEBHOOK_TIMEOUT_SECS must be a valid number")?,
                max_retries: env::var("WEBHOOK_MAX_RETRIES")
                    .unwrap_or_else(|_| defaults.max_retries.to_string())
                    .parse()
                    .context("WEBHOOK_MAX_RETRIES must be a valid number")?,
                auto_start: env_flag("WORKFLOW_AUTO_START", defaults.auto_start)?,
                auto_advance: env_flag("WORKFLOW_AUTO_ADVANCE", defaults.auto_advance)?,
            },
        })
    }
}

fn env_flag(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .to_ascii_lowercase()
            .parse::<bool>()
            .with_context(|| format!("{} must be true or false", name)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fallback_url_is_treated_as_missing() {
        let urls = WebhookUrls {
            research: Some(String::new()),
            production: Some("https://n8n.example.com/production".to_string()),
            ..Default::default()
        };

        assert_eq!(urls.get(WebhookType::Research), None);
        assert_eq!(urls.get(WebhookType::Scripting), None);
        assert_eq!(
            urls.get(WebhookType::Production),
            Some("https://n8n.example.com/production")
        );
    }

    #[test]
    fn workflow_defaults() {
        let settings = WorkflowSettings::default();
        assert_eq!(settings.webhook_timeout_secs, 30);
        assert_eq!(settings.max_retries, 5);
        assert!(settings.auto_start);
        assert!(settings.auto_advance);
    }
}
