use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.linode.com/v4";
pub const DEFAULT_SUBJECT: &str = "Linode Monthly Report";

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub smtp: SmtpSettings,
    pub email: EmailSettings,
    pub output: OutputSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: 465,
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EmailSettings {
    pub from: Option<String>,
    pub recipients: Vec<String>,
    pub subject: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            from: None,
            recipients: Vec::new(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct OutputSettings {
    /// Chart directory; relative paths are resolved against the config directory
    pub dir: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(default)]
pub struct ReportSettings {
    pub on_malformed: MalformedPolicy,
}

/// What to do with an invoice record whose date or amount cannot be parsed
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    #[default]
    Abort,
    Skip,
}

impl Config {
    /// Overlay environment variables on top of the file settings.
    ///
    /// `lookup` is usually `std::env::var(..).ok()`; tests pass a map instead.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LINODE_API_URL") {
            self.api.base_url = v;
        }
        if let Some(v) = get("LINODE_API_TOKEN") {
            self.api.token = Some(v);
        }
        if let Some(v) = get("SMTP_SERVER") {
            self.smtp.host = Some(v);
        }
        if let Some(v) = get("SMTP_PORT") {
            self.smtp.port = v.trim().parse().map_err(|_| ReportError::InvalidSetting {
                setting: "SMTP_PORT".to_string(),
                value: v.clone(),
                reason: "must be a port number".to_string(),
            })?;
        }
        if let Some(v) = get("SMTP_USERNAME") {
            self.smtp.username = Some(v);
        }
        if let Some(v) = get("SMTP_PASSWORD") {
            self.smtp.password = Some(v);
        }
        if let Some(v) = get("EMAIL_FROM") {
            self.email.from = Some(v);
        }
        if let Some(v) = get("RECIPIENTS") {
            self.email.recipients = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = get("EMAIL_SUBJECT") {
            self.email.subject = v;
        }
        if let Some(v) = get("OUTPUT_PATH") {
            self.output.dir = v;
        }

        Ok(())
    }

    pub fn api_token(&self) -> Result<&str> {
        required(&self.api.token, "api.token", "LINODE_API_TOKEN")
    }

    pub fn smtp_host(&self) -> Result<&str> {
        required(&self.smtp.host, "smtp.host", "SMTP_SERVER")
    }

    pub fn smtp_username(&self) -> Result<&str> {
        required(&self.smtp.username, "smtp.username", "SMTP_USERNAME")
    }

    pub fn smtp_password(&self) -> Result<&str> {
        required(&self.smtp.password, "smtp.password", "SMTP_PASSWORD")
    }

    pub fn email_from(&self) -> Result<&str> {
        required(&self.email.from, "email.from", "EMAIL_FROM")
    }

    pub fn recipients(&self) -> Result<&[String]> {
        if self.email.recipients.is_empty() {
            return Err(ReportError::MissingSetting {
                setting: "email.recipients",
                env: "RECIPIENTS",
            });
        }
        Ok(&self.email.recipients)
    }
}

fn required<'a>(
    value: &'a Option<String>,
    setting: &'static str,
    env: &'static str,
) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ReportError::MissingSetting { setting, env })
}
