mod settings;

pub use settings::{
    ApiSettings, Config, EmailSettings, MalformedPolicy, OutputSettings, ReportSettings,
    SmtpSettings, DEFAULT_API_BASE, DEFAULT_SUBJECT,
};

use crate::error::{ReportError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.billing-report/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "billing-report") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.billing-report/
    let home = dirs_home().ok_or_else(|| {
        ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".billing-report"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the chart output directory; relative paths live under the config directory
pub fn resolve_output_dir(dir: &str, config_dir: &Path) -> PathBuf {
    let path = expand_path(dir);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

/// Load config.toml (optional) and overlay the process environment.
///
/// A `.env` file in the working directory is read first so its values take
/// part in the overlay.
pub fn load_config(config_dir: &Path) -> Result<Config> {
    dotenvy::dotenv().ok();

    let path = config_dir.join("config.toml");
    let mut config = if path.exists() {
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| ReportError::ConfigParse { path, source: e })?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults and environment");
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"# Every setting can also come from the environment (or a .env file);
# environment values win over this file.

[api]
base_url = "https://api.linode.com/v4"   # LINODE_API_URL
# token = "..."                          # LINODE_API_TOKEN (prefer the env var)
timeout_secs = 30

[smtp]
host = "smtp.example.com"                # SMTP_SERVER
port = 465                               # SMTP_PORT, implicit TLS
username = "reports@example.com"         # SMTP_USERNAME
# password = "..."                       # SMTP_PASSWORD (prefer the env var)

[email]
from = "reports@example.com"             # EMAIL_FROM
recipients = ["you@example.com"]         # RECIPIENTS, comma-separated
subject = "Linode Monthly Report"        # EMAIL_SUBJECT

[output]
dir = "output"                           # OUTPUT_PATH, relative to this directory

[report]
on_malformed = "abort"                   # or "skip" to drop unparseable invoices
"#;
