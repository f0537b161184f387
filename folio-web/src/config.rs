//! Configuration resolution for folio-web
//!
//! Priority order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`--config` / `FOLIO_CONFIG`)
//! 4. Compiled default
//!
//! Secrets (admin password, mail API key) are read from the environment only
//! and are never accepted on the command line or from the TOML file.

use clap::Parser;
use folio_common::auth::AdminCredentials;
use folio_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_RATE_LIMIT: u32 = 100;
pub const DEFAULT_ADMIN_RATE_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_CONTACT_RATE_LIMIT: u32 = 5;
pub const DEFAULT_CONTACT_RATE_WINDOW: Duration = Duration::from_secs(30);

pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
pub const MAIL_API_KEY_ENV: &str = "MAIL_API_KEY";

/// Command-line arguments for folio-web
#[derive(Parser, Debug, Default)]
#[command(name = "folio-web")]
#[command(about = "Bilingual portfolio site with admin panel")]
#[command(version)]
pub struct Args {
    /// Optional TOML file with non-secret settings
    #[arg(long, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory holding bio.json, tracks.json, locales/ and images/
    #[arg(long, env = "FOLIO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the audio files listed in tracks.json
    #[arg(long, env = "FOLIO_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Directory of static assets (CSS, JS) served at the site root
    #[arg(long, env = "FOLIO_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Admin username (password comes from ADMIN_PASSWORD)
    #[arg(long, env = "ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    /// Mail provider endpoint (API key comes from MAIL_API_KEY)
    #[arg(long, env = "MAIL_API_URL")]
    pub mail_api_url: Option<String>,

    /// Sender address for relayed contact messages
    #[arg(long, env = "MAIL_FROM")]
    pub mail_from: Option<String>,

    /// Recipient of relayed contact messages
    #[arg(long, env = "CONTACT_EMAIL")]
    pub contact_email: Option<String>,

    /// Admin requests allowed per client per minute
    #[arg(long, env = "ADMIN_RATE_LIMIT")]
    pub admin_rate_limit: Option<u32>,

    /// Contact submissions allowed per client per 30 seconds
    #[arg(long, env = "CONTACT_RATE_LIMIT")]
    pub contact_rate_limit: Option<u32>,
}

/// Non-secret settings accepted from the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub admin_username: Option<String>,
    pub mail_api_url: Option<String>,
    pub mail_from: Option<String>,
    pub contact_email: Option<String>,
    pub admin_rate_limit: Option<u32>,
    pub contact_rate_limit: Option<u32>,
}

impl TomlConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Per-client allowance of `max_requests`, refilled evenly over `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

/// Transactional mail provider settings
#[derive(Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub to: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Fully resolved site configuration
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub work_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    /// `None` when ADMIN_PASSWORD is unset; every admin request then fails with 500
    pub admin: Option<AdminCredentials>,
    /// `None` disables the mail relay; the contact form still succeeds
    pub mail: Option<MailConfig>,
    pub admin_rate_limit: RateLimitConfig,
    pub contact_rate_limit: RateLimitConfig,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_secret(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

impl SiteConfig {
    /// Defaults rooted at `data_dir`, no admin password, no mail relay
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            work_dir: data_dir.join("work"),
            data_dir,
            static_dir: None,
            admin: None,
            mail: None,
            admin_rate_limit: RateLimitConfig {
                max_requests: DEFAULT_ADMIN_RATE_LIMIT,
                window: DEFAULT_ADMIN_RATE_WINDOW,
            },
            contact_rate_limit: RateLimitConfig {
                max_requests: DEFAULT_CONTACT_RATE_LIMIT,
                window: DEFAULT_CONTACT_RATE_WINDOW,
            },
        }
    }

    /// Resolve arguments, environment secrets and the optional TOML file
    pub fn resolve(args: Args) -> Result<Self> {
        let toml = match &args.config {
            Some(path) => TomlConfig::load(path)?,
            None => TomlConfig::default(),
        };
        Self::from_sources(
            args,
            toml,
            env_secret(ADMIN_PASSWORD_ENV),
            env_secret(MAIL_API_KEY_ENV),
        )
    }

    /// Merge already-loaded sources; split out so tests need no process env
    pub fn from_sources(
        args: Args,
        toml: TomlConfig,
        admin_password: Option<String>,
        mail_api_key: Option<String>,
    ) -> Result<Self> {
        let data_dir = args
            .data_dir
            .or(toml.data_dir)
            .unwrap_or_else(|| PathBuf::from("data"));
        let mut config = Self::with_data_dir(data_dir);

        if let Some(work_dir) = args.work_dir.or(toml.work_dir) {
            config.work_dir = work_dir;
        }
        if let Some(host) = non_empty(args.host.or(toml.host)) {
            config.host = host;
        }
        if let Some(port) = args.port.or(toml.port) {
            config.port = port;
        }
        config.static_dir = args.static_dir.or(toml.static_dir);

        let username = non_empty(args.admin_username.or(toml.admin_username))
            .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());
        config.admin = admin_password.map(|password| AdminCredentials::new(username, password));

        if let Some(limit) = args.admin_rate_limit.or(toml.admin_rate_limit) {
            config.admin_rate_limit.max_requests = limit;
        }
        if let Some(limit) = args.contact_rate_limit.or(toml.contact_rate_limit) {
            config.contact_rate_limit.max_requests = limit;
        }
        if config.admin_rate_limit.max_requests == 0 || config.contact_rate_limit.max_requests == 0 {
            return Err(Error::Config("Rate limits must be at least 1".to_string()));
        }

        let api_url = non_empty(args.mail_api_url.or(toml.mail_api_url));
        let to = non_empty(args.contact_email.or(toml.contact_email));
        let from = non_empty(args.mail_from.or(toml.mail_from));
        config.mail = match (api_url, mail_api_key, to) {
            (Some(api_url), Some(api_key), Some(to)) => Some(MailConfig {
                api_url,
                api_key,
                from: from.unwrap_or_else(|| to.clone()),
                to,
            }),
            _ => None,
        };

        Ok(config)
    }

    /// Log the effective configuration without secrets
    pub fn log_summary(&self) {
        info!("Data directory: {}", self.data_dir.display());
        info!("Work directory: {}", self.work_dir.display());
        if let Some(static_dir) = &self.static_dir {
            info!("Static assets: {}", static_dir.display());
        }
        match &self.admin {
            Some(admin) => info!("Admin panel enabled for user '{}'", admin.username()),
            None => warn!(
                "{} is not set - admin panel will answer 500 to every request",
                ADMIN_PASSWORD_ENV
            ),
        }
        match &self.mail {
            Some(mail) => info!("Contact messages relayed to {}", mail.to),
            None => info!("Mail relay not configured - contact messages will not be forwarded"),
        }
        info!(
            "Rate limits: admin {}/{}s, contact {}/{}s",
            self.admin_rate_limit.max_requests,
            self.admin_rate_limit.window.as_secs(),
            self.contact_rate_limit.max_requests,
            self.contact_rate_limit.window.as_secs()
        );
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}
