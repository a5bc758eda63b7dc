use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use oerc_auth::Role;
use oerc_mail::MailConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server configuration, read from TOML. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub bind_addr: SocketAddr,
    /// Prefix of public asset URLs.
    pub public_base_url: String,
    pub bucket: String,
    /// Where tables and assets are kept. Unset means in memory.
    pub data_dir: Option<PathBuf>,
    /// Seeded with the admin role; receives new-subscriber notices.
    pub admin_email: String,
    /// Environment variable holding the admin password.
    pub admin_password_env: String,
    pub session_ttl_secs: u64,
    /// Reject a second subscription for the same address.
    pub unique_subscribers: bool,
    /// Environment variable holding the new-subscriber hook secret.
    pub webhook_secret_env: Option<String>,
    pub max_upload_bytes: usize,
    pub mail: MailConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountConfig>,
}

/// An extra account created at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub email: String,
    pub password_env: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<Role>,
}

fn default_roles() -> Vec<Role> {
    vec![Role::Member]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            public_base_url: "http://127.0.0.1:8080".into(),
            bucket: "oerc_assets".into(),
            data_dir: None,
            admin_email: "admin@oerc.ca".into(),
            admin_password_env: "OERC_ADMIN_PASSWORD".into(),
            session_ttl_secs: 8 * 60 * 60,
            unique_subscribers: true,
            webhook_secret_env: None,
            max_upload_bytes: 25 * 1024 * 1024,
            mail: MailConfig::default(),
            accounts: Vec::new(),
        }
    }
}

impl SiteConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read `path` (or start from defaults) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ServerError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `OERC_BIND_ADDR`, `OERC_ADMIN_EMAIL`, `OERC_DATA_DIR`, and
    /// `OERC_PUBLIC_BASE_URL` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ServerResult<()> {
        if let Some(addr) = lookup("OERC_BIND_ADDR") {
            self.bind_addr = addr
                .parse()
                .map_err(|e| ServerError::Config(format!("OERC_BIND_ADDR {addr:?}: {e}")))?;
            tracing::info!(%addr, "bind address overridden from environment");
        }
        if let Some(email) = lookup("OERC_ADMIN_EMAIL") {
            tracing::info!(%email, "admin email overridden from environment");
            self.admin_email = email;
        }
        if let Some(dir) = lookup("OERC_DATA_DIR") {
            tracing::info!(%dir, "data directory overridden from environment");
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = lookup("OERC_PUBLIC_BASE_URL") {
            tracing::info!(%url, "public base URL overridden from environment");
            self.public_base_url = url;
        }
        Ok(())
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        let max = (i64::MAX / 1000) as u64;
        chrono::Duration::seconds(self.session_ttl_secs.min(max) as i64)
    }
}
