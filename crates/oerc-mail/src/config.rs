use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MailError, MailResult};
use crate::mailer::Mailer;
use crate::outbox::OutboxMailer;
use crate::resend::ResendMailer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailProvider {
    /// Log and keep messages in memory.
    #[default]
    Outbox,
    Resend,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub provider: MailProvider,
    /// Sender shown on every message.
    pub from: String,
    /// Environment variable holding the Resend API key.
    pub api_key_env: String,
    pub api_base: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Outbox,
            from: "OERC Newsletter <info@oerc.ca>".into(),
            api_key_env: "RESEND_API_KEY".into(),
            api_base: ResendMailer::DEFAULT_BASE_URL.into(),
        }
    }
}

/// Construct the configured mailer. Resend requires its API key variable.
pub fn build_mailer(config: &MailConfig) -> MailResult<Arc<dyn Mailer>> {
    match config.provider {
        MailProvider::Outbox => Ok(Arc::new(OutboxMailer::new())),
        MailProvider::Resend => {
            let key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    MailError::NotConfigured(format!("{} is not set", config.api_key_env))
                })?;
            Ok(Arc::new(ResendMailer::new(key, config.api_base.clone())))
        }
    }
}
