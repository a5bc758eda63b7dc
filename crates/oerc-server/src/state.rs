use std::sync::Arc;

use oerc_auth::{InMemoryIdentityProvider, Role};
use oerc_mail::build_mailer;
use oerc_site::{NewsletterSettings, Site, SiteStores};
use oerc_store::{FsBucket, JsonFileTable, UniquePolicy};
use oerc_types::{Event, Faq, GlobalConference, NewsletterSubscriber, ResearchPaper};

use crate::config::SiteConfig;
use crate::error::ServerResult;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub site: Site,
    pub config: Arc<SiteConfig>,
    /// Required value of `x-webhook-secret`, if any.
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(site: Site, config: SiteConfig) -> Self {
        Self { site, config: Arc::new(config), webhook_secret: None }
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Build the site described by `config`, reading secrets from the
    /// process environment.
    pub fn from_config(config: SiteConfig) -> ServerResult<Self> {
        Self::from_config_with(config, |key| std::env::var(key).ok())
    }

    pub fn from_config_with(
        config: SiteConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ServerResult<Self> {
        let stores = open_stores(&config)?;
        let mailer = build_mailer(&config.mail)?;
        let identity = Arc::new(seed_accounts(&config, &lookup)?);
        let newsletter = NewsletterSettings {
            from: config.mail.from.clone(),
            admin_email: Some(config.admin_email.clone()).filter(|e| !e.trim().is_empty()),
        };
        let webhook_secret = config
            .webhook_secret_env
            .as_deref()
            .and_then(|key| lookup(key))
            .filter(|s| !s.is_empty());
        tracing::info!(
            mailer = mailer.name(),
            persistent = config.data_dir.is_some(),
            "site assembled"
        );
        let site = Site::assemble(stores, mailer, newsletter, identity);
        Ok(Self { site, config: Arc::new(config), webhook_secret })
    }
}

fn open_stores(config: &SiteConfig) -> ServerResult<SiteStores> {
    let subscribers = if config.unique_subscribers {
        UniquePolicy::Enforce
    } else {
        UniquePolicy::Allow
    };
    let Some(dir) = &config.data_dir else {
        return Ok(SiteStores::in_memory(&config.bucket, &config.public_base_url, subscribers));
    };
    let tables = dir.join("tables");
    tracing::info!(dir = %dir.display(), "opening file-backed store");
    Ok(SiteStores {
        papers: Arc::new(JsonFileTable::<ResearchPaper>::open(&tables, UniquePolicy::Enforce)?),
        events: Arc::new(JsonFileTable::<Event>::open(&tables, UniquePolicy::Enforce)?),
        conferences: Arc::new(JsonFileTable::<GlobalConference>::open(&tables, UniquePolicy::Enforce)?),
        faqs: Arc::new(JsonFileTable::<Faq>::open(&tables, UniquePolicy::Enforce)?),
        subscribers: Arc::new(JsonFileTable::<NewsletterSubscriber>::open(&tables, subscribers)?),
        assets: Arc::new(FsBucket::new(
            dir.join("storage"),
            config.bucket.clone(),
            config.public_base_url.clone(),
        )),
    })
}

/// Register the admin and any extra accounts whose password is available.
fn seed_accounts(
    config: &SiteConfig,
    lookup: &impl Fn(&str) -> Option<String>,
) -> ServerResult<InMemoryIdentityProvider> {
    let provider = InMemoryIdentityProvider::new(config.session_ttl());
    let admin = (config.admin_email.as_str(), config.admin_password_env.as_str(), vec![Role::Admin]);
    let extra = config
        .accounts
        .iter()
        .map(|a| (a.email.as_str(), a.password_env.as_str(), a.roles.clone()));
    for (email, password_env, roles) in std::iter::once(admin).chain(extra) {
        match lookup(password_env).filter(|p| !p.is_empty()) {
            Some(password) => {
                provider.register(email, &password, roles)?;
                tracing::info!(%email, "account seeded");
            }
            None => tracing::warn!(%email, env = password_env, "password not set, account skipped"),
        }
    }
    Ok(provider)
}
