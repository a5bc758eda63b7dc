use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{MailError, MailResult};
use crate::mailer::{Mailer, OutboundEmail, SendReceipt};

/// Mailer that logs and keeps every message instead of delivering it.
///
/// Used for local runs and tests. `fail_next` makes the next send fail.
#[derive(Debug, Default)]
pub struct OutboxMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    failure: Mutex<Option<MailError>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn fail_next(&self, error: MailError) {
        if let Ok(mut f) = self.failure.lock() {
            *f = Some(error);
        }
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, email: &OutboundEmail) -> MailResult<SendReceipt> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        if let Some(err) = self.failure.lock().ok().and_then(|mut f| f.take()) {
            return Err(err);
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| MailError::Transport(format!("outbox lock poisoned: {e}")))?;
        sent.push(email.clone());
        tracing::info!(
            recipients = email.to.len(),
            subject = %email.subject,
            "queued message in outbox"
        );
        Ok(SendReceipt {
            id: Some(format!("outbox-{}", sent.len())),
        })
    }

    fn name(&self) -> &'static str {
        "outbox"
    }
}
