use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailResult;

/// One outbound message. A single message may address many recipients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// What the delivery service reported back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message. Fails with `NoRecipients` when `to` is empty.
    async fn send(&self, email: &OutboundEmail) -> MailResult<SendReceipt>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
