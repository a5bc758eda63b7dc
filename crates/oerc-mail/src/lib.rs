//! Outbound email for the OERC site.
//!
//! Delivery is delegated to a [`Mailer`]. Two implementations ship:
//!
//! - [`ResendMailer`]: the Resend HTTP API
//! - [`OutboxMailer`]: logs and records messages without sending them
//!
//! [`templates`] builds the welcome and admin-notification messages sent
//! when someone subscribes.

pub mod config;
pub mod error;
pub mod mailer;
pub mod outbox;
pub mod resend;
pub mod templates;

pub use config::{build_mailer, MailConfig, MailProvider};
pub use error::{MailError, MailResult};
pub use mailer::{Mailer, OutboundEmail, SendReceipt};
pub use outbox::OutboxMailer;
pub use resend::ResendMailer;
