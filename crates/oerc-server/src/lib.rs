//! HTTP server for the OERC site.
//!
//! Serves the public listings, the admin content and newsletter endpoints,
//! the new-subscriber webhook, and public downloads from the asset bucket.
//!
//! | Route | Access |
//! |---|---|
//! | `GET /v1/papers?tags=a,b`, `/v1/papers/tags`, `/v1/events`, `/v1/conferences`, `/v1/faqs` | public |
//! | `POST /v1/subscribe` | public |
//! | `POST /v1/auth/sign-in`, `/v1/auth/sign-out`, `GET /v1/auth/user` | session |
//! | `POST/PATCH/DELETE /v1/admin/{papers,events,conferences,faqs}[/:id]` | `ManageContent` |
//! | `GET /v1/admin/subscribers`, `DELETE /v1/admin/subscribers/:id` | `ManageSubscribers` |
//! | `POST /v1/admin/newsletter` | `SendNewsletter` |
//! | `POST /v1/hooks/subscriber-created` | shared secret, if configured |
//! | `GET /storage/v1/object/public/:bucket/*path` | public |

pub mod admin;
pub mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod newsletter;
pub mod router;
pub mod server;
pub mod state;

pub use auth::Caller;
pub use config::{AccountConfig, SiteConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::Managed;
pub use server::OercServer;
pub use state::AppState;
