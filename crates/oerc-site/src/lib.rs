//! Site services for the OERC backend.
//!
//! Builds the admin and public behavior on top of the store, auth, and mail
//! collaborators:
//!
//! - [`Repository`]: validated CRUD for one resource kind. Plain tables use
//!   [`TableRepository`]; papers use [`PaperLibrary`], which also manages
//!   the PDF and cover-image objects.
//! - [`ResourceManager`]: the dashboard's list/form lifecycle, generic over
//!   the resource kind.
//! - [`NewsletterService`]: public subscribe, gated listing, removal and
//!   bulk send, and the new-subscriber welcome.
//! - [`AdminConsole`]: one session shared by every manager.
//! - [`views`]: read-only listings for visitors.

pub mod console;
pub mod error;
pub mod manager;
pub mod newsletter;
pub mod notice;
pub mod paper;
pub mod repository;
pub mod site;
pub mod upload;
pub mod views;

pub use console::{AdminConsole, PaperManager, SubscriberManager};
pub use error::{SiteError, SiteResult};
pub use manager::{Form, FormMode, ResourceManager};
pub use newsletter::{BulkEmail, NewsletterService, NewsletterSettings, SendOutcome, WelcomeOutcome};
pub use notice::{Confirmation, Notice};
pub use paper::PaperLibrary;
pub use repository::{Repository, TableRepository};
pub use site::{Site, SiteStores};
pub use upload::{Attachments, FileUpload};
pub use views::{ConferenceRow, ResearchView};
