//! Foundation types for the OERC site backend.
//!
//! Every resource the admin dashboard manages is modeled here, together with
//! the [`Resource`] trait that lets the store, the managers, and the HTTP
//! layer treat all of them uniformly.
//!
//! # Key Types
//!
//! - [`RecordId`]: server-assigned identifier, immutable once issued
//! - [`ResearchPaper`], [`Event`], [`GlobalConference`], [`Faq`],
//!   [`NewsletterSubscriber`]: the managed entities
//! - [`Resource`]: drafts, patches, ordering, and validation per entity
//! - [`ListOrder`]: the store-side ordering of each table
//!
//! # Modules
//!
//! - [`columns`]: mapping between client field names and stored columns
//! - [`tags`]: tag normalization and the conjunctive research filter

pub mod columns;
pub mod conference;
pub mod error;
pub mod event;
pub mod faq;
pub mod id;
pub mod paper;
pub mod resource;
pub mod subscriber;
pub mod tags;

pub use conference::{ConferenceDraft, ConferencePatch, GlobalConference};
pub use error::{TypeError, ValidationError};
pub use event::{Event, EventDraft, EventPatch};
pub use faq::{Faq, FaqDraft, FaqPatch};
pub use id::{IdStrategy, RecordId};
pub use paper::{PaperDraft, PaperPatch, ResearchPaper};
pub use resource::{Direction, ListOrder, OrderKey, Resource, ResourceKind};
pub use subscriber::{NewsletterSubscriber, SubscriberDraft};
