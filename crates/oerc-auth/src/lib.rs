//! Identity and authorization for the OERC site.
//!
//! Privileged operations are gated by [`Capability`] checks against the
//! roles recorded on an [`Identity`], never by comparing email addresses.
//! The configured admin address only decides which account is seeded with
//! [`Role::Admin`].
//!
//! - [`IdentityProvider`]: password sign-in, bearer sessions, auth events
//! - [`InMemoryIdentityProvider`]: account and session tables in memory
//! - [`SessionHandle`]: the single root-level view of "who is signed in"
//! - [`authorize`]: resolve credentials and check a capability (401/403)

pub mod credentials;
pub mod error;
pub mod gate;
pub mod identity;
pub mod memory;
pub mod password;
pub mod provider;
pub mod session;

pub use credentials::Credentials;
pub use error::{AuthError, AuthResult};
pub use gate::{authorize, require};
pub use identity::{Capability, Identity, Role};
pub use memory::InMemoryIdentityProvider;
pub use password::PasswordHash;
pub use provider::{AuthEvent, IdentityProvider};
pub use session::{Session, SessionHandle};
