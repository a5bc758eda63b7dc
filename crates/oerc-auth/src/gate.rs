//! Capability checks for privileged operations.

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::identity::{Capability, Identity};
use crate::provider::IdentityProvider;

/// Check an already-resolved identity. `None` is unauthenticated.
pub fn require(identity: Option<&Identity>, capability: Capability) -> AuthResult<&Identity> {
    let identity = identity.ok_or(AuthError::MissingCredentials)?;
    if !identity.can(capability) {
        tracing::warn!(email = %identity.email, %capability, "capability denied");
        return Err(AuthError::Forbidden {
            email: identity.email.clone(),
            capability,
        });
    }
    Ok(identity)
}

/// Resolve request credentials and check a capability.
///
/// Anonymous or unresolvable credentials fail as unauthenticated (401);
/// a resolved identity without the capability fails as `Forbidden` (403).
pub async fn authorize(
    provider: &dyn IdentityProvider,
    credentials: &Credentials,
    capability: Capability,
) -> AuthResult<Identity> {
    let identity = match credentials {
        Credentials::Anonymous => return Err(AuthError::MissingCredentials),
        Credentials::Bearer(token) => provider.current_user(token).await.map_err(|e| {
            tracing::warn!(error = %e, "authentication failed");
            e
        })?,
    };
    require(Some(&identity), capability)?;
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::memory::InMemoryIdentityProvider;
    use chrono::Duration;

    #[test]
    fn require_rules() {
        let admin = Identity::new("1", "admin@oerc.ca", [Role::Admin]);
        let member = Identity::new("2", "m@oerc.ca", [Role::Member]);
        assert!(require(Some(&admin), Capability::SendNewsletter).is_ok());
        assert!(matches!(
            require(Some(&member), Capability::SendNewsletter),
            Err(AuthError::Forbidden { .. })
        ));
        assert_eq!(
            require(None, Capability::ManageContent).unwrap_err(),
            AuthError::MissingCredentials
        );
    }

    #[tokio::test]
    async fn authorize_distinguishes_401_and_403() {
        let p = InMemoryIdentityProvider::new(Duration::hours(1));
        p.register("admin@oerc.ca", "pw", [Role::Admin]).unwrap();
        p.register("m@oerc.ca", "pw", [Role::Member]).unwrap();
        let admin = p.sign_in("admin@oerc.ca", "pw").await.unwrap();
        let member = p.sign_in("m@oerc.ca", "pw").await.unwrap();

        let ok = authorize(
            &p,
            &Credentials::Bearer(admin.access_token),
            Capability::ManageSubscribers,
        )
        .await
        .unwrap();
        assert_eq!(ok.email, "admin@oerc.ca");

        let denied = authorize(
            &p,
            &Credentials::Bearer(member.access_token),
            Capability::ManageSubscribers,
        )
        .await
        .unwrap_err();
        assert!(!denied.is_unauthenticated());

        let anon = authorize(&p, &Credentials::Anonymous, Capability::ManageSubscribers)
            .await
            .unwrap_err();
        assert!(anon.is_unauthenticated());

        let bogus = authorize(
            &p,
            &Credentials::Bearer("bogus".into()),
            Capability::ManageSubscribers,
        )
        .await
        .unwrap_err();
        assert_eq!(bogus, AuthError::InvalidToken);
    }
}
