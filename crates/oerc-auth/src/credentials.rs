use crate::error::{AuthError, AuthResult};

/// Credentials presented with a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Parse an `Authorization` header value. No header means anonymous.
    pub fn from_authorization(header: Option<&str>) -> AuthResult<Self> {
        let Some(value) = header else {
            return Ok(Self::Anonymous);
        };
        let value = value.trim();
        let (scheme, token) = value
            .split_once(' ')
            .ok_or(AuthError::MalformedCredentials)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(AuthError::MalformedCredentials);
        }
        Ok(Self::Bearer(token.to_string()))
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(Credentials::from_authorization(None).unwrap(), Credentials::Anonymous);
        assert!(!Credentials::Anonymous.is_authenticated());
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let c = Credentials::from_authorization(Some("bearer abc123")).unwrap();
        assert_eq!(c, Credentials::Bearer("abc123".into()));
        assert!(c.is_authenticated());
    }

    #[test]
    fn other_schemes_are_malformed() {
        assert_eq!(
            Credentials::from_authorization(Some("Basic dXNlcjpwdw==")),
            Err(AuthError::MalformedCredentials)
        );
        assert_eq!(
            Credentials::from_authorization(Some("Bearer")),
            Err(AuthError::MalformedCredentials)
        );
    }
}
