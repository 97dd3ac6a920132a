//! Pre-emptive basic authentication.
//!
//! Credentials are turned into an `Authorization` header before the first
//! request goes out; the service is never given the chance to challenge.

use base64::Engine;
use bookcheck_domain::AuthConfig;
use bookcheck_domain::auth::AuthResolution;

/// Resolves an [`AuthConfig`] into the header to attach, if any.
#[must_use]
pub fn resolve_auth(auth: &AuthConfig) -> AuthResolution {
    match auth {
        AuthConfig::None => AuthResolution::None,
        AuthConfig::Basic { username, password } => resolve_basic(username, password),
    }
}

fn resolve_basic(username: &str, password: &str) -> AuthResolution {
    let credentials = format!("{username}:{password}");
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
    AuthResolution::Header {
        name: "Authorization".to_string(),
        value: format!("Basic {encoded}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_basic() {
        // "admin:password123" base64 encoded is "YWRtaW46cGFzc3dvcmQxMjM="
        assert_eq!(
            resolve_auth(&AuthConfig::basic("admin", "password123")),
            AuthResolution::Header {
                name: "Authorization".to_string(),
                value: "Basic YWRtaW46cGFzc3dvcmQxMjM=".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_none() {
        assert_eq!(resolve_auth(&AuthConfig::None), AuthResolution::None);
    }
}
