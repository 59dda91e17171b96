//! Zendesk authentication.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use ticketq_core::{Auth, Secret};

/// Basic-auth material for one Zendesk session.
///
/// Zendesk API tokens authenticate as `{email}/token:{api_token}` encoded
/// into a basic-auth header.
#[derive(Debug)]
pub struct ZendeskAuth {
    email: String,
    token: Secret,
    base_url: String,
}

impl ZendeskAuth {
    /// Build auth for a Zendesk domain (e.g. `acme.zendesk.com`).
    pub fn new(domain: &str, email: impl Into<String>, token: Secret) -> Self {
        Self::with_base_url(format!("https://{}/api/v2", domain), email, token)
    }

    /// Build auth against an explicit base URL. Used by tests to point at a
    /// mock server.
    pub fn with_base_url(
        base_url: impl Into<String>,
        email: impl Into<String>,
        token: Secret,
    ) -> Self {
        Self {
            email: email.into(),
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Auth for ZendeskAuth {
    fn principal(&self) -> &str {
        &self.email
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Vec<(String, String)> {
        let credentials = format!("{}/token:{}", self.email, self.token.expose());
        vec![
            (
                "Authorization".to_string(),
                format!("Basic {}", BASE64.encode(credentials)),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_from_domain() {
        let auth = ZendeskAuth::new("acme.zendesk.com", "a@acme.com", Secret::new("tok"));
        assert_eq!(auth.base_url(), "https://acme.zendesk.com/api/v2");
        assert_eq!(auth.principal(), "a@acme.com");
    }

    #[test]
    fn test_authorization_header_encodes_email_token_pair() {
        let auth = ZendeskAuth::new("acme.zendesk.com", "a@acme.com", Secret::new("secret"));
        let headers = auth.headers();
        let authorization = &headers
            .iter()
            .find(|(name, _)| name == "Authorization")
            .unwrap()
            .1;

        let expected = BASE64.encode("a@acme.com/token:secret");
        assert_eq!(authorization, &format!("Basic {}", expected));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let auth =
            ZendeskAuth::with_base_url("http://127.0.0.1:9999/api/v2/", "a@b.c", Secret::new("t"));
        assert_eq!(auth.base_url(), "http://127.0.0.1:9999/api/v2");
    }
}
