//! The credentials surface handed to outbound integration clients.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How the credentials were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    /// Resolved through a GitHub App installation token.
    App,
    /// A statically configured personal access token, or anonymous when no
    /// static token is configured either.
    Token,
}

/// Credentials for one request URL.
///
/// `token` and `headers` are both `None` for anonymous access; callers must
/// proceed unauthenticated in that case rather than treat it as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubCredentials {
    /// The bearer token, if one was available.
    pub token: Option<String>,

    /// Headers to attach to outbound requests (`Authorization: Bearer ...`),
    /// present exactly when `token` is.
    pub headers: Option<HashMap<String, String>>,

    /// How the credentials were obtained.
    pub credential_type: CredentialType,
}

impl GithubCredentials {
    /// Wraps a resolved token, building the `Authorization` header.
    pub fn bearer(token: String, credential_type: CredentialType) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        GithubCredentials {
            token: Some(token),
            headers: Some(headers),
            credential_type,
        }
    }

    /// Anonymous access: no token, no headers.
    pub fn anonymous(credential_type: CredentialType) -> Self {
        GithubCredentials {
            token: None,
            headers: None,
            credential_type,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }
}
