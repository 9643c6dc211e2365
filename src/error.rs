//! Credential resolution error taxonomy.
//!
//! The arbitration layer needs to distinguish "this app has no installation
//! for that owner" (safely ignorable when other apps exist) from failures
//! that must surface. Rather than matching on error names or message strings,
//! every failure mode is a closed enum variant and the arbitration rules
//! branch on [`CredentialError::is_ignorable`].

use thiserror::Error;

use crate::types::{AppId, OwnerLogin, RepoName};

/// A failure while resolving credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No integration is configured for the requested host. There is no
    /// default or catch-all integration.
    #[error("there is no GitHub integration that matches {host}; add a configuration for it")]
    UnknownHost { host: String },

    /// The request URL could not be parsed into host and owner.
    #[error("cannot resolve an owner from {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The app has no installation for this owner. Ignorable at the
    /// arbitration layer: other apps or anonymous access may still serve.
    #[error("no app installation found for {owner} in app {app_id}")]
    NoInstallation { owner: OwnerLogin, app_id: AppId },

    /// An installation exists but has been administratively suspended.
    /// Ignorable at the arbitration layer, same as [`Self::NoInstallation`].
    #[error("the GitHub App installation for {owner} in app {app_id} is suspended")]
    SuspendedInstallation { owner: OwnerLogin, app_id: AppId },

    /// The resolved token's repository allow-list excludes the requested
    /// repository. Never ignorable: falling through to another app's token
    /// would mask an intentional access restriction.
    #[error(
        "the GitHub App used in the {owner} organization does not have access \
         to a repository with the name {repo}"
    )]
    RepositoryNotAuthorized { owner: OwnerLogin, repo: RepoName },

    /// The configured private key could not be parsed as RSA PEM.
    #[error("invalid private key for app {app_id}")]
    InvalidPrivateKey {
        app_id: AppId,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    /// Any other GitHub API failure. Propagated unchanged; this subsystem
    /// performs no retry of its own.
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),
}

impl CredentialError {
    /// Whether the arbitration layer may ignore this failure when another
    /// app (or anonymous access) can serve the request.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            CredentialError::NoInstallation { .. } | CredentialError::SuspendedInstallation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installation_errors_are_ignorable() {
        let owner = OwnerLogin::new("acme");
        assert!(CredentialError::NoInstallation {
            owner: owner.clone(),
            app_id: AppId(1),
        }
        .is_ignorable());
        assert!(CredentialError::SuspendedInstallation {
            owner,
            app_id: AppId(1),
        }
        .is_ignorable());
    }

    #[test]
    fn access_restrictions_are_not_ignorable() {
        let err = CredentialError::RepositoryNotAuthorized {
            owner: OwnerLogin::new("acme"),
            repo: RepoName::new("secret-repo"),
        };
        assert!(!err.is_ignorable());

        let err = CredentialError::UnknownHost {
            host: "ghe.example.com".to_string(),
        };
        assert!(!err.is_ignorable());
    }
}
