//! The GitHub API boundary consumed by the credential layers.
//!
//! [`GitHubApi`] abstracts the handful of REST capabilities this subsystem
//! needs: list an app's installations, mint an installation access token,
//! read a token's rate limit, and enumerate the repositories a token can
//! reach. One implementation exists per configured app (it carries that
//! app's signing key); tests substitute a mock.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::CredentialError;
use crate::types::{InstallationId, RateLimitSnapshot, RepoName};

/// Whether an installation covers all of its owner's repositories or only a
/// selected subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositorySelection {
    All,
    Selected,
}

/// One installation of an app, as returned by the installations listing.
#[derive(Debug, Clone)]
pub struct InstallationSummary {
    pub id: InstallationId,

    /// Login of the account the app is installed on. GitHub always populates
    /// this, but the wire field is nullable so it stays optional here.
    pub owner_login: Option<String>,

    /// Set when an administrator has suspended the installation.
    pub suspended: bool,
}

/// A freshly minted installation access token, before any cache adjustment.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,

    /// Server-declared expiry, unadjusted.
    pub expires_at: DateTime<Utc>,

    pub repository_selection: RepositorySelection,

    /// Quota reported alongside the mint, when the implementation captures
    /// it. Absent is fine: the cache fetches a snapshot before first use.
    pub rate_limit: Option<RateLimitSnapshot>,
}

/// The GitHub REST capabilities needed for credential issuance, scoped to
/// one GitHub App.
pub trait GitHubApi: Send + Sync {
    /// Lists every installation of this app, following pagination.
    fn installations(
        &self,
    ) -> impl Future<Output = Result<Vec<InstallationSummary>, CredentialError>> + Send;

    /// Mints an installation access token, scoped to `repo` when given.
    fn create_installation_token(
        &self,
        installation: InstallationId,
        repo: Option<&RepoName>,
    ) -> impl Future<Output = Result<MintedToken, CredentialError>> + Send;

    /// Reads the current rate limit for a token-scoped client.
    fn rate_limit(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<RateLimitSnapshot, CredentialError>> + Send;

    /// Enumerates the repositories accessible to a token, following
    /// pagination. Only meaningful for repository-selected installations.
    fn accessible_repositories(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<RepoName>, CredentialError>> + Send;
}
