//! Installation token records and rate-limit snapshots.
//!
//! An [`InstallationTokenRecord`] is what the cache stores for each
//! `(owner, app)` pair: the bearer token itself, its adjusted expiry, the
//! repository allow-list when the installation is repository-selected, and
//! the last observed rate-limit snapshot.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use super::ids::{InstallationId, RepoName};

/// How long before the server-declared expiry a token stops being served.
///
/// GitHub issues installation tokens with a one-hour lifetime. Subtracting
/// ten minutes at store time means consumers never observe a token inside
/// its final ten minutes, which also absorbs clock skew between this process
/// and GitHub.
pub const EXPIRY_GRACE: Duration = Duration::minutes(10);

/// How long a rate-limit snapshot stays usable before a refresh is forced.
pub const RATE_LIMIT_MAX_AGE: Duration = Duration::minutes(2);

/// A point-in-time read of an installation token's remaining API quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Total requests allowed per window.
    pub limit: u32,

    /// Requests still available in the current window.
    pub remaining: u32,

    /// Requests already consumed in the current window.
    pub used: u32,

    /// Unix timestamp at which the window resets.
    pub reset: i64,

    /// When this process observed the snapshot.
    pub fetched_at: DateTime<Utc>,
}

impl RateLimitSnapshot {
    /// Whether the snapshot is too old to base arbitration decisions on.
    ///
    /// Quota is consumed by every caller holding the token, so a snapshot
    /// older than [`RATE_LIMIT_MAX_AGE`] no longer reflects reality.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at > RATE_LIMIT_MAX_AGE
    }
}

/// A cached installation access token for one `(owner, app)` pair.
#[derive(Debug, Clone)]
pub struct InstallationTokenRecord {
    /// The bearer credential. Opaque; never logged.
    pub token: String,

    /// The installation this token was minted for.
    pub installation_id: InstallationId,

    /// Expiry with [`EXPIRY_GRACE`] already subtracted by the cache at store
    /// time. A record is expired once `now > expires_at`.
    pub expires_at: DateTime<Utc>,

    /// Repository names this token grants access to.
    ///
    /// `None` means the installation covers every repository under its owner.
    /// `Some` is present only for repository-selected installations.
    pub allowed_repositories: Option<BTreeSet<RepoName>>,

    /// Last known quota for this token, absent until first fetched.
    pub rate_limit: Option<RateLimitSnapshot>,
}

impl InstallationTokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether this token can serve requests against `repo`.
    ///
    /// A record with no allow-list applies to any repository; otherwise the
    /// repository must be a member of the allow-list. A request without a
    /// specific repository always applies.
    pub fn applies_to_repo(&self, repo: Option<&RepoName>) -> bool {
        match (repo, &self.allowed_repositories) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(repo), Some(allowed)) => allowed.contains(repo),
        }
    }
}

/// What a cache lookup hands back to callers: the resolved token plus the
/// metadata arbitration needs. The cache keeps ownership of the record.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub installation_id: InstallationId,
    pub rate_limit: Option<RateLimitSnapshot>,
}
