//! Rate-aware installation token cache.
//!
//! One shared table holds every `(owner, app)` token in the process. Each
//! entry cycles `Empty -> Minting -> Valid -> Expired -> Minting -> ...`,
//! with a `Fresh <-> Stale` rate-limit sub-cycle orthogonal to expiry.
//!
//! Concurrency: the lookup-then-mint sequence is a check-then-act, so each
//! key owns an async mutex. Two callers racing on an empty or expired entry
//! produce exactly one supplier invocation; the loser observes the winner's
//! record (mint-once, fan-out-read). Entries for different keys never
//! contend. A failed or cancelled mint stores nothing, leaving the entry
//! empty or expired for the next attempt.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::quota::QuotaSink;
use crate::error::CredentialError;
use crate::github::GitHubApi;
use crate::types::{
    AppId, InstallationTokenRecord, IssuedToken, OwnerLogin, RepoName, EXPIRY_GRACE,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    owner: OwnerLogin,
    app_id: AppId,
}

type Slot = Arc<Mutex<Option<InstallationTokenRecord>>>;

/// In-memory cache of installation tokens, shared by every app manager in
/// the process.
///
/// The cache is never proactively evicted: the key space is bounded by the
/// number of owners the configured apps are installed on, and records are
/// replaced wholesale when they expire.
pub struct TokenCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
    sink: Arc<dyn QuotaSink>,
}

impl TokenCache {
    pub fn new(sink: Arc<dyn QuotaSink>) -> Self {
        TokenCache {
            entries: Mutex::new(HashMap::new()),
            sink,
        }
    }

    /// Returns a currently valid record for `(owner, app_id)`, minting one
    /// via `supplier` when the entry is empty or expired.
    ///
    /// The supplier reports the server-declared expiry; the cache subtracts
    /// [`EXPIRY_GRACE`] at store time, so consumers never observe a token
    /// inside its last ten minutes of life. Supplier failures propagate
    /// unmodified and store nothing.
    ///
    /// Independently of minting, the record's rate-limit snapshot is
    /// refreshed through `api` whenever it is absent or stale; quota drains
    /// continuously between mints, so a cached token does not imply a
    /// current snapshot. The last observed remaining quota is republished to
    /// the gauge sink keyed by installation id.
    ///
    /// When `repo` is given, the record must apply to it; a violation is
    /// [`CredentialError::RepositoryNotAuthorized`], not a retry condition.
    pub async fn get_or_create<A, F, Fut>(
        &self,
        api: &A,
        app_id: AppId,
        owner: &OwnerLogin,
        repo: Option<&RepoName>,
        supplier: F,
    ) -> Result<IssuedToken, CredentialError>
    where
        A: GitHubApi,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<InstallationTokenRecord, CredentialError>>,
    {
        let slot = self.slot(app_id, owner).await;
        let mut guard = slot.lock().await;

        let now = Utc::now();
        let record = match &mut *guard {
            Some(record) if !record.is_expired(now) => record,
            entry => {
                let minted = supplier().await?;
                tracing::debug!(
                    owner = %owner,
                    app_id = %app_id,
                    installation = %minted.installation_id,
                    "caching freshly minted installation token"
                );
                entry.insert(InstallationTokenRecord {
                    expires_at: minted.expires_at - EXPIRY_GRACE,
                    ..minted
                })
            }
        };

        let refresh_reason = match &record.rate_limit {
            None => Some("no snapshot yet"),
            Some(snapshot) if snapshot.is_stale(now) => Some("snapshot too old"),
            Some(_) => None,
        };
        if let Some(reason) = refresh_reason {
            tracing::debug!(
                installation = %record.installation_id,
                reason,
                "refreshing rate limit"
            );
            record.rate_limit = Some(api.rate_limit(&record.token).await?);
        }

        if let Some(snapshot) = &record.rate_limit {
            self.sink.record(record.installation_id, snapshot.remaining);
        }

        if let Some(repo) = repo {
            if !record.applies_to_repo(Some(repo)) {
                return Err(CredentialError::RepositoryNotAuthorized {
                    owner: owner.clone(),
                    repo: repo.clone(),
                });
            }
        }

        Ok(IssuedToken {
            token: record.token.clone(),
            installation_id: record.installation_id,
            rate_limit: record.rate_limit,
        })
    }

    async fn slot(&self, app_id: AppId, owner: &OwnerLogin) -> Slot {
        let mut entries = self.entries.lock().await;
        entries
            .entry(CacheKey {
                owner: owner.clone(),
                app_id,
            })
            .or_default()
            .clone()
    }

    /// Test-only view of the stored record for a key.
    #[cfg(test)]
    pub(crate) async fn peek(
        &self,
        app_id: AppId,
        owner: &OwnerLogin,
    ) -> Option<InstallationTokenRecord> {
        let slot = self.slot(app_id, owner).await;
        let guard = slot.lock().await;
        guard.clone()
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache").finish_non_exhaustive()
    }
}
