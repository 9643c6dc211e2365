//! Multi-app credential arbitration.
//!
//! A [`CredentialsMux`] holds every [`AppManager`] configured for one GitHub
//! host and picks the single best token: all managers are queried
//! concurrently and the token with the most remaining quota wins, spreading
//! load away from apps closer to exhaustion. The sort is stable, so
//! first-configured wins ties, including when no candidate has a snapshot.

use std::cmp::Reverse;

use chrono::Utc;
use futures::future::join_all;

use super::manager::AppManager;
use crate::error::CredentialError;
use crate::github::{GitHubApi, InstallationSummary};
use crate::types::{IssuedToken, OwnerLogin, RepoName};

/// Arbitrates between the GitHub Apps configured for one integration.
#[derive(Debug)]
pub struct CredentialsMux<A> {
    /// In configuration order; ties break toward the front.
    managers: Vec<AppManager<A>>,
}

impl<A: GitHubApi> CredentialsMux<A> {
    pub fn new(managers: Vec<AppManager<A>>) -> Self {
        CredentialsMux { managers }
    }

    /// Produces the best token across all managers, or `None` when no app
    /// applies and anonymous access is allowed.
    ///
    /// Per-app failures are collected rather than failing fast. If every
    /// failure is an ignorable installation miss, the result is `None`;
    /// a [`CredentialError::RepositoryNotAuthorized`] surfaces immediately
    /// even when another app produced a token, because it marks an
    /// intentional access restriction; any other failure propagates once no
    /// token is available.
    ///
    /// When the chosen token has zero remaining quota, this call blocks
    /// until the quota resets and then returns that token anyway: every
    /// other candidate was in worse or equal standing, and a fresh window is
    /// imminent. The wait has no internal timeout; callers cancel by
    /// dropping the future.
    pub async fn app_token(
        &self,
        owner: &OwnerLogin,
        repo: Option<&RepoName>,
    ) -> Result<Option<IssuedToken>, CredentialError> {
        if self.managers.is_empty() {
            return Ok(None);
        }

        let results = join_all(
            self.managers
                .iter()
                .map(|manager| manager.issue_token(owner, repo)),
        )
        .await;
        tracing::debug!(owner = %owner, apps = results.len(), "queried app managers");

        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(Some(token)) => candidates.push(token),
                Ok(None) => {}
                Err(err @ CredentialError::RepositoryNotAuthorized { .. }) => return Err(err),
                Err(err) => errors.push(err),
            }
        }

        candidates.sort_by_key(|token| Reverse(token.rate_limit.map(|rl| rl.remaining)));

        if let Some(best) = candidates.into_iter().next() {
            tracing::debug!(
                installation = %best.installation_id,
                remaining = ?best.rate_limit.map(|rl| rl.remaining),
                "selected app token"
            );
            if let Some(rate_limit) = best.rate_limit {
                if rate_limit.remaining == 0 {
                    self.wait_for_reset(rate_limit.reset).await;
                }
            }
            return Ok(Some(best));
        }

        match errors.into_iter().find(|err| !err.is_ignorable()) {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    /// Lists the installations of every manager, flattened.
    pub async fn all_installations(&self) -> Result<Vec<InstallationSummary>, CredentialError> {
        let results = join_all(self.managers.iter().map(|manager| manager.installations())).await;
        let mut all = Vec::new();
        for result in results {
            all.extend(result?);
        }
        Ok(all)
    }

    async fn wait_for_reset(&self, reset: i64) {
        let wait_ms = reset
            .saturating_mul(1000)
            .saturating_sub(Utc::now().timestamp_millis());
        if wait_ms > 0 {
            tracing::warn!(
                seconds = wait_ms / 1000,
                "every usable app is out of quota; waiting for rate limit reset"
            );
            tokio::time::sleep(std::time::Duration::from_millis(wait_ms as u64)).await;
        }
    }
}
