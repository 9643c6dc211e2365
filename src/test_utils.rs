//! Shared test doubles: a configurable mock GitHub API and a recording
//! quota sink.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use crate::cache::QuotaSink;
use crate::error::CredentialError;
use crate::github::{GitHubApi, InstallationSummary, MintedToken, RepositorySelection};
use crate::types::{InstallationId, RateLimitSnapshot, RepoName};

/// Mock [`GitHubApi`] with configurable installations, quota, and failure
/// injection. Clones share counters, so a test can keep a handle after
/// moving a clone into the code under test.
#[derive(Clone)]
pub(crate) struct MockGitHubApi {
    installations: Vec<InstallationSummary>,
    selection: RepositorySelection,
    accessible: Vec<RepoName>,
    token_lifetime: Duration,
    remaining: u32,
    reset_at: Option<i64>,
    mint_failures: Arc<Mutex<VecDeque<CredentialError>>>,
    mint_calls: Arc<AtomicUsize>,
    rate_limit_calls: Arc<AtomicUsize>,
    repo_list_calls: Arc<AtomicUsize>,
}

impl MockGitHubApi {
    pub fn new() -> Self {
        MockGitHubApi {
            installations: Vec::new(),
            selection: RepositorySelection::All,
            accessible: Vec::new(),
            token_lifetime: Duration::hours(1),
            remaining: 5000,
            reset_at: None,
            mint_failures: Arc::new(Mutex::new(VecDeque::new())),
            mint_calls: Arc::new(AtomicUsize::new(0)),
            rate_limit_calls: Arc::new(AtomicUsize::new(0)),
            repo_list_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_installation(mut self, id: u64, owner: &str) -> Self {
        self.installations.push(InstallationSummary {
            id: InstallationId(id),
            owner_login: Some(owner.to_string()),
            suspended: false,
        });
        self
    }

    pub fn with_suspended_installation(mut self, id: u64, owner: &str) -> Self {
        self.installations.push(InstallationSummary {
            id: InstallationId(id),
            owner_login: Some(owner.to_string()),
            suspended: true,
        });
        self
    }

    pub fn with_remaining(mut self, remaining: u32) -> Self {
        self.remaining = remaining;
        self
    }

    pub fn with_reset_at(mut self, reset: i64) -> Self {
        self.reset_at = Some(reset);
        self
    }

    pub fn with_selected_repositories(mut self, repos: &[&str]) -> Self {
        self.selection = RepositorySelection::Selected;
        self.accessible = repos.iter().map(|r| RepoName::new(*r)).collect();
        self
    }

    /// Queues an error for the next mint; subsequent mints succeed.
    pub fn fail_next_mint(self, err: CredentialError) -> Self {
        self.mint_failures.lock().unwrap().push_back(err);
        self
    }

    pub fn mint_calls(&self) -> usize {
        self.mint_calls.load(Ordering::SeqCst)
    }

    pub fn rate_limit_calls(&self) -> usize {
        self.rate_limit_calls.load(Ordering::SeqCst)
    }

    pub fn repo_list_calls(&self) -> usize {
        self.repo_list_calls.load(Ordering::SeqCst)
    }
}

impl GitHubApi for MockGitHubApi {
    async fn installations(&self) -> Result<Vec<InstallationSummary>, CredentialError> {
        Ok(self.installations.clone())
    }

    async fn create_installation_token(
        &self,
        installation: InstallationId,
        _repo: Option<&RepoName>,
    ) -> Result<MintedToken, CredentialError> {
        if let Some(err) = self.mint_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let n = self.mint_calls.fetch_add(1, Ordering::SeqCst);
        Ok(MintedToken {
            token: format!("ghs_mock_{installation}_{n}"),
            expires_at: Utc::now() + self.token_lifetime,
            repository_selection: self.selection,
            rate_limit: None,
        })
    }

    async fn rate_limit(&self, _token: &str) -> Result<RateLimitSnapshot, CredentialError> {
        self.rate_limit_calls.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        Ok(RateLimitSnapshot {
            limit: 5000,
            remaining: self.remaining,
            used: 5000 - self.remaining.min(5000),
            reset: self.reset_at.unwrap_or(now.timestamp() + 3600),
            fetched_at: now,
        })
    }

    async fn accessible_repositories(&self, _token: &str) -> Result<Vec<RepoName>, CredentialError> {
        self.repo_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accessible.clone())
    }
}

/// Collects gauge observations for assertions.
#[derive(Default)]
pub(crate) struct RecordingQuotaSink {
    observations: Mutex<Vec<(InstallationId, u32)>>,
}

impl RecordingQuotaSink {
    pub fn observations(&self) -> Vec<(InstallationId, u32)> {
        self.observations.lock().unwrap().clone()
    }
}

impl QuotaSink for RecordingQuotaSink {
    fn record(&self, installation: InstallationId, remaining: u32) {
        self.observations
            .lock()
            .unwrap()
            .push((installation, remaining));
    }
}
