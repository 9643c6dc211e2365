//! Per-app token issuance.
//!
//! An [`AppManager`] represents one configured GitHub App. It bridges the
//! mux's generic "get me a token for this owner" request to the specifics of
//! that app: its credentials, its allow-listed owners, and its installations.
//! Caching is delegated to the shared [`TokenCache`]; the manager only
//! supplies the mint procedure.

use std::sync::Arc;

use crate::cache::TokenCache;
use crate::error::CredentialError;
use crate::github::{GitHubApi, InstallationSummary, RepositorySelection};
use crate::types::{AppId, InstallationId, InstallationTokenRecord, IssuedToken, OwnerLogin, RepoName};

/// Issues and caches installation tokens for a single GitHub App.
#[derive(Debug)]
pub struct AppManager<A> {
    app_id: AppId,

    /// Owners this app may serve. `None` allows all installations.
    allowed_installation_owners: Option<Vec<String>>,

    api: A,

    /// Shared across every manager in the process: one table keyed by
    /// `(owner, app)`.
    cache: Arc<TokenCache>,
}

impl<A: GitHubApi> AppManager<A> {
    pub fn new(
        app_id: AppId,
        allowed_installation_owners: Option<Vec<String>>,
        api: A,
        cache: Arc<TokenCache>,
    ) -> Self {
        AppManager {
            app_id,
            allowed_installation_owners,
            api,
            cache,
        }
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// Resolves a token for `owner`, scoped to `repo` when given.
    ///
    /// Returns `Ok(None)` when the app's owner allow-list excludes `owner`:
    /// this app simply does not participate, which permits anonymous access
    /// to public repositories. Everything else goes through the shared
    /// cache, minting on demand.
    pub async fn issue_token(
        &self,
        owner: &OwnerLogin,
        repo: Option<&RepoName>,
    ) -> Result<Option<IssuedToken>, CredentialError> {
        if let Some(allowed) = &self.allowed_installation_owners {
            if !allowed.iter().any(|a| a == owner.as_str()) {
                return Ok(None);
            }
        }

        let issued = self
            .cache
            .get_or_create(&self.api, self.app_id, owner, repo, || {
                self.mint(owner, repo)
            })
            .await?;
        Ok(Some(issued))
    }

    /// Lists every installation of this app.
    pub async fn installations(&self) -> Result<Vec<InstallationSummary>, CredentialError> {
        self.api.installations().await
    }

    /// Mints a brand-new record: resolve the installation, create an access
    /// token, and enumerate the accessible repositories when the
    /// installation is repository-selected.
    async fn mint(
        &self,
        owner: &OwnerLogin,
        repo: Option<&RepoName>,
    ) -> Result<InstallationTokenRecord, CredentialError> {
        let installation = self.resolve_installation(owner).await?;
        let minted = self.api.create_installation_token(installation, repo).await?;

        let allowed_repositories = match minted.repository_selection {
            RepositorySelection::Selected => Some(
                self.api
                    .accessible_repositories(&minted.token)
                    .await?
                    .into_iter()
                    .collect(),
            ),
            RepositorySelection::All => None,
        };

        Ok(InstallationTokenRecord {
            token: minted.token,
            installation_id: installation,
            expires_at: minted.expires_at,
            allowed_repositories,
            rate_limit: minted.rate_limit,
        })
    }

    async fn resolve_installation(
        &self,
        owner: &OwnerLogin,
    ) -> Result<InstallationId, CredentialError> {
        let installations = self.api.installations().await?;
        let found = installations.iter().find(|installation| {
            installation
                .owner_login
                .as_deref()
                .is_some_and(|login| owner.matches(login))
        });
        match found {
            None => Err(CredentialError::NoInstallation {
                owner: owner.clone(),
                app_id: self.app_id,
            }),
            Some(installation) if installation.suspended => {
                Err(CredentialError::SuspendedInstallation {
                    owner: owner.clone(),
                    app_id: self.app_id,
                })
            }
            Some(installation) => Ok(installation.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NullQuotaSink;
    use crate::test_utils::MockGitHubApi;

    fn manager(api: MockGitHubApi, allowed: Option<Vec<String>>) -> AppManager<MockGitHubApi> {
        AppManager::new(
            AppId(7),
            allowed,
            api,
            Arc::new(TokenCache::new(Arc::new(NullQuotaSink))),
        )
    }

    #[tokio::test]
    async fn allow_list_miss_yields_no_token() {
        let api = MockGitHubApi::new().with_installation(1, "acme");
        let manager = manager(api.clone(), Some(vec!["other-org".to_string()]));

        let issued = manager
            .issue_token(&OwnerLogin::new("acme"), None)
            .await
            .unwrap();
        assert!(issued.is_none());
        assert_eq!(api.mint_calls(), 0);
    }

    #[tokio::test]
    async fn missing_installation_is_a_tagged_error() {
        let manager = manager(MockGitHubApi::new(), None);
        let err = manager
            .issue_token(&OwnerLogin::new("acme"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::NoInstallation { .. }));
    }

    #[tokio::test]
    async fn suspended_installation_is_rejected() {
        let api = MockGitHubApi::new().with_suspended_installation(1, "acme");
        let manager = manager(api, None);
        let err = manager
            .issue_token(&OwnerLogin::new("acme"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::SuspendedInstallation { .. }));
    }

    #[tokio::test]
    async fn owner_match_is_case_insensitive() {
        let api = MockGitHubApi::new().with_installation(31, "Acme");
        let manager = manager(api.clone(), None);

        let issued = manager
            .issue_token(&OwnerLogin::new("acme"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(issued.installation_id, InstallationId(31));
        assert_eq!(api.mint_calls(), 1);
    }

    #[tokio::test]
    async fn repository_selected_installation_populates_allow_list() {
        let api = MockGitHubApi::new()
            .with_installation(5, "acme")
            .with_selected_repositories(&["a", "b"]);
        let manager = manager(api.clone(), None);
        let owner = OwnerLogin::new("acme");

        let issued = manager
            .issue_token(&owner, Some(&RepoName::new("a")))
            .await
            .unwrap();
        assert!(issued.is_some());
        assert_eq!(api.repo_list_calls(), 1);

        // The cached record carries the allow-list: a repo outside it fails
        // without reminting.
        let err = manager
            .issue_token(&owner, Some(&RepoName::new("c")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CredentialError::RepositoryNotAuthorized { .. }
        ));
        assert_eq!(api.mint_calls(), 1);
    }

    #[tokio::test]
    async fn second_call_reuses_cached_token() {
        let api = MockGitHubApi::new().with_installation(5, "acme");
        let manager = manager(api.clone(), None);
        let owner = OwnerLogin::new("acme");

        let first = manager.issue_token(&owner, None).await.unwrap().unwrap();
        let second = manager.issue_token(&owner, None).await.unwrap().unwrap();
        assert_eq!(first.token, second.token);
        assert_eq!(api.mint_calls(), 1);
    }
}
