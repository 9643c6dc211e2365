//! Host-routed credential resolution, the public entry point.
//!
//! A [`CredentialsProvider`] maps a request URL to the integration
//! configured for its host, asks that integration's [`CredentialsMux`] for
//! an app token, and falls back to the integration's static token or
//! anonymous access. There is no default integration: an unconfigured host
//! is a configuration error.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use super::manager::AppManager;
use super::mux::CredentialsMux;
use crate::cache::TokenCache;
use crate::config::Config;
use crate::error::CredentialError;
use crate::github::{GitHubApi, OctocrabApi};
use crate::types::{AppId, CredentialType, GithubCredentials, OwnerLogin, RepoName};

/// The credential sources for one GitHub host.
#[derive(Debug)]
pub struct IntegrationCredentials<A> {
    mux: CredentialsMux<A>,
    static_token: Option<String>,
}

impl<A: GitHubApi> IntegrationCredentials<A> {
    pub fn new(mux: CredentialsMux<A>, static_token: Option<String>) -> Self {
        IntegrationCredentials { mux, static_token }
    }
}

/// Resolves credentials for request URLs across every configured host.
#[derive(Debug)]
pub struct CredentialsProvider<A> {
    integrations: HashMap<String, IntegrationCredentials<A>>,
}

impl CredentialsProvider<OctocrabApi> {
    /// Builds the production provider from configuration.
    ///
    /// The token cache is injected rather than created here so that every
    /// manager in the process shares one table, and so tests and embedders
    /// control its lifetime.
    pub fn from_config(config: &Config, cache: Arc<TokenCache>) -> Result<Self, CredentialError> {
        let mut integrations = HashMap::new();
        for integration in &config.integrations {
            let base_url = integration.api_base_url.as_deref();
            let managers = integration
                .apps
                .iter()
                .map(|app| {
                    let api = OctocrabApi::from_config(app, base_url)?;
                    Ok(AppManager::new(
                        AppId(app.app_id),
                        app.allowed_installation_owners.clone(),
                        api,
                        Arc::clone(&cache),
                    ))
                })
                .collect::<Result<Vec<_>, CredentialError>>()?;
            integrations.insert(
                integration.host.clone(),
                IntegrationCredentials::new(CredentialsMux::new(managers), integration.token.clone()),
            );
        }
        Ok(CredentialsProvider { integrations })
    }
}

impl<A: GitHubApi> CredentialsProvider<A> {
    pub fn new(integrations: HashMap<String, IntegrationCredentials<A>>) -> Self {
        CredentialsProvider { integrations }
    }

    /// Returns credentials for an organization or repository URL.
    ///
    /// Consecutive calls with the same URL return cached credentials; the
    /// shortest lifetime for a returned token is ten minutes. An anonymous
    /// result (no token, no headers) means "proceed unauthenticated", not
    /// failure.
    pub async fn credentials(&self, url: &str) -> Result<GithubCredentials, CredentialError> {
        let target = RequestTarget::parse(url)?;
        let integration =
            self.integrations
                .get(&target.host)
                .ok_or_else(|| CredentialError::UnknownHost {
                    host: target.host.clone(),
                })?;

        if let Some(issued) = integration
            .mux
            .app_token(&target.owner, target.repo.as_ref())
            .await?
        {
            return Ok(GithubCredentials::bearer(issued.token, CredentialType::App));
        }

        match &integration.static_token {
            Some(token) => Ok(GithubCredentials::bearer(
                token.clone(),
                CredentialType::Token,
            )),
            None => Ok(GithubCredentials::anonymous(CredentialType::Token)),
        }
    }
}

/// A request URL broken into the parts routing needs: the host, the owner
/// (first path segment), and the repository (second segment, if present).
#[derive(Debug, PartialEq, Eq)]
struct RequestTarget {
    host: String,
    owner: OwnerLogin,
    repo: Option<RepoName>,
}

impl RequestTarget {
    fn parse(url: &str) -> Result<Self, CredentialError> {
        let invalid = |reason: &str| CredentialError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(url).map_err(|err| CredentialError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        let host = parsed.host_str().ok_or_else(|| invalid("URL has no host"))?;

        let mut segments = parsed
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|segment| !segment.is_empty());
        let owner = segments
            .next()
            .ok_or_else(|| invalid("URL has no owner path segment"))?;
        let repo = segments
            .next()
            .map(|segment| RepoName::new(segment.strip_suffix(".git").unwrap_or(segment)));

        Ok(RequestTarget {
            host: host.to_string(),
            owner: OwnerLogin::new(owner),
            repo,
        })
    }
}
