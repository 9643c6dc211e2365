//! GitHub API boundary: the trait the credential layers consume and its
//! octocrab-backed production implementation.

mod api;
mod client;

pub use api::{GitHubApi, InstallationSummary, MintedToken, RepositorySelection};
pub use client::OctocrabApi;
