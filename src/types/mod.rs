//! Core domain types: identifiers, token records, and credential surfaces.

mod credentials;
mod ids;
mod token;

pub use credentials::{CredentialType, GithubCredentials};
pub use ids::{AppId, InstallationId, OwnerLogin, RepoName};
pub use token::{
    InstallationTokenRecord, IssuedToken, RateLimitSnapshot, EXPIRY_GRACE, RATE_LIMIT_MAX_AGE,
};
