//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., using an
//! InstallationId where an AppId is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The numeric identifier of a GitHub App.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub u64);

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AppId {
    fn from(n: u64) -> Self {
        AppId(n)
    }
}

/// The numeric identifier of a GitHub App installation.
///
/// An installation binds an app to a specific organization or user account,
/// optionally restricted to a subset of that account's repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallationId(pub u64);

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for InstallationId {
    fn from(n: u64) -> Self {
        InstallationId(n)
    }
}

/// An organization or user login that owns repositories.
///
/// GitHub logins are case-insensitive; comparisons against installation
/// accounts go through [`OwnerLogin::matches`] rather than `==` so that
/// `Acme` and `acme` resolve to the same installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerLogin(pub String);

impl OwnerLogin {
    pub fn new(s: impl Into<String>) -> Self {
        OwnerLogin(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another login.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for OwnerLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerLogin {
    fn from(s: &str) -> Self {
        OwnerLogin(s.to_string())
    }
}

impl From<String> for OwnerLogin {
    fn from(s: String) -> Self {
        OwnerLogin(s)
    }
}

/// A repository name without its owner prefix (`widgets`, not `acme/widgets`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoName(pub String);

impl RepoName {
    pub fn new(s: impl Into<String>) -> Self {
        RepoName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        RepoName(s.to_string())
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        RepoName(s)
    }
}
