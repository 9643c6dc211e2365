//! Rate-limit-aware GitHub App credential issuance and caching.
//!
//! This library obtains, caches, and selects short-lived installation access
//! tokens for one or more configured GitHub Apps. Tokens live only in process
//! memory; records are reminted ten minutes before their declared expiry, and
//! when several apps can serve the same owner the one with the most remaining
//! API quota is chosen.
//!
//! The entry point is [`auth::CredentialsProvider::credentials`], which maps
//! a request URL to headers (`Authorization: Bearer ...`) or anonymous
//! access.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
