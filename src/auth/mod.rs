//! Credential resolution layers: per-app issuance, multi-app arbitration,
//! and host routing.

mod manager;
mod mux;
mod provider;

pub use manager::AppManager;
pub use mux::CredentialsMux;
pub use provider::{CredentialsProvider, IntegrationCredentials};
