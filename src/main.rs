//! Debug CLI: resolve credentials for a URL against a TOML config.
//!
//! ```sh
//! github-token-mux config.toml https://github.com/acme/widgets
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use github_token_mux::auth::CredentialsProvider;
use github_token_mux::cache::{MetricsQuotaSink, TokenCache};
use github_token_mux::config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_token_mux=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(config_path), Some(url)) = (args.next(), args.next()) else {
        eprintln!("usage: github-token-mux <config.toml> <url>");
        std::process::exit(2);
    };

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load {config_path}: {err}");
            std::process::exit(1);
        }
    };

    let cache = Arc::new(TokenCache::new(Arc::new(MetricsQuotaSink)));
    let provider = match CredentialsProvider::from_config(&config, cache) {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("failed to build credentials provider: {err}");
            std::process::exit(1);
        }
    };

    match provider.credentials(&url).await {
        Ok(credentials) => {
            println!("type: {:?}", credentials.credential_type);
            match credentials.token {
                Some(token) => println!("token: {}...", &token[..token.len().min(8)]),
                None => println!("token: none (anonymous)"),
            }
        }
        Err(err) => {
            eprintln!("credential resolution failed: {err}");
            std::process::exit(1);
        }
    }
}
