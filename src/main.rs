use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use storefront_api::backend::{self, BackendState};
use storefront_api::config::{config, AppConfig, Environment};
use storefront_api::middleware::AuthState;
use storefront_api::users::{InMemoryUserStore, Role, User};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up TOKEN_SECRET, STOREFRONT_PORT, etc.
    let _ = dotenvy::dotenv();

    let config = config();
    let default_filter = if config.server.enable_request_logging {
        "info,storefront_api=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    config.validate()?;
    tracing::info!("Starting storefront backend in {:?} mode", config.environment);

    let users = load_users(config)?;
    tracing::info!("Loaded {} user(s)", users.len().await);

    let auth = AuthState::new(config.security.token_secret.as_str(), Arc::new(users));
    let app = backend::router(BackendState::new(), auth, &config.security);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Storefront backend listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn load_users(config: &AppConfig) -> anyhow::Result<InMemoryUserStore> {
    if let Some(path) = &config.server.users_file {
        return InMemoryUserStore::from_file(path)
            .with_context(|| format!("failed to load users from {}", path.display()));
    }

    if config.environment == Environment::Development {
        tracing::warn!("No STOREFRONT_USERS_FILE set, seeding development admin with id 1");
        return Ok(InMemoryUserStore::with_users([User {
            id: "1".into(),
            name: "admin".into(),
            email: "admin@localhost".into(),
            role: Role::Admin,
            password: String::new(),
        }]));
    }

    Ok(InMemoryUserStore::new())
}
