//! Service wiring: pick a store backend, build the services over it.

use std::sync::Arc;

use anyhow::Context;

use lsp_auth::{Hs256TokenService, JwtValidator, TokenIssuer};
use lsp_infra::{InMemoryStore, PostgresStore, Services, Stores};

use crate::config::ApiConfig;

/// Services shared by every handler.
pub type AppServices = Services;

/// Everything `build_app` needs from the wiring step.
pub struct Wiring {
    pub services: Arc<AppServices>,
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<Wiring> {
    let stores = match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresStore::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            store.migrate().await.context("failed to apply database schema")?;
            tracing::info!("using postgres store");
            Stores::from_backend(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            Stores::from_backend(Arc::new(InMemoryStore::new()))
        }
    };

    let tokens = Arc::new(Hs256TokenService::new(config.jwt_secret.as_bytes(), config.jwt_expiry));
    let issuer: Arc<dyn TokenIssuer> = tokens.clone();
    let services = Services::new(stores, issuer);

    if let Some(admin) = &config.admin {
        services
            .auth
            .seed_admin(&admin.username, &admin.email, &admin.password)
            .await
            .context("failed to seed admin account")?;
    }

    Ok(Wiring {
        services: Arc::new(services),
        jwt: tokens,
    })
}
