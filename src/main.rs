mod catalog;
mod config;
mod csrf;
mod db;
mod entities;
mod error;
mod ranking;
mod routes;
mod templates;
mod tmdb;

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{catalog::Catalog, config::Config, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog<TmdbClient>>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,topmovies=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("topmovies/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_access_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );
    let catalog = Catalog::new(db, tmdb, config.tmdb_image_base_url.clone());

    let cookie_key = match &config.secret_key {
        Some(secret) => Key::try_from(secret.as_bytes())?,
        None => {
            tracing::warn!("SECRET_KEY not set - form tokens will not survive a restart");
            Key::generate()
        },
    };

    let state = AppState { catalog: Arc::new(catalog), cookie_key };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
