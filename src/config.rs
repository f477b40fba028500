use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_rps: u32,
    pub database_url: String,
    /// Signs the form-token cookie. `None` means a key is generated per process.
    pub secret_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 =
            var("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let tmdb_access_token = var("TMDB_ACCESS_TOKEN").unwrap_or_default();
        let tmdb_base_url =
            var("TMDB_BASE_URL").unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|| "https://image.tmdb.org/t/p/w500".to_string());

        let tmdb_rps: u32 = var("TMDB_RPS").and_then(|s| s.parse().ok()).unwrap_or(4);

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://top-movies.db?mode=rwc".to_string());

        let secret_key = var("SECRET_KEY").filter(|s| !s.trim().is_empty());
        if let Some(secret) = &secret_key {
            anyhow::ensure!(
                secret.len() >= 64,
                "SECRET_KEY must be at least 64 bytes, got {}",
                secret.len()
            );
        }

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_rps,
            database_url,
            secret_key,
        })
    }
}
