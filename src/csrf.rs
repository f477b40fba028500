use axum_extra::extract::cookie::SignedCookieJar;
use cookie::{Cookie, SameSite};

use crate::error::{AppError, AppResult};

const COOKIE_NAME: &str = "topmovies_form";

/// Returns the form token for this browser, minting one (and the signed
/// cookie that mirrors it) on first use.
pub fn issue(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(existing) = jar.get(COOKIE_NAME) {
        let token = existing.value().to_string();
        return (jar, token);
    }

    let token = uuid::Uuid::new_v4().to_string();
    let cookie = Cookie::build((COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::hours(12));
    (jar.add(cookie), token)
}

pub fn verify(jar: &SignedCookieJar, submitted: &str) -> AppResult<()> {
    match jar.get(COOKIE_NAME) {
        Some(cookie) if !submitted.is_empty() && cookie.value() == submitted => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}
