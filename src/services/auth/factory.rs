/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::core::AuthService;
use crate::services::auth::jwks::KeyStore;
use crate::services::auth::verifier::TokenVerifier;

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AppError> {
    let jwks_url = config
        .issuer_base
        .join(".well-known/jwks.json")
        .map_err(|e| {
            error!(error = %e, "could not derive the jwks url from the issuer");
            AppError::Internal
        })?;

    let keys = KeyStore::new(
        jwks_url,
        Duration::from_secs(config.jwks_cache_ttl_seconds),
        Duration::from_secs(config.jwks_fetch_timeout_seconds),
    )
    .map_err(|e| {
        error!(error = %e, "could not build the jwks http client");
        AppError::Internal
    })?;

    let verifier = TokenVerifier::new(
        keys,
        config.issuer_base.as_str(),
        &config.auth_audience,
        config.auth_leeway_seconds,
    );

    Ok(Arc::new(AuthService::new(verifier)))
}
