//! JWKS retrieval and signing-key lookup.
//!
//! The identity provider publishes its RSA public keys at
//! `{issuer}/.well-known/jwks.json`. `KeyStore` keeps a time-bounded snapshot
//! of that document so the common case (known `kid`, fresh cache) verifies
//! without a network round trip.
//!
//! Refresh rules:
//! - snapshot older than the TTL → re-fetch before answering
//! - `kid` not present in a fresh snapshot → one forced re-fetch (covers key
//!   rotation), then the miss is final for that request

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use super::error::AuthError;

const UNABLE_TO_PARSE: &str = "Unable to parse authentication token.";
const UNABLE_TO_FIND_KEY: &str = "Unable to find the appropriate key.";

#[derive(Clone)]
struct CachedKeys {
    set: Arc<JwkSet>,
    fetched_at: Instant,
}

impl CachedKeys {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

pub struct KeyStore {
    http: reqwest::Client,
    jwks_url: Url,
    cache_ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("jwks_url", &self.jwks_url.as_str())
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl KeyStore {
    /// `fetch_timeout` bounds the whole JWKS request so one slow identity
    /// provider cannot stall protected routes indefinitely.
    pub fn new(
        jwks_url: Url,
        cache_ttl: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(fetch_timeout).build()?;

        Ok(Self {
            http,
            jwks_url,
            cache_ttl,
            cache: RwLock::new(None),
        })
    }

    /// Resolve the RSA public key for `kid`, fetching/refreshing the JWKS as
    /// needed. Key-ids should be unique; on duplicates the first match wins.
    pub async fn resolve(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let jwk = match self.fresh_key(kid).await {
            Some(jwk) => jwk,
            None => {
                // Stale snapshot, cold start, or unknown kid: re-fetch once.
                self.refresh().await?;
                self.any_key(kid)
                    .await
                    .ok_or(AuthError::Unverifiable(UNABLE_TO_FIND_KEY))?
            }
        };

        DecodingKey::from_jwk(&jwk).map_err(|e| {
            warn!(kid, error = %e, "jwk is not usable as a decoding key");
            AuthError::Unverifiable(UNABLE_TO_PARSE)
        })
    }

    // kid lookup against a fresh snapshot only.
    async fn fresh_key(&self, kid: &str) -> Option<Jwk> {
        let guard = self.cache.read().await;
        let cached = guard.as_ref()?;
        if !cached.is_fresh(self.cache_ttl) {
            return None;
        }
        cached.set.find(kid).cloned()
    }

    // kid lookup regardless of snapshot age (used right after a refresh).
    async fn any_key(&self, kid: &str) -> Option<Jwk> {
        let guard = self.cache.read().await;
        guard.as_ref().and_then(|c| c.set.find(kid).cloned())
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let set = self.fetch().await?;
        debug!(keys = set.keys.len(), "jwks refreshed");

        let mut guard = self.cache.write().await;
        *guard = Some(CachedKeys {
            set: Arc::new(set),
            fetched_at: Instant::now(),
        });

        Ok(())
    }

    // Any transport/status/parse problem means the token cannot be verified.
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .http
            .get(self.jwks_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(url = %self.jwks_url, error = %e, "jwks fetch failed");
                AuthError::Unverifiable(UNABLE_TO_PARSE)
            })?;

        response.json::<JwkSet>().await.map_err(|e| {
            warn!(url = %self.jwks_url, error = %e, "jwks body is not a key set");
            AuthError::Unverifiable(UNABLE_TO_PARSE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JWKS_PATH: &str = "/.well-known/jwks.json";

    fn store_for(server: &MockServer) -> KeyStore {
        let url = Url::parse(&format!("{}{}", server.uri(), JWKS_PATH)).unwrap();
        KeyStore::new(url, Duration::from_secs(300), Duration::from_secs(2)).unwrap()
    }

    async fn mount_jwks(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn fetch_failure_is_unverifiable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.resolve("whatever").await.unwrap_err();
        assert_eq!(err, AuthError::Unverifiable(UNABLE_TO_PARSE));
    }

    #[tokio::test]
    async fn non_jwks_body_is_unverifiable() {
        let server = MockServer::start().await;
        mount_jwks(&server, json!({"nope": true})).await;

        let store = store_for(&server);
        let err = store.resolve("whatever").await.unwrap_err();
        assert_eq!(err, AuthError::Unverifiable(UNABLE_TO_PARSE));
    }

    #[tokio::test]
    async fn unknown_kid_fails_after_one_fetch() {
        let server = MockServer::start().await;
        mount_jwks(
            &server,
            json!({"keys": [{"kty": "RSA", "kid": "kid-b", "use": "sig", "n": "AQAB", "e": "AQAB"}]}),
        )
        .await;

        let store = store_for(&server);
        let err = store.resolve("kid-a").await.unwrap_err();
        assert_eq!(err, AuthError::Unverifiable(UNABLE_TO_FIND_KEY));

        // Cold cache: resolve needs exactly one fetch to learn the kid is absent.
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unusable_key_material_is_unverifiable() {
        let server = MockServer::start().await;
        // kid matches but n/e are not valid base64url key material.
        mount_jwks(
            &server,
            json!({"keys": [{"kty": "RSA", "kid": "kid-a", "use": "sig", "n": "!!!", "e": "!!!"}]}),
        )
        .await;

        let store = store_for(&server);
        let err = store.resolve("kid-a").await.unwrap_err();
        assert_eq!(err, AuthError::Unverifiable(UNABLE_TO_PARSE));
    }

    #[tokio::test]
    async fn unknown_kid_on_warm_cache_forces_a_refetch() {
        let server = MockServer::start().await;
        mount_jwks(
            &server,
            json!({"keys": [{"kty": "RSA", "kid": "kid-b", "use": "sig", "n": "AQAB", "e": "AQAB"}]}),
        )
        .await;

        let store = store_for(&server);
        let _ = store.resolve("kid-a").await; // warms the cache (1 fetch)
        let _ = store.resolve("kid-a").await; // fresh cache, kid still unknown (1 more)

        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
