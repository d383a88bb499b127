//! Shared harness for the HTTP tests: a mock identity provider serving a
//! JWKS, RSA-signed test tokens, and a real server on an ephemeral port.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::RsaPrivateKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drinks_api::app::build_router;
use drinks_api::config::{AppEnv, Config};
use drinks_api::repos::drink_repo;
use drinks_api::state::AppState;

pub const KID: &str = "integration-key";
pub const AUDIENCE: &str = "drinks";
const JWKS_PATH: &str = "/.well-known/jwks.json";

// One keypair for the whole test binary; generation is the slow part.
fn keypair() -> &'static (RsaPrivateKey, String) {
    static KEYS: OnceLock<(RsaPrivateKey, String)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("generate rsa key");
        let pem = private
            .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
            .expect("encode private key")
            .to_string();
        (private, pem)
    })
}

pub fn jwks_body() -> Value {
    jwks_body_with_kid(KID)
}

pub fn jwks_body_with_kid(kid: &str) -> Value {
    let (private, _) = keypair();
    let public = private.to_public_key();

    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": kid,
            "n": URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
            "e": URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        }]
    })
}

/// Identity provider answering with a JWKS that contains [`KID`].
pub async fn start_jwks_server() -> MockServer {
    let server = MockServer::start().await;
    mount_jwks(&server, jwks_body()).await;
    server
}

/// Identity provider whose JWKS endpoint only returns 500s.
pub async fn start_broken_jwks_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

/// Identity provider whose JWKS endpoint answers only after `delay`.
pub async fn start_slow_jwks_server(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(jwks_body())
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

pub async fn mount_jwks(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Issuer string as it appears in verified tokens (normalized, trailing `/`).
pub fn issuer_of(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}

/// A claim set that passes verification against [`test_config`], expiring in
/// an hour. Tests mutate the returned value to build the failing variants.
pub fn claims_for(issuer: &str, permissions: &[&str]) -> Value {
    json!({
        "iss": issuer,
        "sub": "auth0|integration",
        "aud": AUDIENCE,
        "exp": now_secs() + 3600,
        "permissions": permissions,
    })
}

pub fn sign_token(claims: &Value) -> String {
    sign_token_with_kid(KID, claims)
}

pub fn sign_token_with_kid(kid: &str, claims: &Value) -> String {
    let (_, pem) = keypair();
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("signing key");

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());

    jsonwebtoken::encode(&header, claims, &key).expect("sign token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn test_config(server: &MockServer) -> Config {
    Config {
        addr: SocketAddr::from_str("127.0.0.1:0").expect("test addr"),
        database_url: "sqlite::memory:".into(),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        db_recreate_on_start: true,
        issuer_base: Url::parse(&issuer_of(server)).expect("issuer url"),
        auth_audience: AUDIENCE.into(),
        auth_leeway_seconds: 0,
        jwks_cache_ttl_seconds: 300,
        jwks_fetch_timeout_seconds: 2,
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub db: SqlitePool,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Serve the full router (all middleware applied) on an ephemeral port,
/// backed by a seeded in-memory database and `server` as identity provider.
pub async fn spawn_app(server: &MockServer) -> TestApp {
    let config = test_config(server);

    // In-memory sqlite is per-connection; one connection = one database.
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
        .expect("open sqlite");
    drink_repo::recreate_schema(&db).await.expect("seed schema");

    let auth = drinks_api::services::auth::build_auth_service(&config).expect("auth service");
    let state = AppState::new(db.clone(), auth);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });

    TestApp { addr, db }
}

/// Assert status plus the common error envelope.
pub async fn assert_error(response: reqwest::Response, status: u16, message: &str) {
    assert_eq!(response.status().as_u16(), status);

    let body: Value = response.json().await.expect("error body is json");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(status));
    assert_eq!(body["message"], json!(message));
}
