//! Access-token verification.
//!
//! Only RS256 is accepted. The token's `kid` header picks the public key out
//! of the issuer's JWKS, then signature, `exp`, `aud` and `iss` are checked in
//! one `decode` call.

use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::error::AuthError;
use super::jwks::KeyStore;

const UNABLE_TO_PARSE: &str = "Unable to parse authentication token.";

/// Claims of a verified access token, as this API consumes them.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub sub: String,
    /// May be a single string or an array of strings.
    #[serde(default)]
    pub aud: Value,
    pub exp: u64,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct TokenVerifier {
    keys: KeyStore,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: KeyStore, issuer: &str, audience: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Self { keys, validation }
    }

    /// Check signature, expiry, audience and issuer, and return the claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            warn!(error = %e, "token header is not decodable");
            AuthError::Unverifiable(UNABLE_TO_PARSE)
        })?;

        // A header that names no key is malformed before anything else is judged.
        let kid = header
            .kid
            .ok_or(AuthError::MalformedHeader("Authorization malformed."))?;

        if header.alg != Algorithm::RS256 {
            warn!(alg = ?header.alg, "token signed with an unsupported algorithm");
            return Err(AuthError::Unverifiable(UNABLE_TO_PARSE));
        }

        let key = self.keys.resolve(&kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| {
            warn!(error = %e, "token verification failed");
            classify(e)
        })?;

        Ok(data.claims)
    }
}

// Collapse the library's error kinds into the closed set callers answer with.
// Validation runs before the claims deserialize into `Claims`, so a missing
// exp/aud/iss shows up as `MissingRequiredClaim`, not as a JSON error.
fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        ErrorKind::Json(_) => AuthError::UndecodablePayload,
        _ => AuthError::Unverifiable(UNABLE_TO_PARSE),
    }
}
