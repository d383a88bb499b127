//! Rejection taxonomy for the authorization chain.
//!
//! Every failure between "request arrived" and "handler invoked" is one of
//! these variants. The HTTP layer only translates; it never re-classifies.
//!
//! code / status mapping:
//! - `header_missing`  401  no Authorization header
//! - `invalid_header`  401  malformed Bearer scheme, or missing `kid`
//! - `invalid_header`  400  JWKS fetch/parse failure, no matching key,
//!                          unsupported/malformed token
//! - `token_expired`   401  signature valid, expiry passed
//! - `invalid_claims`  401  audience/issuer mismatch
//! - `invalid_claims`  400  claim set has no permissions field
//! - `invalid_payload` 400  verified payload does not decode into claims
//! - `unauthorized`    403  required permission absent from the token

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    // 401: the header itself is not a usable `Bearer <token>` pair.
    #[error("{0}")]
    MalformedHeader(&'static str),

    // 400: we have a token but cannot verify it (bad JWT, key trouble).
    #[error("{0}")]
    Unverifiable(&'static str),

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Permissions not included in the token.")]
    MissingPermissions,

    #[error("Unable to decode payload.")]
    UndecodablePayload,

    #[error("Permission not found.")]
    Forbidden,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "header_missing",
            Self::MalformedHeader(_) | Self::Unverifiable(_) => "invalid_header",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims | Self::MissingPermissions => "invalid_claims",
            Self::UndecodablePayload => "invalid_payload",
            Self::Forbidden => "unauthorized",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingHeader
            | Self::MalformedHeader(_)
            | Self::TokenExpired
            | Self::InvalidClaims => StatusCode::UNAUTHORIZED,
            Self::Unverifiable(_) | Self::MissingPermissions | Self::UndecodablePayload => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_follow_the_taxonomy() {
        let cases = [
            (AuthError::MissingHeader, "header_missing", 401),
            (AuthError::MalformedHeader("x"), "invalid_header", 401),
            (AuthError::Unverifiable("x"), "invalid_header", 400),
            (AuthError::TokenExpired, "token_expired", 401),
            (AuthError::InvalidClaims, "invalid_claims", 401),
            (AuthError::MissingPermissions, "invalid_claims", 400),
            (AuthError::UndecodablePayload, "invalid_payload", 400),
            (AuthError::Forbidden, "unauthorized", 403),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status().as_u16(), status);
        }
    }

    #[test]
    fn carried_description_is_the_display_text() {
        let err = AuthError::MalformedHeader("Token not found.");
        assert_eq!(err.to_string(), "Token not found.");
    }
}
