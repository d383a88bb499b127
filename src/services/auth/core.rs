//! Composed authorization pipeline.

use super::bearer;
use super::error::AuthError;
use super::permissions;
use super::verifier::{Claims, TokenVerifier};

/// Everything between "raw Authorization header" and "authorized claims".
#[derive(Debug)]
pub struct AuthService {
    verifier: TokenVerifier,
}

impl AuthService {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Run the whole pipeline for one request: extract the bearer token,
    /// verify it, then require `permission` (empty = any authenticated caller).
    pub async fn authorize(
        &self,
        header: Option<&str>,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let token = bearer::token_from_header(header)?;
        let claims = self.verifier.verify(token).await?;
        permissions::check(&claims, permission)?;

        Ok(claims)
    }
}
