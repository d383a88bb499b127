//! Permission check on verified claims.

use super::error::AuthError;
use super::verifier::Claims;

/// Require `permission` to be present in the token's `permissions` claim.
///
/// An empty `permission` means authentication alone is enough, and passes
/// even when the token carries no `permissions` claim at all.
pub fn check(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    if permission.is_empty() {
        return Ok(());
    }

    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::MissingPermissions)?;

    if granted.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
