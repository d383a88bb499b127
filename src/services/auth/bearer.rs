//! `Authorization` header → bare bearer token.
//!
//! Deliberately dumb: no decoding, no trimming of the token itself. The shape
//! is `Bearer <token>` with a case-insensitive scheme, nothing more.

use super::error::AuthError;

pub fn token_from_header(value: Option<&str>) -> Result<&str, AuthError> {
    let mut parts = value.unwrap_or_default().split_ascii_whitespace();

    // An absent or blank header reads as "no credentials at all".
    let scheme = parts.next().ok_or(AuthError::MissingHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    let token = parts
        .next()
        .ok_or(AuthError::MalformedHeader("Token not found."))?;

    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_header_is_missing() {
        assert_eq!(token_from_header(None), Err(AuthError::MissingHeader));
    }

    #[test]
    fn blank_header_is_missing() {
        assert_eq!(token_from_header(Some("")), Err(AuthError::MissingHeader));
        assert_eq!(
            token_from_header(Some("   ")),
            Err(AuthError::MissingHeader)
        );
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        assert_eq!(
            token_from_header(Some("Token abc")),
            Err(AuthError::MalformedHeader(
                "Authorization header must start with \"Bearer\"."
            ))
        );
    }

    #[test]
    fn scheme_without_token_is_rejected() {
        assert_eq!(
            token_from_header(Some("Bearer")),
            Err(AuthError::MalformedHeader("Token not found."))
        );
    }

    #[test]
    fn extra_segments_are_rejected() {
        assert_eq!(
            token_from_header(Some("Bearer abc def")),
            Err(AuthError::MalformedHeader(
                "Authorization header must be bearer token."
            ))
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(token_from_header(Some("bearer abc")), Ok("abc"));
        assert_eq!(token_from_header(Some("BEARER abc")), Ok("abc"));
    }

    #[test]
    fn token_is_returned_verbatim() {
        assert_eq!(token_from_header(Some("Bearer a.b.c")), Ok("a.b.c"));
        // Extra spacing between scheme and token is tolerated.
        assert_eq!(token_from_header(Some("Bearer   a.b.c")), Ok("a.b.c"));
    }
}
