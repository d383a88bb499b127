use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::services::auth::Claims;
use crate::state::AppState;

/// Handler で、検証済み `Claims` を受け取るための extractor。
/// auth middleware が `Claims` を request.extensions() に insert 済みである前提。
/// 見つからない場合は route の配線ミスなので 500 を返す。
pub struct AuthClaims(pub Claims);

impl FromRequestParts<AppState> for AuthClaims
where
    AppState: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
