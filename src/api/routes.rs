/*
 * Responsibility
 * - URL 構造を定義
 * - 公開 route と permission 必須 route をここで束ねる
 * - 未定義 route も共通エンベロープの 404 にする (fallback)
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    health::health,
};
use crate::error::AppError;
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let auth = state.auth.clone();

    Router::new()
        .route("/health", get(health))
        .route("/drinks", get(list_drinks))
        .route(
            "/drinks",
            post(create_drink).route_layer(RequireAuth::new(auth.clone(), "post:drinks")),
        )
        .route(
            "/drinks-detail",
            get(list_drinks_detail)
                .route_layer(RequireAuth::new(auth.clone(), "get:drinks-detail")),
        )
        .route(
            "/drinks/{drink_id}",
            patch(update_drink).route_layer(RequireAuth::new(auth.clone(), "patch:drinks")),
        )
        .route(
            "/drinks/{drink_id}",
            delete(delete_drink).route_layer(RequireAuth::new(auth, "delete:drinks")),
        )
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
