/*
 * Responsibility
 * - /drinks 系 CRUD handler
 * - body は String で受けて自前で JSON 解釈 (エラーも共通エンベロープで返すため)
 * - DTO validation → repo 呼び出し → success エンベロープ
 */
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use tracing::{debug, error, info};

use crate::{
    api::dto::drinks::{
        CreateDrinkRequest, DeleteEnvelope, DrinkResponse, DrinksEnvelope, Ingredient,
        UpdateDrinkRequest, normalize_recipe,
    },
    api::extractors::AuthClaims,
    error::AppError,
    repos::drink_repo::{self, DrinkRow},
    state::AppState,
};

// Rows are written through normalize_recipe, so a parse failure here means
// the stored data is corrupt.
fn parse_recipe(row: &DrinkRow) -> Result<Vec<Ingredient>, AppError> {
    serde_json::from_str(&row.recipe).map_err(|e| {
        error!(drink_id = row.id, error = %e, "stored recipe is not valid JSON");
        AppError::Internal
    })
}

fn short_form(row: DrinkRow) -> Result<DrinkResponse, AppError> {
    let recipe = parse_recipe(&row)?;
    Ok(DrinkResponse::short(row.id, row.title, recipe))
}

fn long_form(row: DrinkRow) -> Result<DrinkResponse, AppError> {
    let recipe = parse_recipe(&row)?;
    Ok(DrinkResponse::long(row.id, row.title, recipe))
}

/// GET /drinks: public listing, ingredient names withheld.
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<DrinksEnvelope>, AppError> {
    let rows = drink_repo::list(&state.db).await?;
    let drinks = rows
        .into_iter()
        .map(short_form)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DrinksEnvelope {
        success: true,
        drinks,
    }))
}

/// GET /drinks-detail: full recipes, requires `get:drinks-detail`.
pub async fn list_drinks_detail(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<DrinksEnvelope>, AppError> {
    debug!(sub = %claims.sub, "drink details requested");

    let rows = drink_repo::list(&state.db).await?;
    let drinks = rows
        .into_iter()
        .map(long_form)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DrinksEnvelope {
        success: true,
        drinks,
    }))
}

/// POST /drinks: create a drink, requires `post:drinks`.
pub async fn create_drink(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
    body: String,
) -> Result<Json<DrinksEnvelope>, AppError> {
    let req: CreateDrinkRequest = serde_json::from_str(&body).map_err(|e| {
        debug!(error = %e, "create body is not a drink");
        AppError::BadRequest
    })?;
    req.validate().map_err(|reason| {
        debug!(reason, "drink create rejected");
        AppError::BadRequest
    })?;

    let recipe = normalize_recipe(&req.recipe).map_err(|reason| {
        debug!(reason, "drink create rejected");
        AppError::BadRequest
    })?;
    let stored = serde_json::to_string(&recipe).map_err(|_| AppError::Internal)?;

    let row = drink_repo::create(&state.db, req.title.trim(), &stored).await?;
    info!(sub = %claims.sub, drink_id = row.id, "drink created");

    Ok(Json(DrinksEnvelope {
        success: true,
        drinks: vec![long_form(row)?],
    }))
}

/// PATCH /drinks/{drink_id}: rename and optionally replace the recipe,
/// requires `patch:drinks`.
pub async fn update_drink(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
    drink_id: Result<Path<i64>, PathRejection>,
    body: String,
) -> Result<Json<DrinksEnvelope>, AppError> {
    // Non-numeric ids are answered like unknown drinks.
    let Path(drink_id) = drink_id.map_err(|_| AppError::NotFound)?;

    let req: UpdateDrinkRequest = serde_json::from_str(&body).map_err(|e| {
        debug!(error = %e, "update body is not a drink");
        AppError::BadRequest
    })?;
    req.validate().map_err(|reason| {
        debug!(reason, "drink update rejected");
        AppError::BadRequest
    })?;

    let recipe = match &req.recipe {
        Some(value) => {
            let normalized = normalize_recipe(value).map_err(|reason| {
                debug!(reason, "drink update rejected");
                AppError::BadRequest
            })?;
            Some(serde_json::to_string(&normalized).map_err(|_| AppError::Internal)?)
        }
        None => None,
    };

    let title = req.title.as_deref().map(str::trim);
    let row = drink_repo::update(&state.db, drink_id, title, recipe.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;

    info!(sub = %claims.sub, drink_id, "drink updated");

    Ok(Json(DrinksEnvelope {
        success: true,
        drinks: vec![long_form(row)?],
    }))
}

/// DELETE /drinks/{drink_id}: requires `delete:drinks`.
pub async fn delete_drink(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
    drink_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteEnvelope>, AppError> {
    let Path(drink_id) = drink_id.map_err(|_| AppError::NotFound)?;

    let deleted = drink_repo::delete(&state.db, drink_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    info!(sub = %claims.sub, drink_id, "drink deleted");

    Ok(Json(DeleteEnvelope {
        success: true,
        delete: drink_id,
    }))
}
