use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::AppError,
    food_items::{
        dto::{FoodItemPatch, ListQuery, SearchQuery, UpsertFoodItemRequest},
        repo::FoodItem,
        services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/foodItems", get(list_food_items))
        .route("/foodItems/search", get(search_food_items))
        .route("/foodItems/:id", get(get_food_item))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/foodItems", post(upsert_food_item))
        .route("/foodItems/bulk", post(upsert_food_items_bulk))
        .route("/foodItems/:id", patch(update_food_item))
        .route("/foodItems/:id", delete(delete_food_item))
}

#[instrument(skip(state))]
pub async fn list_food_items(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<FoodItem>>, AppError> {
    let items = services::list_sorted(&state.db, &q.sort_by, q.direction).await?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn upsert_food_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpsertFoodItemRequest>,
) -> Result<(StatusCode, Json<FoodItem>), AppError> {
    let item = services::upsert(&state.db, current.id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, payload))]
pub async fn upsert_food_items_bulk(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<Vec<UpsertFoodItemRequest>>,
) -> Result<(StatusCode, Json<Vec<FoodItem>>), AppError> {
    let items = services::upsert_bulk(&state.db, current.id, payload).await?;
    Ok((StatusCode::CREATED, Json(items)))
}

#[instrument(skip(state, payload))]
pub async fn update_food_item(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FoodItemPatch>,
) -> Result<Json<FoodItem>, AppError> {
    let item = services::update_by_id(&state.db, id, payload).await?;
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn delete_food_item(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_by_id(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_food_item(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodItem>, AppError> {
    let item = services::get_food_item(&state.db, id).await?;
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn search_food_items(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<FoodItem>>, AppError> {
    let items = services::search(&state.db, &q.search_term).await?;
    Ok(Json(items))
}
