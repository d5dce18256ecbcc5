use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::HouseId;
use registry::AppRegistry;
use serde_json::json;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::house::{
        CreateHouseRequest, HouseDetailResponse, HouseListQuery, PaginatedHouseResponse,
        UpdateHouseRequest, UpdateHouseRequestWithIds,
    },
};

const SIMILAR_HOUSES: i64 = 4;

pub async fn show_house_list(
    Query(query): Query<HouseListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedHouseResponse>> {
    query.validate()?;

    registry
        .house_repository()
        .find_all(query.into())
        .await
        .map(PaginatedHouseResponse::from)
        .map(Json)
}

pub async fn show_house(
    Path(house_id): Path<HouseId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<HouseDetailResponse>> {
    let house = registry
        .house_repository()
        .find_by_id(house_id)
        .await?
        .filter(|h| h.is_active)
        .ok_or_else(|| AppError::EntityNotFound("not found".into()))?;

    let rating = registry
        .review_repository()
        .rating_stats(Some(house_id))
        .await?;
    let similar = registry
        .house_repository()
        .find_similar(&house, SIMILAR_HOUSES)
        .await?;

    Ok(Json(HouseDetailResponse::new(house, rating, similar)))
}

pub async fn register_house(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateHouseRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate()?;

    let house_id = registry.house_repository().create(req.into()).await?;
    tracing::info!(%house_id, registered_by = %user.id(), "House registered");
    Ok((StatusCode::CREATED, Json(json!({ "houseId": house_id }))))
}

pub async fn update_house(
    user: AuthorizedUser,
    Path(house_id): Path<HouseId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateHouseRequest>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate()?;

    let update_house = UpdateHouseRequestWithIds::new(house_id, user.id(), req);
    registry
        .house_repository()
        .update(update_house.into())
        .await
        .map(|_| StatusCode::OK)
}
