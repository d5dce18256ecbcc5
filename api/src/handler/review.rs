use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{id::ReviewId, review::event::DeleteReview};
use registry::AppRegistry;
use serde_json::json;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::{
        list::ListQuery,
        review::{
            CreateReviewRequest, CreateReviewRequestWithAuthor, PaginatedReviewResponse,
            RatingStatsResponse, UpdateReviewRequest, UpdateReviewRequestWithIds,
        },
    },
};

pub async fn show_review_list(
    Query(query): Query<ListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedReviewResponse>> {
    query.validate()?;

    registry
        .review_repository()
        .find_all(query.into())
        .await
        .map(PaginatedReviewResponse::from)
        .map(Json)
}

pub async fn show_rating_stats(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RatingStatsResponse>> {
    registry
        .review_repository()
        .rating_stats(None)
        .await
        .map(RatingStatsResponse::from)
        .map(Json)
}

pub async fn register_review(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    req.validate()?;

    let review_id = registry
        .review_repository()
        .create(CreateReviewRequestWithAuthor::new(user.id(), req).into())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "reviewId": review_id }))))
}

pub async fn update_review(
    user: AuthorizedUser,
    Path(review_id): Path<ReviewId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateReviewRequest>,
) -> AppResult<StatusCode> {
    req.validate()?;

    registry
        .review_repository()
        .update(UpdateReviewRequestWithIds::new(review_id, user.id(), req).into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_review(
    user: AuthorizedUser,
    Path(review_id): Path<ReviewId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .review_repository()
        .delete(DeleteReview {
            review_id,
            requested_user: user.id(),
        })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
