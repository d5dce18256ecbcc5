use axum::{
    extract::{Path, State},
    Json,
};
use kernel::model::id::ServiceId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::service::{ServiceResponse, ServicesResponse};

pub async fn show_service_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ServicesResponse>> {
    registry
        .service_repository()
        .find_active()
        .await
        .map(ServicesResponse::from)
        .map(Json)
}

pub async fn show_service(
    Path(service_id): Path<ServiceId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ServiceResponse>> {
    registry
        .service_repository()
        .find_by_id(service_id)
        .await
        .and_then(|s| match s {
            Some(s) if s.is_active => Ok(Json(s.into())),
            _ => Err(AppError::EntityNotFound("not found".into())),
        })
}
