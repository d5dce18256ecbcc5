use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use kernel::model::{
    booking::{
        event::CreateBooking,
        pricing::{validate_and_price, BookingParams, RawBookingParams},
        Booking,
    },
    house::House,
    id::{BookingId, HouseId, UserId},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::booking::{
        BookingQuoteQuery, BookingQuoteResponse, BookingResponse, BookingsResponse,
        CreateBookingRequest, CreateBookingResponse, QuoteParts,
    },
};

async fn find_house(registry: &AppRegistry, house_id: HouseId) -> AppResult<House> {
    registry
        .house_repository()
        .find_by_id(house_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("specified house not found".into()))
}

// 他人の予約は存在しないものとして扱う
pub(crate) async fn find_own_booking(
    registry: &AppRegistry,
    user_id: UserId,
    booking_id: BookingId,
) -> AppResult<Booking> {
    registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .filter(|b| b.is_owned_by(user_id))
        .ok_or_else(|| AppError::EntityNotFound("specified booking not found".into()))
}

pub async fn show_quote(
    _user: AuthorizedUser,
    Query(query): Query<BookingQuoteQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingQuoteResponse>> {
    let params = BookingParams::try_from(RawBookingParams::from(query))?;
    let house = find_house(&registry, params.house_id).await?;
    let quote = validate_and_price(&house, &params, Utc::now().date_naive())?;

    let services = registry.service_repository().find_active().await?;
    let recommended = registry
        .service_repository()
        .find_recommended(params.guests)
        .await?;

    Ok(Json(
        QuoteParts {
            house,
            check_in: params.check_in,
            check_out: params.check_out,
            guests: params.guests,
            nights: quote.nights,
            total_cost: quote.total_cost,
            services,
            recommended,
        }
        .into(),
    ))
}

pub async fn create_booking(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<CreateBookingResponse>)> {
    let now = Utc::now();
    let (raw, service_ids) = req.into_parts();
    let params = BookingParams::try_from(raw)?;
    let house = find_house(&registry, params.house_id).await?;

    // 確定時にも見積もりと同じ検証をやり直す
    let quote = validate_and_price(&house, &params, now.date_naive())?;

    let event = CreateBooking::new(
        house.house_id,
        user.id(),
        params.check_in,
        params.check_out,
        params.guests,
        quote.total_cost,
        service_ids,
        now,
    );
    let booking_id = registry.booking_repository().create(event).await?;

    Ok((StatusCode::CREATED, Json(booking_id.into())))
}

pub async fn show_booking_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .booking_repository()
        .find_by_user_id(user.id())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn show_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    find_own_booking(&registry, user.id(), booking_id)
        .await
        .map(BookingResponse::from)
        .map(Json)
}
