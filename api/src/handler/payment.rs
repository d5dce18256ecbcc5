use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use kernel::{model::id::{BookingId, PaymentId}, service::payment::ReconcileOutcome};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::booking::find_own_booking;
use crate::{
    extractor::AuthorizedUser,
    model::payment::{
        InitiatePaymentRequest, PaymentRedirectResponse, PaymentResponse, PaymentSummaryResponse,
        WebhookResponse,
    },
};

pub async fn show_payment_summary(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaymentSummaryResponse>> {
    let booking = find_own_booking(&registry, user.id(), booking_id).await?;
    let summary = registry.payment_service().summary(&booking);
    let site_rating = registry.review_repository().rating_stats(None).await?;

    Ok(Json(PaymentSummaryResponse::new(booking, summary, site_rating)))
}

pub async fn initiate_payment(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<InitiatePaymentRequest>,
) -> AppResult<Json<PaymentRedirectResponse>> {
    let booking = find_own_booking(&registry, user.id(), booking_id).await?;

    registry
        .payment_service()
        .initiate(&booking, req.payment_method, Utc::now())
        .await
        .map(PaymentRedirectResponse::from)
        .map(Json)
}

// 決済完了ページ用。本人の支払いのみ参照できる
pub async fn show_payment(
    user: AuthorizedUser,
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaymentResponse>> {
    let payment = registry
        .payment_repository()
        .find_by_id(payment_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("specified payment not found".into()))?;
    let booking = find_own_booking(&registry, user.id(), payment.booking_id).await?;

    Ok(Json(PaymentResponse::new(payment, booking)))
}

pub async fn payment_webhook(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(registry): State<AppRegistry>,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    match registry
        .payment_service()
        .reconcile(addr.ip(), &body, Utc::now())
        .await
    {
        ReconcileOutcome::Rejected => (StatusCode::BAD_REQUEST, Json(WebhookResponse::INVALID_IP)),
        ReconcileOutcome::Applied | ReconcileOutcome::Ignored => {
            (StatusCode::OK, Json(WebhookResponse::SUCCESS))
        }
    }
}

pub async fn webhook_invalid_method() -> (StatusCode, Json<WebhookResponse>) {
    (StatusCode::BAD_REQUEST, Json(WebhookResponse::INVALID_METHOD))
}
