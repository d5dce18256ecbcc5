use chrono::{DateTime, Utc};
use kernel::{
    model::{
        booking::Booking,
        id::{BookingId, PaymentId},
        payment::{Payment, PaymentKind, PaymentStatus, PaymentSummary},
        review::RatingStats,
    },
    service::payment::PaymentRedirect,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    booking::{BookingResponse, BookingServiceResponse},
    review::RatingStatsResponse,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    pub payment_method: PaymentKind,
}

pub fn payment_submit_path(booking_id: BookingId) -> String {
    format!("/api/v1/bookings/{booking_id}/payments")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummaryResponse {
    pub booking_id: BookingId,
    pub house_name: String,
    pub nights: i64,
    pub services: Vec<BookingServiceResponse>,
    pub full_amount: Decimal,
    pub prepayment_amount: Decimal,
    pub remaining_amount: Decimal,
    pub prepayment_percent: u32,
    pub refund_days: u32,
    pub site_rating: RatingStatsResponse,
    pub submit_path: String,
}

impl PaymentSummaryResponse {
    pub fn new(booking: Booking, summary: PaymentSummary, site_rating: RatingStats) -> Self {
        let nights = booking.nights();
        let PaymentSummary {
            full_amount,
            prepayment_amount,
            remaining_amount,
            prepayment_percent,
            refund_days,
        } = summary;
        Self {
            booking_id: booking.booking_id,
            house_name: booking.house.name,
            nights,
            services: booking
                .services
                .into_iter()
                .map(BookingServiceResponse::from)
                .collect(),
            full_amount,
            prepayment_amount,
            remaining_amount,
            prepayment_percent,
            refund_days,
            site_rating: site_rating.into(),
            submit_path: payment_submit_path(booking.booking_id),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectKind {
    Gateway,
    SuccessPage,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRedirectResponse {
    pub payment_id: PaymentId,
    pub redirect: RedirectKind,
    pub target: String,
}

impl From<PaymentRedirect> for PaymentRedirectResponse {
    fn from(value: PaymentRedirect) -> Self {
        match value {
            PaymentRedirect::Gateway { payment_id, url } => Self {
                payment_id,
                redirect: RedirectKind::Gateway,
                target: url,
            },
            PaymentRedirect::SuccessPage { payment_id, path } => Self {
                payment_id,
                redirect: RedirectKind::SuccessPage,
                target: path,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: PaymentId,
    pub amount: Decimal,
    pub payment_type: PaymentKind,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
    pub booking: BookingResponse,
}

impl PaymentResponse {
    pub fn new(payment: Payment, booking: Booking) -> Self {
        let Payment {
            payment_id,
            amount,
            kind,
            status,
            created_at,
            captured_at,
            ..
        } = payment;
        Self {
            payment_id,
            amount,
            payment_type: kind,
            status,
            created_at,
            captured_at,
            booking: booking.into(),
        }
    }
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
}

impl WebhookResponse {
    pub const SUCCESS: Self = Self { status: "success" };
    pub const INVALID_IP: Self = Self { status: "invalid ip" };
    pub const INVALID_METHOD: Self = Self {
        status: "invalid method",
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_method_uses_gateway_vocabulary() {
        let req: InitiatePaymentRequest =
            serde_json::from_value(json!({"paymentMethod": "prepayment"})).unwrap();
        assert_eq!(req.payment_method, PaymentKind::Prepayment);
        assert!(serde_json::from_value::<InitiatePaymentRequest>(json!({"paymentMethod": "cash"}))
            .is_err());
    }

    #[test]
    fn redirect_response_exposes_target() {
        let payment_id = PaymentId::new();
        let res = PaymentRedirectResponse::from(PaymentRedirect::SuccessPage {
            payment_id,
            path: format!("/api/v1/payments/{payment_id}"),
        });
        let value = serde_json::to_value(res).unwrap();
        assert_eq!(value["redirect"], "success_page");
        assert_eq!(value["target"], format!("/api/v1/payments/{payment_id}"));
    }
}
