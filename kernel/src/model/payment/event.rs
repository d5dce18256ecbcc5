use crate::model::{
    id::{BookingId, PaymentId},
    payment::{PaymentKind, PaymentStatus},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct CreatePayment {
    pub payment_id: PaymentId,
    pub booking_id: BookingId,
    pub amount: Decimal,
    pub kind: PaymentKind,
    pub status: PaymentStatus,
    pub idempotence_key: Uuid,
    pub created_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
}

// 現在の状態が終端でない場合に限り適用される状態更新
#[derive(Debug, Clone)]
pub struct UpdatePaymentStatus {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    pub captured_at: Option<DateTime<Utc>>,
}

impl UpdatePaymentStatus {
    pub fn new(payment_id: PaymentId, status: PaymentStatus, now: DateTime<Utc>) -> Self {
        Self {
            payment_id,
            status,
            captured_at: (status == PaymentStatus::Succeeded).then_some(now),
        }
    }
}
