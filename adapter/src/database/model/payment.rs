use chrono::{DateTime, Utc};
use kernel::model::{
    id::{BookingId, PaymentId},
    payment::{Payment, PaymentKind, PaymentStatus},
};
use rust_decimal::Decimal;
use shared::error::AppError;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: PaymentId,
    pub booking_id: BookingId,
    pub amount: Decimal,
    pub payment_type: String,
    pub status: String,
    pub gateway_payment_id: Option<String>,
    pub idempotence_key: Uuid,
    pub created_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(value: PaymentRow) -> Result<Self, Self::Error> {
        let PaymentRow {
            payment_id,
            booking_id,
            amount,
            payment_type,
            status,
            gateway_payment_id,
            idempotence_key,
            created_at,
            captured_at,
        } = value;
        Ok(Payment {
            payment_id,
            booking_id,
            amount,
            kind: payment_type.parse::<PaymentKind>().map_err(|_| {
                AppError::ConversionEntityError(format!("unknown payment type: {payment_type}"))
            })?,
            status: status.parse::<PaymentStatus>().map_err(|_| {
                AppError::ConversionEntityError(format!("unknown payment status: {status}"))
            })?,
            gateway_payment_id,
            idempotence_key,
            created_at,
            captured_at,
        })
    }
}
