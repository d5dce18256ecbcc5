use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::AppResult;

use crate::model::{
    id::{BookingId, PaymentId},
    payment::{
        event::{CreatePayment, UpdatePaymentStatus},
        Payment, PaymentKind,
    },
};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, event: CreatePayment) -> AppResult<Payment>;
    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Option<Payment>>;
    async fn find_by_gateway_id(&self, gateway_payment_id: &str) -> AppResult<Option<Payment>>;
    // ゲートウェイ未登録のまま pending になっている支払い（再試行で再利用する）
    async fn find_retryable(
        &self,
        booking_id: BookingId,
        kind: PaymentKind,
    ) -> AppResult<Option<Payment>>;
    async fn attach_gateway_payment(
        &self,
        payment_id: PaymentId,
        gateway_payment_id: &str,
    ) -> AppResult<()>;
    // 終端状態でない行だけを更新し、更新したかどうかを返す
    async fn update_status(&self, event: UpdatePaymentStatus) -> AppResult<bool>;
    async fn find_stale_pending(&self, created_before: DateTime<Utc>) -> AppResult<Vec<Payment>>;
}
