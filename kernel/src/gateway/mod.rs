use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    id::{BookingId, PaymentId},
    payment::{PaymentKind, PaymentStatus},
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway request failed: {0}")]
    Transport(String),
    #[error("payment gateway responded with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected payment gateway response: {0}")]
    Decode(String),
    #[error("payment {0} is unknown to the gateway")]
    UnknownPayment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub booking_id: BookingId,
    pub payment_id: PaymentId,
    pub payment_type: PaymentKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGatewayPayment {
    pub amount: Decimal,
    pub currency: String,
    pub return_url: String,
    pub capture: bool,
    pub description: String,
    pub metadata: PaymentMetadata,
    pub idempotence_key: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPayment {
    pub id: String,
    pub status: PaymentStatus,
    // None の場合はゲートウェイへの遷移が不要（即時決済）
    pub confirmation_url: Option<String>,
}

// 実装は起動時に一度だけ選ばれる（本番のゲートウェイかテスト決済）
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    // 新しく作る支払い行の初期状態
    fn initial_status(&self) -> PaymentStatus;

    async fn create_payment(
        &self,
        request: CreateGatewayPayment,
    ) -> Result<GatewayPayment, GatewayError>;

    async fn fetch_payment(&self, gateway_payment_id: &str)
        -> Result<GatewayPayment, GatewayError>;
}
