use async_trait::async_trait;
use kernel::{
    gateway::{CreateGatewayPayment, GatewayError, GatewayPayment, PaymentGateway},
    model::payment::PaymentStatus,
};
use uuid::Uuid;

const TEST_PREFIX: &str = "test_";

// 外部に接続せず、すべての支払いを即時に完了させる
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedGateway;

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn initial_status(&self) -> PaymentStatus {
        PaymentStatus::Succeeded
    }

    async fn create_payment(
        &self,
        request: CreateGatewayPayment,
    ) -> Result<GatewayPayment, GatewayError> {
        let id = format!("{TEST_PREFIX}{}", Uuid::new_v4().simple());
        tracing::info!(
            gateway_payment_id = %id,
            payment_id = %request.metadata.payment_id,
            amount = %request.amount,
            "Simulated payment settled"
        );
        Ok(GatewayPayment {
            id,
            status: PaymentStatus::Succeeded,
            confirmation_url: None,
        })
    }

    async fn fetch_payment(
        &self,
        gateway_payment_id: &str,
    ) -> Result<GatewayPayment, GatewayError> {
        if !gateway_payment_id.starts_with(TEST_PREFIX) {
            return Err(GatewayError::UnknownPayment(gateway_payment_id.into()));
        }
        Ok(GatewayPayment {
            id: gateway_payment_id.into(),
            status: PaymentStatus::Succeeded,
            confirmation_url: None,
        })
    }
}
