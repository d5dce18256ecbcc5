use std::sync::Arc;

use kernel::gateway::PaymentGateway;
use shared::{
    config::{PaymentConfig, PaymentMode},
    error::AppResult,
};

pub mod simulated;
pub mod yookassa;

pub use simulated::SimulatedGateway;
pub use yookassa::YooKassaGateway;

// 起動時の設定から決済ゲートウェイを一つ選ぶ
pub fn build_gateway(config: &PaymentConfig) -> AppResult<Arc<dyn PaymentGateway>> {
    let gateway: Arc<dyn PaymentGateway> = match config.mode {
        PaymentMode::Simulated => Arc::new(SimulatedGateway),
        PaymentMode::Live => Arc::new(YooKassaGateway::new(
            &config.api_url,
            &config.shop_id,
            &config.secret_key,
        )?),
    };
    tracing::info!(mode = %config.mode, "Payment gateway selected");
    Ok(gateway)
}
