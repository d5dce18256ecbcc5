use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::payment::{payment_webhook, show_payment, webhook_invalid_method};

pub fn build_payment_routers() -> Router<AppRegistry> {
    let payments_routers = Router::new()
        // POST 以外のメソッドは 405 ではなく 400 で応答する
        .route(
            "/webhook",
            post(payment_webhook).fallback(webhook_invalid_method),
        )
        .route("/:payment_id", get(show_payment));

    Router::new().nest("/payments", payments_routers)
}
