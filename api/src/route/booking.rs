use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    booking::{create_booking, show_booking, show_booking_list, show_quote},
    payment::{initiate_payment, show_payment_summary},
};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let bookings_routers = Router::new()
        .route("/", post(create_booking))
        .route("/", get(show_booking_list))
        .route("/quote", get(show_quote))
        .route("/:booking_id", get(show_booking))
        .route("/:booking_id/payment", get(show_payment_summary))
        .route("/:booking_id/payments", post(initiate_payment));

    Router::new().nest("/bookings", bookings_routers)
}
