use axum::Router;
use registry::AppRegistry;

use super::{
    booking::build_booking_routers, house::build_house_routers, payment::build_payment_routers,
    review::build_review_routers, service::build_service_routers,
};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_house_routers())
        .merge(build_service_routers())
        .merge(build_booking_routers())
        .merge(build_payment_routers())
        .merge(build_review_routers());
    Router::new().nest("/api/v1", router)
}
