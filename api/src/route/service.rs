use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::service::{show_service, show_service_list};

pub fn build_service_routers() -> Router<AppRegistry> {
    let services_routers = Router::new()
        .route("/", get(show_service_list))
        .route("/:service_id", get(show_service));

    Router::new().nest("/services", services_routers)
}
