use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::house::{register_house, show_house, show_house_list, update_house};

pub fn build_house_routers() -> Router<AppRegistry> {
    let houses_routers = Router::new()
        .route("/", post(register_house))
        .route("/", get(show_house_list))
        .route("/:house_id", get(show_house))
        .route("/:house_id", put(update_house));

    Router::new().nest("/houses", houses_routers)
}
