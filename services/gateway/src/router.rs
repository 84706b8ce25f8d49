use crate::handlers::{health, order};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new().route(
        "/orders",
        post(order::create_order).get(order::list_orders),
    );

    Router::new()
        .nest("/v1", api_routes)
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
