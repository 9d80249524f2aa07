use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::AccountService;
use crate::web::handlers::*;

pub fn create_router(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/accounts", post(add_account))
        .route("/accounts", get(get_accounts))
        .route("/accounts/{id}", put(modify_account))
        .route("/accounts/{id}/password", put(change_password))
        .route("/accounts/{id}", delete(delete_account))
        .route("/health", get(health_check))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
