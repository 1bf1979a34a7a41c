use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/contacts", get(handlers::get_contacts))
        .route("/api/contacts/by-period", get(handlers::get_contacts_by_period))
        .route("/api/leads", get(handlers::get_leads))
        .route("/api/refresh", post(handlers::refresh))
        .with_state(state)
}
