use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod auth_routes;
pub mod conversation_routes;
pub mod dashboard_routes;
pub mod home_routes;
pub mod patient_routes;
pub mod quick_reply_routes;
pub mod report_routes;
pub mod user_routes;

mod shared;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/auth", auth_routes::router())
        .nest("/api/v1", user_routes::router())
        .nest("/api/v1", conversation_routes::router())
        .nest("/api/v1", patient_routes::router())
        .nest("/api/v1", appointment_routes::router())
        .nest("/api/v1", quick_reply_routes::router())
        .nest("/api/v1", dashboard_routes::router())
        .nest("/api/v1", report_routes::router())
        .merge(home_routes::router())
        .with_state(state)
}
