use axum::Router;

use crate::adapters::http::app_state::AppState;

pub mod billing;
pub mod emails;
pub mod webhooks;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/billing", billing::router())
        .nest("/emails", emails::router())
        .nest("/webhooks", webhooks::router())
}
