pub mod health;
pub mod index;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers as interview;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(session::handle_upload_resume),
        )
        .route(
            "/api/v1/sessions/:id/downloads/:artifact",
            get(session::handle_download),
        )
        // Interview
        .route(
            "/api/v1/sessions/:id/questions",
            post(interview::handle_generate_questions),
        )
        .route(
            "/api/v1/sessions/:id/answers",
            put(interview::handle_update_answers),
        )
        .route(
            "/api/v1/sessions/:id/feedback",
            post(interview::handle_generate_feedback),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
