pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::catalog::handlers as catalog;
use crate::profile::handlers as profile;
use crate::state::AppState;
use crate::webhooks::handlers as webhooks;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment
        .route(
            "/api/v1/assessment/domains",
            get(assessment::handle_list_domains),
        )
        .route(
            "/api/v1/assessment/search",
            get(assessment::handle_search_questions),
        )
        .route(
            "/api/v1/assessment/sessions",
            post(assessment::handle_create_session),
        )
        .route(
            "/api/v1/assessment/sessions/:id",
            get(assessment::handle_get_session).delete(assessment::handle_delete_session),
        )
        .route(
            "/api/v1/assessment/sessions/:id/tier",
            post(assessment::handle_choose_tier),
        )
        .route(
            "/api/v1/assessment/sessions/:id/answers",
            put(assessment::handle_select_answer),
        )
        .route(
            "/api/v1/assessment/sessions/:id/advance",
            post(assessment::handle_advance),
        )
        .route(
            "/api/v1/assessment/sessions/:id/retreat",
            post(assessment::handle_retreat),
        )
        .route(
            "/api/v1/assessment/sessions/:id/result",
            get(assessment::handle_get_result),
        )
        // Recommendations and catalog search
        .route(
            "/api/v1/recommendations",
            get(assessment::handle_lookup_recommendations),
        )
        .route(
            "/api/v1/recommendations/search",
            get(catalog::handle_search_courses),
        )
        .route(
            "/api/v1/recommendations/search-experiences",
            get(catalog::handle_search_experiences),
        )
        .route(
            "/api/v1/recommendations/search-internships",
            get(catalog::handle_search_internships),
        )
        // Profiles
        .route("/api/v1/users/:id", get(profile::handle_get_profile))
        .route(
            "/api/v1/users/:id/interests",
            put(profile::handle_update_interests),
        )
        .route(
            "/api/v1/users/:id/progress",
            post(profile::handle_add_progress),
        )
        .route(
            "/api/v1/users/:id/results",
            get(profile::handle_list_results),
        )
        .route(
            "/api/v1/users/:id/recommendations",
            get(profile::handle_user_recommendations),
        )
        // Identity provider
        .route(
            "/api/v1/webhooks/identity",
            post(webhooks::handle_identity_event),
        )
        .with_state(state)
}
