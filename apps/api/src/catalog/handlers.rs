use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::assessment::models::Recommendation;
use crate::catalog::search::search;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct CourseSearchResponse {
    pub success: bool,
    pub courses: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct ExperienceSearchResponse {
    pub success: bool,
    pub experiences: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct InternshipSearchResponse {
    pub success: bool,
    pub internships: Vec<Recommendation>,
}

fn owned(found: Vec<&Recommendation>) -> Vec<Recommendation> {
    found.into_iter().cloned().collect()
}

/// GET /api/v1/recommendations/search
pub async fn handle_search_courses(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<CourseSearchResponse> {
    Json(CourseSearchResponse {
        success: true,
        courses: owned(search(&state.catalog.courses, &params.q)),
    })
}

/// GET /api/v1/recommendations/search-experiences
pub async fn handle_search_experiences(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<ExperienceSearchResponse> {
    Json(ExperienceSearchResponse {
        success: true,
        experiences: owned(search(&state.catalog.experiences, &params.q)),
    })
}

/// GET /api/v1/recommendations/search-internships
pub async fn handle_search_internships(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<InternshipSearchResponse> {
    Json(InternshipSearchResponse {
        success: true,
        internships: owned(search(&state.catalog.internships, &params.q)),
    })
}
