use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::assessment::models::Recommendation;
use crate::assessment::results::list_results;
use crate::catalog::search::search;
use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::models::assessment::AssessmentResultRow;
use crate::models::user::{CourseProgressRow, UserRow};
use crate::profile::interests::{interest_query, normalize_tags};
use crate::profile::queries::{add_progress, get_progress, get_user, update_interests};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserRow,
    pub progress: Vec<CourseProgressRow>,
}

#[derive(Deserialize)]
pub struct InterestsUpdate {
    #[serde(default)]
    pub interests: Vec<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct ProgressRequest {
    pub course_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Serialize)]
pub struct ProgressResponse {
    pub added: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserRecommendations {
    pub success: bool,
    pub query: String,
    pub courses: Vec<Recommendation>,
    pub experiences: Vec<Recommendation>,
    pub internships: Vec<Recommendation>,
}

pub fn recommend_for_interests(catalog: &Catalog, interests: &[String]) -> UserRecommendations {
    let query = interest_query(interests);
    let hits = |entries: &[Recommendation]| -> Vec<Recommendation> {
        search(entries, &query).into_iter().cloned().collect()
    };
    UserRecommendations {
        success: true,
        courses: hits(&catalog.courses),
        experiences: hits(&catalog.experiences),
        internships: hits(&catalog.internships),
        query,
    }
}

/// GET /api/v1/users/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = get_user(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    let progress = get_progress(&state.db, &user_id).await?;
    Ok(Json(ProfileResponse { user, progress }))
}

/// PUT /api/v1/users/:id/interests
pub async fn handle_update_interests(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<InterestsUpdate>,
) -> Result<Json<UserRow>, AppError> {
    let interests = normalize_tags(&req.interests);
    let skills = req.skills.as_deref().map(normalize_tags);

    let user = update_interests(&state.db, &user_id, &interests, skills.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(user))
}

/// POST /api/v1/users/:id/progress
pub async fn handle_add_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>, AppError> {
    let course_id = req.course_id.trim();
    if course_id.is_empty() {
        return Err(AppError::Validation("course_id must not be empty".to_string()));
    }
    if get_user(&state.db, &user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    let added = add_progress(&state.db, &user_id, course_id, req.title.trim()).await?;
    Ok(Json(ProgressResponse {
        added,
        message: if added {
            "Progress updated"
        } else {
            "Course already in progress"
        },
    }))
}

/// GET /api/v1/users/:id/recommendations
pub async fn handle_user_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserRecommendations>, AppError> {
    let user = get_user(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(recommend_for_interests(&state.catalog, &user.interests)))
}

/// GET /api/v1/users/:id/results
pub async fn handle_list_results(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<AssessmentResultRow>>, AppError> {
    Ok(Json(list_results(&state.db, &user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, tags: &[&str]) -> Recommendation {
        Recommendation {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            description: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            courses: vec![entry("Rust for Beginners", &["systems"]), entry("Online Tech Courses 101", &[])],
            experiences: vec![entry("Build a CLI", &["rust"])],
            internships: vec![entry("Cloud Intern", &["aws"])],
        }
    }

    #[test]
    fn test_recommendations_follow_interests() {
        let recs = recommend_for_interests(&catalog(), &["rust".to_string()]);
        assert_eq!(recs.query, "rust");
        assert_eq!(recs.courses.len(), 1);
        assert_eq!(recs.courses[0].title, "Rust for Beginners");
        assert_eq!(recs.experiences.len(), 1);
        assert!(recs.internships.is_empty());
    }

    #[test]
    fn test_recommendations_without_interests_use_default_query() {
        let recs = recommend_for_interests(&catalog(), &[]);
        assert_eq!(recs.query, "online tech courses");
        assert!(recs.courses.iter().any(|c| c.title == "Online Tech Courses 101"));
    }
}
