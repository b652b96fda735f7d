use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Platform user, keyed by the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseProgressRow {
    pub user_id: String,
    pub course_id: String,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
