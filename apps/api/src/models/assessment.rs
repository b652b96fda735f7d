use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentResultRow {
    pub id: Uuid,
    pub user_id: String,
    pub session_id: Uuid,
    pub tier: String,
    pub badge: String,
    pub correct_count: i32,
    pub total_questions: i32,
    pub skill_scores: Value,
    pub weak_domains: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}
