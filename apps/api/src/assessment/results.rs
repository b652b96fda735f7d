use anyhow::Result;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::models::AssessmentResult;
use crate::models::assessment::AssessmentResultRow;

/// Inserts a scored result. Re-submitting the same session is a no-op.
pub async fn save_result(
    pool: &PgPool,
    user_id: &str,
    session_id: Uuid,
    result: &AssessmentResult,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO assessment_results
            (id, user_id, session_id, tier, badge, correct_count, total_questions,
             skill_scores, weak_domains)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (session_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(session_id)
    .bind(result.tier.as_str())
    .bind(result.badge.as_str())
    .bind(result.correct_count as i32)
    .bind(result.total_questions as i32)
    .bind(serde_json::to_value(&result.skill_scores)?)
    .bind(&result.weak_domains)
    .execute(pool)
    .await?;

    info!("Stored assessment result for session {session_id} (user {user_id})");
    Ok(())
}

/// Persists in the background. The caller's response never waits on it.
pub fn spawn_save_result(pool: PgPool, user_id: String, session_id: Uuid, result: AssessmentResult) {
    tokio::spawn(async move {
        if let Err(e) = save_result(&pool, &user_id, session_id, &result).await {
            warn!("Failed to store assessment result for session {session_id}: {e:#}");
        }
    });
}

/// Stored results for a user, newest first.
pub async fn list_results(pool: &PgPool, user_id: &str) -> Result<Vec<AssessmentResultRow>> {
    Ok(sqlx::query_as::<_, AssessmentResultRow>(
        "SELECT * FROM assessment_results WHERE user_id = $1 ORDER BY submitted_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}
