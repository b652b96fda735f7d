use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::user::{CourseProgressRow, UserRow};

/// Fields the identity provider owns. Interests and skills are never touched
/// by a sync.
pub struct IdentityFields<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub image_url: Option<&'a str>,
}

pub async fn get_user(pool: &PgPool, user_id: &str) -> Result<Option<UserRow>> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get_progress(pool: &PgPool, user_id: &str) -> Result<Vec<CourseProgressRow>> {
    Ok(sqlx::query_as::<_, CourseProgressRow>(
        "SELECT * FROM course_progress WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Returns the updated row, or `None` when the user does not exist.
pub async fn update_interests(
    pool: &PgPool,
    user_id: &str,
    interests: &[String],
    skills: Option<&[String]>,
) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET interests = $2,
            skills = COALESCE($3, skills),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(interests)
    .bind(skills)
    .fetch_optional(pool)
    .await?)
}

/// Adds an `ongoing` progress row. Returns false if the course was already tracked.
pub async fn add_progress(pool: &PgPool, user_id: &str, course_id: &str, title: &str) -> Result<bool> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO course_progress (user_id, course_id, title)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, course_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(title)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(inserted > 0)
}

pub async fn upsert_identity(pool: &PgPool, fields: IdentityFields<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, image_url)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
        SET name = EXCLUDED.name,
            email = EXCLUDED.email,
            image_url = EXCLUDED.image_url,
            updated_at = now()
        "#,
    )
    .bind(fields.id)
    .bind(fields.name)
    .bind(fields.email)
    .bind(fields.image_url)
    .execute(pool)
    .await?;
    info!("Synced user {} from identity provider", fields.id);
    Ok(())
}

/// Idempotent: deleting an absent user is not an error.
pub async fn delete_user(pool: &PgPool, user_id: &str) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();
    info!("Deleted user {user_id} ({deleted} rows)");
    Ok(deleted > 0)
}
