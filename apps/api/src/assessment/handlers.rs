use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assessment::badge::Badge;
use crate::assessment::models::{AssessmentResult, DifficultyTier, Recommendation};
use crate::assessment::results::spawn_save_result;
use crate::assessment::session::{
    Advance, AssessmentSession, SessionError, SessionView, TierOutcome,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Option<String>,
    pub tier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TierRequest {
    pub tier: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    pub choice: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub badge: Option<String>,
    pub tier: Option<String>,
}

/// `status` is `created`, `started` or `no_questions_available`.
#[derive(Serialize)]
pub struct SessionEnvelope {
    pub status: &'static str,
    pub session: SessionView,
}

#[derive(Serialize)]
pub struct AdvanceResponse {
    pub session: SessionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
}

#[derive(Serialize)]
pub struct ResultResponse {
    pub session_id: Uuid,
    pub result: AssessmentResult,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct DomainsResponse {
    pub domains: Vec<String>,
}

#[derive(Serialize)]
pub struct QuestionSearchResponse {
    pub questions: Vec<String>,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub badge: Badge,
    pub tier: DifficultyTier,
    pub backend: &'static str,
    pub recommendations: Vec<Recommendation>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_session(state: &AppState, id: Uuid) -> Result<AssessmentSession, AppError> {
    state
        .sessions
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment session {id} not found")))
}

// Sync so the thread-local RNG never lives across an await.
fn choose_tier(
    state: &AppState,
    session: &mut AssessmentSession,
    tier: &str,
) -> Result<TierOutcome, SessionError> {
    let mut rng = rand::thread_rng();
    session.choose_tier(tier, &state.bank, state.config.sample_range, &mut rng)
}

/// An empty body creates a session with no user and no tier.
fn parse_create_request(body: &[u8]) -> Result<CreateSessionRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateSessionRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid session request: {e}")))
}

fn outcome_status(outcome: TierOutcome) -> &'static str {
    match outcome {
        TierOutcome::Started => "started",
        TierOutcome::NoQuestionsAvailable => "no_questions_available",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bank
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/assessment/domains
pub async fn handle_list_domains(State(state): State<AppState>) -> Json<DomainsResponse> {
    Json(DomainsResponse {
        domains: state.bank.domains().into_iter().map(String::from).collect(),
    })
}

/// GET /api/v1/assessment/search?q=
pub async fn handle_search_questions(
    State(state): State<AppState>,
    Query(params): Query<QuestionSearchQuery>,
) -> Result<Json<QuestionSearchResponse>, AppError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::Validation(
            "Query parameter 'q' is required".to_string(),
        ));
    }
    Ok(Json(QuestionSearchResponse {
        questions: state.bank.search(&query).into_iter().map(String::from).collect(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Sessions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessment/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionEnvelope>), AppError> {
    let req = parse_create_request(&body)?;
    let user_id = req
        .user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    let mut session = AssessmentSession::new(user_id);
    let status = match req.tier.as_deref() {
        Some(tier) => outcome_status(choose_tier(&state, &mut session, tier)?),
        None => "created",
    };
    state.sessions.save(&mut session).await?;

    info!(
        "Created assessment session {} ({status}, {} questions)",
        session.id,
        session.questions.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(SessionEnvelope {
            status,
            session: SessionView::from(&session),
        }),
    ))
}

/// GET /api/v1/assessment/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// DELETE /api/v1/assessment/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await? {
        info!("Abandoned assessment session {id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Assessment session {id} not found")))
    }
}

/// POST /api/v1/assessment/sessions/:id/tier
pub async fn handle_choose_tier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TierRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let mut session = load_session(&state, id).await?;
    let outcome = choose_tier(&state, &mut session, &req.tier)?;
    if outcome == TierOutcome::Started {
        state.sessions.save(&mut session).await?;
    } else {
        info!("No questions available for tier '{}' (session {id})", req.tier);
    }
    Ok(Json(SessionEnvelope {
        status: outcome_status(outcome),
        session: SessionView::from(&session),
    }))
}

/// PUT /api/v1/assessment/sessions/:id/answers
pub async fn handle_select_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = load_session(&state, id).await?;
    session.select_answer(&req.question_id, &req.choice)?;
    state.sessions.save(&mut session).await?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/v1/assessment/sessions/:id/advance
///
/// Advancing past the last question scores the session. Results of sessions
/// with a user id are stored in the background, and only once the scored
/// session has been saved.
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let mut session = load_session(&state, id).await?;
    let step = session.advance()?;
    state.sessions.save(&mut session).await?;

    let (result, recommendations) = match step {
        Advance::Moved { .. } => (None, None),
        Advance::Scored(result) => {
            info!(
                "Scored session {id}: {} ({}/{} correct, tier {})",
                result.badge, result.correct_count, result.total_questions, result.tier
            );
            if let Some(user_id) = session.user_id.clone() {
                spawn_save_result(state.db.clone(), user_id, id, result.clone());
            }
            let recommendations = state
                .recommendations
                .lookup(result.badge, result.tier)
                .await;
            (Some(result), Some(recommendations))
        }
    };

    Ok(Json(AdvanceResponse {
        session: SessionView::from(&session),
        result,
        recommendations,
    }))
}

/// POST /api/v1/assessment/sessions/:id/retreat
pub async fn handle_retreat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = load_session(&state, id).await?;
    session.retreat()?;
    state.sessions.save(&mut session).await?;
    Ok(Json(SessionView::from(&session)))
}

/// GET /api/v1/assessment/sessions/:id/result
pub async fn handle_get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultResponse>, AppError> {
    let session = load_session(&state, id).await?;
    let result = session.result().cloned().ok_or_else(|| {
        AppError::Conflict(format!(
            "Session {id} is {} and has no result yet",
            session.state.name()
        ))
    })?;
    let recommendations = state
        .recommendations
        .lookup(result.badge, result.tier)
        .await;
    Ok(Json(ResultResponse {
        session_id: id,
        result,
        recommendations,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendations
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/recommendations?badge=&tier=
pub async fn handle_lookup_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let badge: Badge = params
        .badge
        .as_deref()
        .ok_or_else(|| AppError::Validation("Query parameter 'badge' is required".to_string()))?
        .parse()
        .map_err(AppError::Validation)?;
    let tier: DifficultyTier = params
        .tier
        .as_deref()
        .ok_or_else(|| AppError::Validation("Query parameter 'tier' is required".to_string()))?
        .parse()
        .map_err(|e| AppError::Validation(format!("{e}")))?;

    let recommendations = state.recommendations.lookup(badge, tier).await;
    Ok(Json(RecommendationsResponse {
        badge,
        tier,
        backend: state.recommendations.backend(),
        recommendations,
    }))
}
