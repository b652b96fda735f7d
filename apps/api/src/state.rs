use std::sync::Arc;

use sqlx::PgPool;

use crate::assessment::question_bank::QuestionBank;
use crate::assessment::recommendations::RecommendationResolver;
use crate::assessment::store::SessionStore;
use crate::catalog::Catalog;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything a request needs is reached from here; there are no globals.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub bank: Arc<QuestionBank>,
    pub catalog: Arc<Catalog>,
    /// Static table by default; remote resolver when RECOMMENDATIONS_URL is set.
    pub recommendations: Arc<dyn RecommendationResolver>,
    /// In-memory by default; Redis when REDIS_URL is set.
    pub sessions: Arc<dyn SessionStore>,
}
