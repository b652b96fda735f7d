//! Recommendation lookup keyed by (badge, tier).
//!
//! `AppState` holds an `Arc<dyn RecommendationResolver>`. The static table is
//! the default; the remote resolver is selected when `RECOMMENDATIONS_URL` is
//! set. Both return an empty list rather than an error on a miss.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::assessment::badge::Badge;
use crate::assessment::models::{DifficultyTier, Recommendation};

const EMBEDDED_TABLE: &str = include_str!("../../data/recommendations.json");

#[derive(Debug, Error)]
pub enum RecommendationTableError {
    #[error("malformed recommendation table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("recommendation table has no entries for: {}", format_missing(.0))]
    Incomplete(Vec<(Badge, DifficultyTier)>),

    #[error("recommendation table lists {0}/{1} more than once")]
    DuplicateCell(Badge, DifficultyTier),
}

fn format_missing(cells: &[(Badge, DifficultyTier)]) -> String {
    cells
        .iter()
        .map(|(b, t)| format!("{b}/{t}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
pub trait RecommendationResolver: Send + Sync {
    async fn lookup(&self, badge: Badge, tier: DifficultyTier) -> Vec<Recommendation>;

    /// Short label for startup logs and responses.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Static table
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TableCell {
    badge: Badge,
    tier: DifficultyTier,
    items: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticRecommendationTable {
    cells: HashMap<(Badge, DifficultyTier), Vec<Recommendation>>,
}

impl StaticRecommendationTable {
    pub fn from_json_str(raw: &str) -> Result<Self, RecommendationTableError> {
        let parsed: Vec<TableCell> = serde_json::from_str(raw)?;
        let mut cells = HashMap::new();
        for cell in parsed {
            if cells.insert((cell.badge, cell.tier), cell.items).is_some() {
                return Err(RecommendationTableError::DuplicateCell(cell.badge, cell.tier));
            }
        }
        Ok(Self { cells })
    }

    pub fn embedded() -> Result<Self, RecommendationTableError> {
        Self::from_json_str(EMBEDDED_TABLE)
    }

    /// Every reachable (badge, tier) pair must have at least one entry.
    pub fn validate(&self) -> Result<(), RecommendationTableError> {
        let missing: Vec<_> = Badge::ALL
            .into_iter()
            .flat_map(|b| DifficultyTier::ALL.into_iter().map(move |t| (b, t)))
            .filter(|key| self.cells.get(key).map_or(true, |items| items.is_empty()))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RecommendationTableError::Incomplete(missing))
        }
    }

    pub fn get(&self, badge: Badge, tier: DifficultyTier) -> Vec<Recommendation> {
        self.cells.get(&(badge, tier)).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RecommendationResolver for StaticRecommendationTable {
    async fn lookup(&self, badge: Badge, tier: DifficultyTier) -> Vec<Recommendation> {
        let items = self.get(badge, tier);
        if items.is_empty() {
            warn!("No static recommendations for {badge}/{tier}");
        }
        items
    }

    fn backend(&self) -> &'static str {
        "static"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Remote search endpoint
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RemoteSearchResponse {
    #[serde(default)]
    courses: Vec<Recommendation>,
}

/// Resolves through `GET {base}/recommendations/search?q=<badge> <tier>`.
#[derive(Clone)]
pub struct RemoteRecommendationResolver {
    client: Client,
    base_url: String,
}

impl RemoteRecommendationResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/recommendations/search", self.base_url)
    }

    async fn fetch(&self, query: &str) -> reqwest::Result<Vec<Recommendation>> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?;
        let body: RemoteSearchResponse = response.json().await?;
        Ok(body.courses)
    }
}

#[async_trait]
impl RecommendationResolver for RemoteRecommendationResolver {
    async fn lookup(&self, badge: Badge, tier: DifficultyTier) -> Vec<Recommendation> {
        let query = format!("{} {}", badge.as_str().to_lowercase(), tier.as_str().to_lowercase());
        match self.fetch(&query).await {
            Ok(items) => {
                debug!("Remote recommendations for '{query}': {} items", items.len());
                items
            }
            Err(e) => {
                warn!("Remote recommendation lookup failed for '{query}': {e}");
                Vec::new()
            }
        }
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str) -> String {
        format!(r#"{{"title": "{title}", "url": "https://example.com", "description": "d", "tags": ["x"]}}"#)
    }

    #[test]
    fn test_embedded_table_is_complete() {
        let table = StaticRecommendationTable::embedded().unwrap();
        table.validate().unwrap();
    }

    #[tokio::test]
    async fn test_every_badge_tier_pair_resolves() {
        let table = StaticRecommendationTable::embedded().unwrap();
        for badge in Badge::ALL {
            for tier in DifficultyTier::ALL {
                assert!(!table.lookup(badge, tier).await.is_empty(), "{badge}/{tier} empty");
            }
        }
    }

    #[test]
    fn test_validate_reports_missing_cells() {
        let raw = format!(r#"[{{"badge": "Gold", "tier": "Advanced", "items": [{}]}}]"#, rec("a"));
        let table = StaticRecommendationTable::from_json_str(&raw).unwrap();
        match table.validate() {
            Err(RecommendationTableError::Incomplete(missing)) => {
                assert_eq!(missing.len(), 8);
                assert!(!missing.contains(&(Badge::Gold, DifficultyTier::Advanced)));
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_cell_counts_as_missing() {
        let raw = r#"[{"badge": "Bronze", "tier": "Beginner", "items": []}]"#;
        let table = StaticRecommendationTable::from_json_str(raw).unwrap();
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("Bronze/Beginner"));
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let raw = format!(
            r#"[{{"badge": "Gold", "tier": "Advanced", "items": [{a}]}},
                {{"badge": "Gold", "tier": "Advanced", "items": [{a}]}}]"#,
            a = rec("a")
        );
        assert!(matches!(
            StaticRecommendationTable::from_json_str(&raw),
            Err(RecommendationTableError::DuplicateCell(Badge::Gold, DifficultyTier::Advanced))
        ));
    }

    #[tokio::test]
    async fn test_unresolved_lookup_is_empty() {
        let table = StaticRecommendationTable::default();
        assert!(table.lookup(Badge::Silver, DifficultyTier::Beginner).await.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_empty() {
        // Nothing listens on port 9 locally; the request fails fast.
        let remote =
            RemoteRecommendationResolver::new("http://127.0.0.1:9/", Duration::from_millis(500)).unwrap();
        assert_eq!(remote.search_url(), "http://127.0.0.1:9/recommendations/search");
        assert!(remote.lookup(Badge::Gold, DifficultyTier::Advanced).await.is_empty());
    }
}
