use serde::Deserialize;
use thiserror::Error;

use crate::assessment::models::Recommendation;

const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static browseable listings: courses, projects ("experiences") and internships.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub courses: Vec<Recommendation>,
    #[serde(default)]
    pub experiences: Vec<Recommendation>,
    #[serde(default)]
    pub internships: Vec<Recommendation>,
}

impl Catalog {
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_CATALOG)
    }
}

/// An entry matches when any whitespace-separated query word appears in its
/// title, description or one of its tags (all compared lowercase).
pub fn matches_query(entry: &Recommendation, words: &[String]) -> bool {
    let title = entry.title.to_lowercase();
    let description = entry.description.to_lowercase();
    let tags: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();

    words.iter().any(|word| {
        title.contains(word.as_str())
            || description.contains(word.as_str())
            || tags.iter().any(|t| t.contains(word.as_str()))
    })
}

pub fn search<'a>(entries: &'a [Recommendation], query: &str) -> Vec<&'a Recommendation> {
    let words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        return Vec::new();
    }
    entries.iter().filter(|e| matches_query(e, &words)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, description: &str, tags: &[&str]) -> Recommendation {
        Recommendation {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image: None,
        }
    }

    #[test]
    fn test_matches_title_description_or_tag() {
        let entries = vec![
            entry("Docker Essentials", "Containers from scratch.", &["devops"]),
            entry("Python for Everybody", "Learn data handling.", &["beginner"]),
            entry("Intro", "Something else.", &["Machine Learning"]),
        ];
        let titles = |q: &str| -> Vec<String> {
            search(&entries, q).iter().map(|e| e.title.clone()).collect()
        };

        assert_eq!(titles("docker"), vec!["Docker Essentials"]);
        assert_eq!(titles("DATA"), vec!["Python for Everybody"]);
        assert_eq!(titles("learning"), vec!["Intro"]);
        assert_eq!(titles("devops beginner").len(), 2);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let entries = vec![entry("Docker", "d", &[])];
        assert!(search(&entries, "").is_empty());
        assert!(search(&entries, "   ").is_empty());
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.courses.is_empty());
        assert!(!catalog.experiences.is_empty());
        assert!(!catalog.internships.is_empty());
        assert!(search(&catalog.internships, "aws")
            .iter()
            .any(|e| e.title.contains("Amazon")));
    }
}
