use std::collections::HashSet;

/// Trims each entry, drops blanks and removes duplicates, keeping first order.
/// Duplicates are detected case-insensitively.
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Catalog query used when a user has no interests yet.
pub const DEFAULT_INTEREST_QUERY: &str = "online tech courses";

/// Space-joined interests, or the default query when none are set.
pub fn interest_query(interests: &[String]) -> String {
    let query = normalize_tags(interests).join(" ");
    if query.is_empty() {
        DEFAULT_INTEREST_QUERY.to_string()
    } else {
        query
    }
}

/// Display name assembled from the identity provider's name parts.
pub fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_trims_and_dedups() {
        let raw = strings(&[" Rust ", "web", "", "rust", "  ", "Data Science", "WEB"]);
        assert_eq!(normalize_tags(&raw), strings(&["Rust", "web", "Data Science"]));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_tags(&[]).is_empty());
    }

    #[test]
    fn test_interest_query_joins_interests() {
        let interests = strings(&["Rust", " cloud ", "", "rust"]);
        assert_eq!(interest_query(&interests), "Rust cloud");
    }

    #[test]
    fn test_interest_query_defaults_when_empty() {
        assert_eq!(interest_query(&[]), DEFAULT_INTEREST_QUERY);
        assert_eq!(interest_query(&strings(&["  ", ""])), "online tech courses");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Some("Ada"), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(display_name(Some("Ada"), None), "Ada");
        assert_eq!(display_name(None, Some(" Lovelace ")), "Lovelace");
        assert_eq!(display_name(None, None), "");
    }
}
