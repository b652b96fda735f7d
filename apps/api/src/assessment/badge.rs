use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Absolute correct-answer thresholds. Percentages are not used.
pub const GOLD_MIN_CORRECT: u32 = 10;
pub const SILVER_MIN_CORRECT: u32 = 7;

/// Declaration order gives `Bronze < Silver < Gold`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Badge {
    Bronze,
    Silver,
    Gold,
}

impl Badge {
    pub const ALL: [Badge; 3] = [Badge::Bronze, Badge::Silver, Badge::Gold];

    pub fn from_correct_count(correct_count: u32) -> Self {
        match correct_count {
            n if n >= GOLD_MIN_CORRECT => Badge::Gold,
            n if n >= SILVER_MIN_CORRECT => Badge::Silver,
            _ => Badge::Bronze,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::Bronze => "Bronze",
            Badge::Silver => "Silver",
            Badge::Gold => "Gold",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Badge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Badge::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown badge '{trimmed}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(Badge::from_correct_count(0), Badge::Bronze);
        assert_eq!(Badge::from_correct_count(6), Badge::Bronze);
        assert_eq!(Badge::from_correct_count(7), Badge::Silver);
        assert_eq!(Badge::from_correct_count(9), Badge::Silver);
        assert_eq!(Badge::from_correct_count(10), Badge::Gold);
        assert_eq!(Badge::from_correct_count(20), Badge::Gold);
    }

    #[test]
    fn test_badge_is_monotonic_in_correct_count() {
        let mut previous = Badge::from_correct_count(0);
        for n in 1..=40 {
            let current = Badge::from_correct_count(n);
            assert!(current >= previous, "badge dropped at {n}");
            previous = current;
        }
    }

    #[test]
    fn test_badge_parse() {
        assert_eq!("gold".parse::<Badge>(), Ok(Badge::Gold));
        assert!("Platinum".parse::<Badge>().is_err());
    }
}
