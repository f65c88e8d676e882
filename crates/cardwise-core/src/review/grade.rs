use serde::{Deserialize, Serialize};

/// The learner's self-reported recall for one review.
///
/// Closed set of four UI actions. The numeric SM-2 quality is fixed per
/// variant (0, 3, 4, 5); there is deliberately no way to build a grade from
/// an arbitrary integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityGrade {
    Again,
    Hard,
    Good,
    Easy,
}

impl QualityGrade {
    pub const ALL: [QualityGrade; 4] = [
        QualityGrade::Again,
        QualityGrade::Hard,
        QualityGrade::Good,
        QualityGrade::Easy,
    ];

    /// SM-2 quality value.
    pub fn quality(&self) -> u8 {
        match self {
            QualityGrade::Again => 0,
            QualityGrade::Hard => 3,
            QualityGrade::Good => 4,
            QualityGrade::Easy => 5,
        }
    }

    /// Quality below 3 counts as a lapse.
    pub fn is_failure(&self) -> bool {
        self.quality() < 3
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::Again => "again",
            QualityGrade::Hard => "hard",
            QualityGrade::Good => "good",
            QualityGrade::Easy => "easy",
        }
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Parses the button labels, or the `1`..`4` keys in button order.
///
/// The digits are key positions, not quality values: `"2"` is `Hard`.
impl std::str::FromStr for QualityGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" | "1" => Ok(QualityGrade::Again),
            "hard" | "2" => Ok(QualityGrade::Hard),
            "good" | "3" => Ok(QualityGrade::Good),
            "easy" | "4" => Ok(QualityGrade::Easy),
            _ => Err(format!(
                "Unknown grade: {} (expected again, hard, good, easy or 1-4)",
                s
            )),
        }
    }
}
