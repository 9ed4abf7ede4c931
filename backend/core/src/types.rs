use std::fmt;

use serde::{Deserialize, Serialize};

/// Location descriptor selecting the site/identifiability prompt.
///
/// The set is open: `interior` and `exterior` are the expected values, but
/// any non-empty string is passed through to the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationType(String);

impl LocationType {
    /// Parse an optional raw mode. Absent or blank input yields `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a well-formed classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected { reasons: Vec<String> },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Verdict::Accepted => &[],
            Verdict::Rejected { reasons } => reasons,
        }
    }
}
