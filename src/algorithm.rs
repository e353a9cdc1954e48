use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The regression models the backend can evaluate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Linear,
    Tree,
}

impl Algorithm {
    /// Every selectable algorithm, in the order the selector shows them.
    pub const ALL: [Algorithm; 2] = [Algorithm::Linear, Algorithm::Tree];

    /// Returns the name used on the wire (query strings and request bodies).
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Linear => "linear",
            Algorithm::Tree => "tree",
        }
    }

    /// Returns the human readable name shown on the selector buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Linear => "Linear Regression",
            Algorithm::Tree => "Decision Tree",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown algorithm name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown algorithm '{}', expected 'linear' or 'tree'", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Algorithm::Linear),
            "tree" => Ok(Algorithm::Tree),
            other => Err(UnknownAlgorithm(other.to_string())),
        }
    }
}
