// Match result types shared by every matcher and detector

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which matcher produced a result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Flexible,
    ContextAware,
    Exact,
    #[serde(rename = "wwii_1944")]
    Wwii1944,
    TeslaEvsShutdown,
    #[serde(rename = "pi_equals_3")]
    PiEquals3,
    Custom,
}

impl PatternType {
    pub fn as_str(&self) -> &str {
        match self {
            PatternType::Flexible => "flexible",
            PatternType::ContextAware => "context_aware",
            PatternType::Exact => "exact",
            PatternType::Wwii1944 => "wwii_1944",
            PatternType::TeslaEvsShutdown => "tesla_evs_shutdown",
            PatternType::PiEquals3 => "pi_equals_3",
            PatternType::Custom => "custom",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single match call
///
/// Always constructed fresh; a non-match carries confidence 0.0 and no
/// description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternMatch {
    pub matched: bool,
    pub pattern_type: PatternType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    pub confidence: f64,
}

impl PatternMatch {
    /// A positive match. Confidence is clamped into [0, 1].
    pub fn hit(pattern_type: PatternType, matched_pattern: impl Into<String>, confidence: f64) -> Self {
        Self {
            matched: true,
            pattern_type,
            matched_pattern: Some(matched_pattern.into()),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn miss(pattern_type: PatternType) -> Self {
        Self {
            matched: false,
            pattern_type,
            matched_pattern: None,
            confidence: 0.0,
        }
    }

    /// Re-tag a result, e.g. when a context match backs a custom rule
    pub fn with_type(mut self, pattern_type: PatternType) -> Self {
        self.pattern_type = pattern_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_type_tags() {
        assert_eq!(PatternType::Wwii1944.as_str(), "wwii_1944");
        assert_eq!(PatternType::PiEquals3.as_str(), "pi_equals_3");
        assert_eq!(
            serde_json::to_string(&PatternType::TeslaEvsShutdown).unwrap(),
            "\"tesla_evs_shutdown\""
        );
        assert_eq!(
            serde_json::to_string(&PatternType::PiEquals3).unwrap(),
            "\"pi_equals_3\""
        );
    }

    #[test]
    fn test_miss_is_empty() {
        let m = PatternMatch::miss(PatternType::Exact);
        assert!(!m.matched);
        assert_eq!(m.confidence, 0.0);
        assert!(m.matched_pattern.is_none());
    }

    #[test]
    fn test_hit_clamps_confidence() {
        let m = PatternMatch::hit(PatternType::Flexible, "x", 1.7);
        assert_eq!(m.confidence, 1.0);
    }
}
