use crate::types::Severity;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConflictRule
// ---------------------------------------------------------------------------

/// One detectable conflict condition. `severity` stays exactly as loaded so
/// that `load()` never rejects data; `severity_level()` is the normalized
/// view and an unparseable value is reported by `validate()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub severity: String,
    /// Matching expression evaluated against free-text description fields.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    #[serde(default)]
    pub description: String,
}

impl ConflictRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            severity: severity.as_str().to_string(),
            pattern: String::new(),
            description: String::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Normalized severity, `None` when the raw value is outside the closed set.
    pub fn severity_level(&self) -> Option<Severity> {
        Severity::parse(&self.severity)
    }

    /// Case-insensitive substring match over `name` and `description`.
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        let needle = pattern.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Required fields that are missing or empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.trim().is_empty() {
            missing.push("id");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.severity.trim().is_empty() {
            missing.push("severity");
        }
        if self.category.trim().is_empty() {
            missing.push("category");
        }
        missing
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_level_normalizes_case() {
        let rule = ConflictRule {
            severity: "Error".to_string(),
            ..ConflictRule::new("r1", "n", "c", Severity::Warning)
        };
        assert_eq!(rule.severity_level(), Some(Severity::Error));
    }

    #[test]
    fn severity_level_rejects_unknown() {
        let rule = ConflictRule {
            severity: "catastrophic".to_string(),
            ..ConflictRule::new("r1", "n", "c", Severity::Error)
        };
        assert_eq!(rule.severity_level(), None);
    }

    #[test]
    fn pattern_matches_name_or_description() {
        let rule = ConflictRule::new("r1", "Stateless auth", "security", Severity::Error)
            .with_description("Sessions conflict with a stateless API tier.");
        assert!(rule.matches_pattern("STATELESS"));
        assert!(rule.matches_pattern("sessions conflict"));
        assert!(!rule.matches_pattern("database"));
    }

    #[test]
    fn sparse_record_deserializes() {
        let rule: ConflictRule = serde_json::from_str(r#"{"id": "r1", "name": "x"}"#).unwrap();
        assert_eq!(rule.missing_fields(), vec!["severity", "category"]);
    }

    #[test]
    fn json_roundtrip() {
        let rule = ConflictRule::new("r1", "No cache", "performance", Severity::Warning)
            .with_pattern("no cache")
            .with_description("High read volume without a caching layer.");
        let json = serde_json::to_string(&rule).unwrap();
        let parsed: ConflictRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);
    }
}
