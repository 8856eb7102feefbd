use crate::types::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// One interview item. Every field defaults on deserialization so that an
/// incomplete record still loads; `validate()` on the owning engine is the
/// place where missing fields are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: String,
    /// Ordinal label, conventionally one of `easy`/`medium`/`hard`.
    /// Kept as a raw string: filters match it exactly, callers normalize case.
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Ids of questions that must be satisfied before this one is eligible.
    /// May reference ids outside the loaded set; that is caught at
    /// validation time, not at construction time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

fn default_difficulty() -> String {
    Difficulty::Medium.as_str().to_string()
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
            difficulty: default_difficulty(),
            dependencies: Vec::new(),
            help_text: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty.as_str().to_string();
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_help_text(mut self, help: impl Into<String>) -> Self {
        self.help_text = Some(help.into());
        self
    }

    /// True if every dependency of this question is contained in `satisfied`.
    pub fn dependencies_satisfied(&self, satisfied: &HashSet<String>) -> bool {
        self.dependencies.iter().all(|d| satisfied.contains(d))
    }

    /// Required fields that are missing or empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.trim().is_empty() {
            missing.push("id");
        }
        if self.text.trim().is_empty() {
            missing.push("text");
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
