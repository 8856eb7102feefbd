use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// ValidationProblem
// ---------------------------------------------------------------------------

/// One itemized content problem found by an engine's `validate()`.
///
/// Problems are returned, never raised: a caller usually wants the full
/// picture of a broken record set at once rather than the first failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationProblem {
    MissingField {
        id: String,
        field: &'static str,
    },
    DuplicateId {
        id: String,
        count: usize,
    },
    /// Ids along the cycle, with the entry id repeated at the end,
    /// e.g. `["a", "b", "a"]`.
    DependencyCycle {
        path: Vec<String>,
    },
    UnknownDependency {
        id: String,
        dependency: String,
    },
    UnknownSeverity {
        id: String,
        severity: String,
    },
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationProblem::MissingField { id, field } => {
                write!(f, "record '{id}': missing required field '{field}'")
            }
            ValidationProblem::DuplicateId { id, count } => {
                write!(f, "duplicate id '{id}' ({count} occurrences)")
            }
            ValidationProblem::DependencyCycle { path } => {
                write!(f, "dependency cycle: {}", path.join(" -> "))
            }
            ValidationProblem::UnknownDependency { id, dependency } => {
                write!(f, "question '{id}' depends on unknown id '{dependency}'")
            }
            ValidationProblem::UnknownSeverity { id, severity } => {
                write!(f, "rule '{id}': unknown severity '{severity}'")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub problems: Vec<ValidationProblem>,
}

impl ValidationReport {
    pub fn new(problems: Vec<ValidationProblem>) -> Self {
        Self {
            valid: problems.is_empty(),
            problems,
        }
    }

    pub fn has_cycle(&self) -> bool {
        self.problems
            .iter()
            .any(|p| matches!(p, ValidationProblem::DependencyCycle { .. }))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        writeln!(f, "{} problem(s):", self.problems.len())?;
        for p in &self.problems {
            writeln!(f, "  - {p}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
