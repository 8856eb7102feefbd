use crate::error::{ElicitError, Result};
use crate::io;
use crate::question::Question;
use crate::report::{ValidationProblem, ValidationReport};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tracing::debug;

// ---------------------------------------------------------------------------
// QuestionFilter
// ---------------------------------------------------------------------------

/// Predicates for `QuestionEngine::filter`. All provided fields must match;
/// an unset field matches everything. `category` and `difficulty` are exact,
/// case-sensitive matches by contract — callers normalize case.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    /// When set, only questions whose entire dependency set is contained
    /// in this set pass.
    pub satisfied: Option<HashSet<String>>,
}

impl QuestionFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn with_satisfied<I, S>(mut self, satisfied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.satisfied = Some(satisfied.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches(&self, question: &Question) -> bool {
        if let Some(ref category) = self.category {
            if question.category != *category {
                return false;
            }
        }
        if let Some(ref difficulty) = self.difficulty {
            if question.difficulty != *difficulty {
                return false;
            }
        }
        if let Some(ref satisfied) = self.satisfied {
            if !question.dependencies_satisfied(satisfied) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// QuestionEngine
// ---------------------------------------------------------------------------

/// Holds one loaded set of `Question` records and answers "which questions
/// are valid to ask next". Load order is preserved; every query walks the
/// set in that order, so results are deterministic.
#[derive(Debug, Default)]
pub struct QuestionEngine {
    questions: Option<Vec<Question>>,
}

impl QuestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working set. No cross-record checks happen here; call
    /// `validate()` before trusting the set.
    pub fn load(&mut self, records: Vec<Question>) {
        debug!(count = records.len(), "loaded question set");
        self.questions = Some(records);
    }

    pub fn is_loaded(&self) -> bool {
        self.questions.is_some()
    }

    pub fn count(&self) -> usize {
        self.questions().len()
    }

    /// The loaded set in load order, empty before the first `load()`.
    pub fn questions(&self) -> &[Question] {
        self.questions.as_deref().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check the loaded set for missing required fields, duplicate ids,
    /// dangling dependency references, and dependency cycles.
    ///
    /// Content problems are reported, not raised; `Err` is reserved for the
    /// programmer error of validating before any `load()`.
    pub fn validate(&self) -> Result<ValidationReport> {
        let questions = self
            .questions
            .as_deref()
            .ok_or(ElicitError::NotLoaded("validate()"))?;

        let mut problems = Vec::new();

        for q in questions {
            for field in q.missing_fields() {
                problems.push(ValidationProblem::MissingField {
                    id: q.id.clone(),
                    field,
                });
            }
        }

        problems.extend(duplicate_ids(questions.iter().map(|q| q.id.as_str())));

        let known: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        for q in questions {
            for dep in &q.dependencies {
                if !known.contains(dep.as_str()) {
                    problems.push(ValidationProblem::UnknownDependency {
                        id: q.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        for path in find_cycles(questions) {
            problems.push(ValidationProblem::DependencyCycle { path });
        }

        debug!(problems = problems.len(), "validated question set");
        Ok(ValidationReport::new(problems))
    }

    // -----------------------------------------------------------------------
    // Filtering & recommendation
    // -----------------------------------------------------------------------

    /// Questions matching every provided predicate, in load order. A filter
    /// that matches nothing yields an empty vec, never an error.
    pub fn filter(&self, filter: &QuestionFilter) -> Vec<&Question> {
        self.questions().iter().filter(|q| filter.matches(q)).collect()
    }

    /// The next questions worth asking: dependencies fully satisfied, not
    /// already answered, optionally restricted to one category, truncated
    /// to `limit`. Order is load order.
    pub fn get_next_questions(
        &self,
        satisfied: &HashSet<String>,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<&Question> {
        let candidates = self
            .questions()
            .iter()
            .filter(|q| !satisfied.contains(&q.id))
            .filter(|q| q.dependencies_satisfied(satisfied))
            .filter(|q| category.map_or(true, |c| q.category == c));
        match limit {
            Some(n) => candidates.take(n).collect(),
            None => candidates.collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.questions())?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.questions())?)
    }

    /// Write the loaded set to `path` as a JSON array, atomically.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        io::save_records(path, self.questions())
    }

    /// Replace the working set from a JSON-array document. Returns the number
    /// of records loaded; on error the previous set is untouched.
    pub fn load_json(&mut self, path: &Path) -> Result<usize> {
        let records: Vec<Question> = io::load_records(path)?;
        let count = records.len();
        self.load(records);
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// One `DuplicateId` problem per id that occurs more than once, in first-seen
/// order. Shared with the rule engine.
pub(crate) fn duplicate_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
) -> Vec<ValidationProblem> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for id in ids {
        let entry = counts.entry(id).or_insert(0);
        if *entry == 0 {
            order.push(id);
        }
        *entry += 1;
    }
    order
        .into_iter()
        .filter(|id| counts[id] > 1)
        .map(|id| ValidationProblem::DuplicateId {
            id: id.to_string(),
            count: counts[id],
        })
        .collect()
}

/// Cycle detection over the dependency graph: iterative three-color DFS.
/// Each back edge yields one cycle path (entry id repeated at the end).
/// Edges to ids outside the set are ignored here; they are reported
/// separately as `UnknownDependency`.
fn find_cycles(questions: &[Question]) -> Vec<Vec<String>> {
    // First occurrence wins for duplicate ids; duplicates are already
    // reported on their own.
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, q) in questions.iter().enumerate() {
        index.entry(q.id.as_str()).or_insert(i);
    }
    let adjacency: Vec<Vec<usize>> = questions
        .iter()
        .map(|q| {
            q.dependencies
                .iter()
                .filter_map(|d| index.get(d.as_str()).copied())
                .collect()
        })
        .collect();

    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;
    let mut color = vec![WHITE; questions.len()];
    let mut cycles = Vec::new();

    for start in 0..questions.len() {
        if color[start] != WHITE {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        color[start] = GRAY;
        while !stack.is_empty() {
            // Advance the top frame's child cursor, releasing the borrow on
            // `stack` before mutating it below.
            let (node, child) = {
                let last = stack.len() - 1;
                let frame = &mut stack[last];
                let node = frame.0;
                if frame.1 < adjacency[node].len() {
                    let child = adjacency[node][frame.1];
                    frame.1 += 1;
                    (node, Some(child))
                } else {
                    (node, None)
                }
            };
            match child {
                Some(child) => match color[child] {
                    WHITE => {
                        color[child] = GRAY;
                        stack.push((child, 0));
                    }
                    GRAY => {
                        // Back edge: the child is somewhere on the DFS stack.
                        if let Some(pos) = stack.iter().position(|&(n, _)| n == child) {
                            let mut path: Vec<String> = stack[pos..]
                                .iter()
                                .map(|&(n, _)| questions[n].id.clone())
                                .collect();
                            path.push(questions[child].id.clone());
                            cycles.push(path);
                        }
                    }
                    _ => {}
                },
                None => {
                    color[node] = BLACK;
                    stack.pop();
                }
            }
        }
    }
    cycles
}

// ---------------------------------------------------------------------------
// Process-wide instance
// ---------------------------------------------------------------------------

static QUESTION_ENGINE: OnceLock<Mutex<QuestionEngine>> = OnceLock::new();

/// The process-wide question engine, created on first access. All access
/// goes through the mutex; tests wanting isolation construct their own
/// `QuestionEngine` instead.
pub fn get_question_engine() -> &'static Mutex<QuestionEngine> {
    QUESTION_ENGINE.get_or_init(|| Mutex::new(QuestionEngine::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
