use crate::error::{ElicitError, Result};
use crate::io;
use crate::question_engine::duplicate_ids;
use crate::report::{ValidationProblem, ValidationReport};
use crate::rule::ConflictRule;
use crate::types::Severity;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tracing::debug;

// ---------------------------------------------------------------------------
// RuleFilter
// ---------------------------------------------------------------------------

/// Predicates for `RuleEngine::filter`, composed with logical AND.
///
/// `severity` matches the rule's normalized level, so input case never
/// matters. `category` is an exact match. `pattern` is a case-insensitive
/// substring search over `name` and `description`; richer matching would be
/// a new field here, not a change to `pattern` semantics.
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    pub severity: Option<Severity>,
    pub category: Option<String>,
    pub pattern: Option<String>,
}

impl RuleFilter {
    pub fn severity(severity: Severity) -> Self {
        Self {
            severity: Some(severity),
            ..Self::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Public so callers can chain filters over an earlier result set with
    /// the same outcome as one combined call.
    pub fn matches(&self, rule: &ConflictRule) -> bool {
        if let Some(severity) = self.severity {
            if rule.severity_level() != Some(severity) {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if rule.category != *category {
                return false;
            }
        }
        if let Some(ref pattern) = self.pattern {
            if !rule.matches_pattern(pattern) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// RuleEngine
// ---------------------------------------------------------------------------

/// Holds one loaded set of `ConflictRule` records and answers "which rules
/// apply". Everything is a linear scan in load order; rule sets are small
/// (tens, not millions).
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Option<Vec<ConflictRule>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working set. No cross-record checks happen here.
    pub fn load(&mut self, records: Vec<ConflictRule>) {
        debug!(count = records.len(), "loaded rule set");
        self.rules = Some(records);
    }

    pub fn is_loaded(&self) -> bool {
        self.rules.is_some()
    }

    pub fn count(&self) -> usize {
        self.rules().len()
    }

    /// The loaded set in load order, empty before the first `load()`.
    pub fn rules(&self) -> &[ConflictRule] {
        self.rules.as_deref().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check the loaded set for missing required fields, duplicate ids, and
    /// severities outside the closed set. Rules have no dependency graph,
    /// so there is no cycle check here.
    pub fn validate(&self) -> Result<ValidationReport> {
        let rules = self
            .rules
            .as_deref()
            .ok_or(ElicitError::NotLoaded("validate()"))?;

        let mut problems = Vec::new();

        for rule in rules {
            for field in rule.missing_fields() {
                problems.push(ValidationProblem::MissingField {
                    id: rule.id.clone(),
                    field,
                });
            }
        }

        problems.extend(duplicate_ids(rules.iter().map(|r| r.id.as_str())));

        for rule in rules {
            if !rule.severity.trim().is_empty() && rule.severity_level().is_none() {
                problems.push(ValidationProblem::UnknownSeverity {
                    id: rule.id.clone(),
                    severity: rule.severity.clone(),
                });
            }
        }

        debug!(problems = problems.len(), "validated rule set");
        Ok(ValidationReport::new(problems))
    }

    // -----------------------------------------------------------------------
    // Filtering & grouping
    // -----------------------------------------------------------------------

    /// Rules matching every provided predicate, in load order.
    pub fn filter(&self, filter: &RuleFilter) -> Vec<&ConflictRule> {
        self.rules().iter().filter(|r| filter.matches(r)).collect()
    }

    /// Partition the loaded set by category. Every rule lands in exactly one
    /// group; within a group, load order is preserved.
    pub fn group_by_category(&self) -> HashMap<String, Vec<&ConflictRule>> {
        let mut groups: HashMap<String, Vec<&ConflictRule>> = HashMap::new();
        for rule in self.rules() {
            groups.entry(rule.category.clone()).or_default().push(rule);
        }
        groups
    }

    /// Partition the loaded set by normalized severity. Rules whose severity
    /// does not parse are absent here; `validate()` reports them, and a
    /// validated set always partitions completely.
    pub fn group_by_severity(&self) -> HashMap<Severity, Vec<&ConflictRule>> {
        let mut groups: HashMap<Severity, Vec<&ConflictRule>> = HashMap::new();
        for rule in self.rules() {
            if let Some(severity) = rule.severity_level() {
                groups.entry(severity).or_default().push(rule);
            }
        }
        groups
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.rules())?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.rules())?)
    }

    /// Write the loaded set to `path` as a JSON array, atomically.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        io::save_records(path, self.rules())
    }

    /// Replace the working set from a JSON-array document. Returns the number
    /// of records loaded; on error the previous set is untouched.
    pub fn load_json(&mut self, path: &Path) -> Result<usize> {
        let records: Vec<ConflictRule> = io::load_records(path)?;
        let count = records.len();
        self.load(records);
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Process-wide instance
// ---------------------------------------------------------------------------

static RULE_ENGINE: OnceLock<Mutex<RuleEngine>> = OnceLock::new();

/// The process-wide rule engine, created on first access.
pub fn get_rule_engine() -> &'static Mutex<RuleEngine> {
    RULE_ENGINE.get_or_init(|| Mutex::new(RuleEngine::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn security_pair() -> Vec<ConflictRule> {
        vec![
            ConflictRule {
                severity: "Error".to_string(),
                ..ConflictRule::new("r1", "Plaintext secrets", "security", Severity::Error)
            },
            ConflictRule::new("r2", "Broad CORS", "security", Severity::Warning)
                .with_description("Wildcard origins with credentialed requests."),
        ]
    }

    fn engine(records: Vec<ConflictRule>) -> RuleEngine {
        let mut e = RuleEngine::new();
        e.load(records);
        e
    }

    #[test]
    fn validate_before_load_is_programmer_error() {
        let e = RuleEngine::new();
        assert!(matches!(e.validate(), Err(ElicitError::NotLoaded(_))));
    }

    #[test]
    fn valid_set_reports_valid() {
        assert!(engine(security_pair()).validate().unwrap().valid);
    }

    #[test]
    fn missing_fields_itemized() {
        let e = engine(vec![ConflictRule {
            id: "r1".to_string(),
            ..Default::default()
        }]);
        let report = e.validate().unwrap();
        let fields: Vec<_> = report
            .problems
            .iter()
            .filter_map(|p| match p {
                ValidationProblem::MissingField { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["name", "severity", "category"]);
    }

    #[test]
    fn unknown_severity_itemized_not_raised() {
        let e = engine(vec![ConflictRule {
            severity: "catastrophic".to_string(),
            ..ConflictRule::new("r1", "n", "c", Severity::Error)
        }]);
        let report = e.validate().unwrap();
        assert!(report.problems.contains(&ValidationProblem::UnknownSeverity {
            id: "r1".to_string(),
            severity: "catastrophic".to_string(),
        }));
    }

    #[test]
    fn duplicate_rule_ids_reported_once_each() {
        let mut rules = security_pair();
        rules.push(ConflictRule::new("r1", "dup", "security", Severity::Error));
        let report = engine(rules).validate().unwrap();
        let dups: Vec<_> = report
            .problems
            .iter()
            .filter_map(|p| match p {
                ValidationProblem::DuplicateId { id, count } => Some((id.as_str(), *count)),
                _ => None,
            })
            .collect();
        assert_eq!(dups, vec![("r1", 2)]);
    }

    #[test]
    fn severity_filter_is_case_insensitive_on_input() {
        // r1 carries "Error" on the wire; the normalized level still matches.
        let e = engine(security_pair());
        let hits = e.filter(&RuleFilter::severity(Severity::Error));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "r1");
    }

    #[test]
    fn pattern_filter_searches_name_and_description() {
        let e = engine(security_pair());
        assert_eq!(e.filter(&RuleFilter::pattern("plaintext")).len(), 1);
        assert_eq!(e.filter(&RuleFilter::pattern("WILDCARD")).len(), 1);
        assert!(e.filter(&RuleFilter::pattern("database")).is_empty());
    }

    #[test]
    fn chained_filters_equal_combined_filter() {
        let mut rules = security_pair();
        rules.push(
            ConflictRule::new("r3", "Missing index", "performance", Severity::Error)
                .with_description("Full scans on the hot path."),
        );
        let e = engine(rules);

        let combined = e.filter(&RuleFilter::severity(Severity::Error).with_category("security"));

        let by_severity = e.filter(&RuleFilter::severity(Severity::Error));
        let category = RuleFilter::category("security");
        let chained: Vec<_> = by_severity
            .into_iter()
            .filter(|r| category.matches(r))
            .collect();

        assert_eq!(
            combined.iter().map(|r| &r.id).collect::<Vec<_>>(),
            chained.iter().map(|r| &r.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn group_by_category_partitions_the_set() {
        let mut rules = security_pair();
        rules.push(ConflictRule::new("r3", "n", "performance", Severity::Error));
        let e = engine(rules);
        let groups = e.group_by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["security"].len(), 2);
        assert_eq!(groups["performance"].len(), 1);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, e.count());
    }

    #[test]
    fn group_by_severity_single_level_still_maps() {
        let e = engine(vec![
            ConflictRule::new("r1", "a", "c", Severity::Warning),
            ConflictRule::new("r2", "b", "c", Severity::Warning),
        ]);
        let groups = e.group_by_severity();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&Severity::Warning].len(), 2);
    }

    #[test]
    fn mixed_case_severities_filter_and_group_together() {
        let e = engine(security_pair());
        let errors = e.filter(&RuleFilter::severity(Severity::Error));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].id, "r1");
        let groups = e.group_by_category();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["security"].len(), 2);
    }

    #[test]
    fn fifty_rules_share_categories_without_loss() {
        let rules: Vec<ConflictRule> = (0..50)
            .map(|i| {
                let severity = if i % 2 == 0 { Severity::Error } else { Severity::Warning };
                ConflictRule::new(
                    format!("r{i}"),
                    format!("Rule {i}"),
                    format!("cat{}", i % 5),
                    severity,
                )
            })
            .collect();
        let e = engine(rules);
        assert!(e.validate().unwrap().valid);
        assert_eq!(e.group_by_category().len(), 5);
        assert_eq!(e.filter(&RuleFilter::severity(Severity::Error)).len(), 25);
        let total: usize = e.group_by_severity().values().map(Vec::len).sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn to_json_roundtrip() {
        let e = engine(security_pair());
        let json = e.to_json().unwrap();
        let reloaded: Vec<ConflictRule> = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, e.rules());
    }

    #[test]
    fn singleton_accessor_shares_state() {
        {
            let mut e = get_rule_engine().lock().unwrap();
            e.load(security_pair());
        }
        assert_eq!(get_rule_engine().lock().unwrap().count(), 2);
    }
}
