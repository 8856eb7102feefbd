use elicit_core::{ConflictRule, Difficulty, Domain, ExportFormat, Question, Severity};

// ---------------------------------------------------------------------------
// BusinessDomain
// ---------------------------------------------------------------------------

/// Compact domain covering the commercial side of a project. Mostly here to
/// prove that several domains coexist in one registry; real deployments add
/// their own.
pub struct BusinessDomain;

impl Domain for BusinessDomain {
    fn id(&self) -> &str {
        "business"
    }

    fn name(&self) -> &str {
        "Business"
    }

    fn version(&self) -> &str {
        "0.2.0"
    }

    fn description(&self) -> &str {
        "Stakeholder and budget questions for project specifications"
    }

    fn categories(&self) -> Vec<String> {
        vec!["stakeholders".to_string(), "budget".to_string()]
    }

    fn questions(&self) -> Vec<Question> {
        vec![
            Question::new(
                "biz-stakeholders",
                "Who signs off on the finished system?",
                "stakeholders",
            )
            .with_difficulty(Difficulty::Easy),
            Question::new(
                "biz-success",
                "What measurable outcome makes the project a success?",
                "stakeholders",
            )
            .with_dependencies(["biz-stakeholders"]),
            Question::new(
                "biz-budget",
                "What budget and deadline constrain the build?",
                "budget",
            )
            .with_dependencies(["biz-stakeholders"]),
        ]
    }

    fn export_formats(&self) -> Vec<ExportFormat> {
        vec![ExportFormat::new(
            "markdown",
            ".md",
            "text/markdown",
            "templates/business/brief.tmpl",
        )]
    }

    fn conflict_rules(&self) -> Vec<ConflictRule> {
        vec![
            ConflictRule::new(
                "biz-scope-creep",
                "Fixed budget with open scope",
                "budget",
                Severity::Error,
            )
            .with_pattern("fixed budget")
            .with_description("An open-ended feature list against a fixed budget and deadline."),
            ConflictRule::new(
                "biz-no-owner",
                "No accountable owner",
                "stakeholders",
                Severity::Warning,
            )
            .with_pattern("owner")
            .with_description("Nobody named as the decision maker for scope disputes."),
        ]
    }
}
