use elicit_core::{ConflictRule, Difficulty, Domain, ExportFormat, Question, Severity};

// ---------------------------------------------------------------------------
// ProgrammingDomain
// ---------------------------------------------------------------------------

/// Built-in domain for interviewing a user about a software project:
/// architecture, security, performance, and testing. Pure static data; the
/// engines own all filtering and validation.
pub struct ProgrammingDomain;

impl Domain for ProgrammingDomain {
    fn id(&self) -> &str {
        "programming"
    }

    fn name(&self) -> &str {
        "Programming"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Specification questions and conflict rules for software projects"
    }

    fn categories(&self) -> Vec<String> {
        ["architecture", "security", "performance", "testing"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn questions(&self) -> Vec<Question> {
        vec![
            // Architecture: scope first, everything else hangs off it.
            Question::new(
                "arch-scope",
                "What problem does the system solve, and for whom?",
                "architecture",
            )
            .with_difficulty(Difficulty::Easy)
            .with_help_text("One or two sentences; name the primary user."),
            Question::new(
                "arch-components",
                "What are the major components and how do they communicate?",
                "architecture",
            )
            .with_dependencies(["arch-scope"]),
            Question::new(
                "arch-data-flow",
                "Where does data live, and which component owns each store?",
                "architecture",
            )
            .with_difficulty(Difficulty::Hard)
            .with_dependencies(["arch-components"]),
            // Security
            Question::new(
                "sec-auth",
                "How are users authenticated and sessions managed?",
                "security",
            )
            .with_dependencies(["arch-components"]),
            Question::new(
                "sec-secrets",
                "Where are credentials and API keys stored, and who can read them?",
                "security",
            )
            .with_difficulty(Difficulty::Hard)
            .with_dependencies(["sec-auth"]),
            // Performance
            Question::new(
                "perf-load",
                "What request volume and data size must the system handle?",
                "performance",
            )
            .with_difficulty(Difficulty::Easy)
            .with_dependencies(["arch-scope"]),
            Question::new(
                "perf-caching",
                "Which reads are hot enough to cache, and how is the cache invalidated?",
                "performance",
            )
            .with_difficulty(Difficulty::Hard)
            .with_dependencies(["perf-load", "arch-data-flow"]),
            // Testing
            Question::new(
                "test-strategy",
                "What is tested at the unit, integration, and end-to-end levels?",
                "testing",
            )
            .with_dependencies(["arch-components"]),
            Question::new(
                "test-ci",
                "Which checks gate a merge, and how long may they take?",
                "testing",
            )
            .with_difficulty(Difficulty::Easy)
            .with_dependencies(["test-strategy"]),
        ]
    }

    fn export_formats(&self) -> Vec<ExportFormat> {
        vec![
            ExportFormat::new("rust", ".rs", "text/x-rust", "templates/programming/rust.tmpl"),
            ExportFormat::new(
                "python",
                ".py",
                "text/x-python",
                "templates/programming/python.tmpl",
            ),
            ExportFormat::new(
                "typescript",
                ".ts",
                "text/typescript",
                "templates/programming/typescript.tmpl",
            ),
        ]
    }

    fn conflict_rules(&self) -> Vec<ConflictRule> {
        vec![
            ConflictRule::new(
                "arch-monolith-scale",
                "Monolith with independent scaling",
                "architecture",
                Severity::Warning,
            )
            .with_pattern("monolith")
            .with_description(
                "A single deployable unit conflicts with scaling components independently.",
            ),
            ConflictRule::new(
                "sec-plaintext-secrets",
                "Plaintext secrets",
                "security",
                Severity::Error,
            )
            .with_pattern("plaintext")
            .with_description("Credentials stored in source or config files readable by all."),
            ConflictRule::new(
                "sec-open-cors",
                "Wildcard CORS with credentials",
                "security",
                Severity::Warning,
            )
            .with_pattern("cors")
            .with_description("Allowing any origin while accepting credentialed requests."),
            ConflictRule::new(
                "perf-no-cache",
                "Hot reads without a cache",
                "performance",
                Severity::Warning,
            )
            .with_pattern("cache")
            .with_description("High read volume served straight from the primary store."),
            ConflictRule::new(
                "perf-sync-blocking",
                "Blocking calls on the request path",
                "performance",
                Severity::Error,
            )
            .with_pattern("blocking")
            .with_description("Synchronous external calls inside latency-sensitive handlers."),
            ConflictRule::new(
                "test-none-declared",
                "No automated tests",
                "testing",
                Severity::Error,
            )
            .with_pattern("no tests")
            .with_description("A merge gate that runs no automated test suite at all."),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
