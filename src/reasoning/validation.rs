//! Step and chain validation for reasoning chains

use std::collections::HashSet;

use crate::config::ReasoningConfig;
use crate::reasoning::types::{ReasoningChain, ReasoningStep, StepKind};
use crate::validator::{IssueKind, IssueSeverity, ValidationIssue};

/// Checks candidate steps against the chain they extend.
///
/// A step is rejected when any critical or high severity issue is raised;
/// medium and low findings are recorded but do not block the step.
pub struct StepValidator {
    config: ReasoningConfig,
}

impl StepValidator {
    pub fn new(config: ReasoningConfig) -> Self {
        Self { config }
    }

    /// Validate a candidate step against the chain it would extend.
    ///
    /// `chain` holds the steps added so far; the candidate is not yet
    /// appended when this runs.
    pub fn validate_step(&self, chain: &ReasoningChain, step: &ReasoningStep) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if step.kind == StepKind::Conclusion && step.evidence.is_empty() {
            issues.push(ValidationIssue::new(
                IssueKind::MissingEvidence,
                IssueSeverity::High,
                "conclusion step carries no supporting evidence",
            ));
        }

        if step.assumptions.len() > self.config.max_assumptions {
            issues.push(ValidationIssue::new(
                IssueKind::ExcessiveAssumptions,
                IssueSeverity::Medium,
                format!(
                    "step leans on {} assumptions (limit {})",
                    step.assumptions.len(),
                    self.config.max_assumptions
                ),
            ));
        }

        if step.kind == StepKind::Hypothesis {
            if let Some(previous) = chain.last_step() {
                if previous.kind == StepKind::Conclusion {
                    issues.push(ValidationIssue::new(
                        IssueKind::InconsistentLogic,
                        IssueSeverity::Medium,
                        "hypothesis introduced immediately after a conclusion",
                    ));
                }
            }
        }

        let lowered = step.content.to_lowercase();
        for constraint in &self.config.forbidden_constraints {
            if lowered.contains(&constraint.to_lowercase()) {
                issues.push(
                    ValidationIssue::new(
                        IssueKind::ConstraintViolation,
                        IssueSeverity::High,
                        format!("step content violates constraint '{constraint}'"),
                    )
                    .with_fix("rework the step to respect the stated constraint"),
                );
            }
        }

        if step.kind == StepKind::Action {
            for token in tool_tokens(&step.content) {
                if !chain
                    .context
                    .available_tools
                    .iter()
                    .any(|tool| tool.eq_ignore_ascii_case(&token))
                {
                    issues.push(
                        ValidationIssue::new(
                            IssueKind::ToolUnavailable,
                            IssueSeverity::High,
                            format!("action step refers to unavailable tool '{token}'"),
                        )
                        .with_fix("use a tool from the chain's available set"),
                    );
                }
            }
        }

        for earlier in &chain.steps {
            let similarity = jaccard_similarity(&earlier.content, &step.content);
            if similarity > self.config.circular_similarity_threshold {
                issues.push(ValidationIssue::new(
                    IssueKind::CircularReasoning,
                    IssueSeverity::High,
                    format!(
                        "step repeats earlier reasoning ({:.0}% token overlap)",
                        similarity * 100.0
                    ),
                ));
                break;
            }
        }

        issues
    }

    /// Whole-chain checks, applied on top of per-step re-validation
    pub fn validate_chain_level(&self, chain: &ReasoningChain) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if chain.steps.len() < self.config.min_chain_steps {
            issues.push(ValidationIssue::new(
                IssueKind::ChainTooShort,
                IssueSeverity::Medium,
                format!(
                    "chain has {} step(s); at least {} expected",
                    chain.steps.len(),
                    self.config.min_chain_steps
                ),
            ));
        }

        if !chain.has_conclusion() {
            issues.push(ValidationIssue::new(
                IssueKind::MissingConclusion,
                IssueSeverity::High,
                "chain never reaches a conclusion step",
            ));
        }

        issues
    }

    /// A step is rejected only for critical or high severity findings
    pub fn is_step_valid(issues: &[ValidationIssue]) -> bool {
        !issues
            .iter()
            .any(|issue| matches!(issue.severity, IssueSeverity::Critical | IssueSeverity::High))
    }
}

/// Tokens in action-step content that look like tool names.
///
/// Snake_case words are treated as tool references; plain prose words are
/// not, which keeps ordinary sentences from tripping the availability check.
fn tool_tokens(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.contains('_') && word.len() > 1)
        .map(|word| word.to_lowercase())
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Jaccard similarity between lowercase token sets of two texts
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let tokens_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let tokens_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count() as f32;
    let union = tokens_a.union(&tokens_b).count() as f32;
    intersection / union
}
