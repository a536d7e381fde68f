//! Response validator: composed rule set, scoring, and the execution gate

mod rules;
mod types;

pub use rules::{
    ConfidenceFloorRule, ContradictionRule, ForbiddenOperationRule, HallucinatedToolRule,
    ParameterPresenceRule, ReasoningPresenceRule, SafetyRule, ToolAvailabilityRule, ValidationRule,
};
pub use types::{
    AgentResponse, IssueKind, IssueSeverity, ToolCall, ValidationConstraints, ValidationContext,
    ValidationIssue, ValidationResult,
};

use std::collections::HashSet;

use crate::config::ValidatorConfig;

/// Disclosure appended to a corrected response's content
const CORRECTION_NOTE: &str =
    "Note: some requested tool calls were removed because they were unavailable or failed safety checks.";

/// Validates candidate responses before anything executes.
///
/// The rule set runs in a fixed order; every rule sees the original response
/// and findings accumulate. The aggregate score starts at 1.0 and loses a
/// per-severity penalty for each finding, then earns small bonuses for
/// stated reasoning and high self-reported confidence.
pub struct ResponseValidator {
    config: ValidatorConfig,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ResponseValidator {
    /// Build the validator with the standard rule set
    pub fn new(config: ValidatorConfig) -> Self {
        let rules: Vec<Box<dyn ValidationRule>> = vec![
            Box::new(HallucinatedToolRule),
            Box::new(ToolAvailabilityRule),
            Box::new(ParameterPresenceRule),
            Box::new(SafetyRule::new(
                config.dangerous_patterns.clone(),
                config.protected_paths.clone(),
            )),
            Box::new(ReasoningPresenceRule),
            Box::new(ConfidenceFloorRule),
            Box::new(ForbiddenOperationRule),
            Box::new(ContradictionRule::new(config.contradiction_pairs.clone())),
        ];
        Self { config, rules }
    }

    /// Append a caller-defined rule after the standard set
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run every rule and aggregate the findings into a gate decision.
    ///
    /// A rule that errors is reported as a medium finding against the rule
    /// rather than aborting the pass.
    pub async fn validate_response(
        &self,
        response: &AgentResponse,
        context: &ValidationContext,
        constraints: &ValidationConstraints,
    ) -> ValidationResult {
        let mut issues = Vec::new();
        for rule in &self.rules {
            match rule.check(response, context, constraints) {
                Ok(found) => issues.extend(found),
                Err(err) => {
                    tracing::warn!(rule = rule.name(), %err, "Validation rule failed to run");
                    issues.push(ValidationIssue::new(
                        IssueKind::RuleFailure,
                        IssueSeverity::Medium,
                        format!("rule '{}' failed: {err}", rule.name()),
                    ));
                }
            }
        }

        let score = self.score(response, &issues);
        let has_critical = issues
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Critical);
        let has_unsafe = issues
            .iter()
            .any(|issue| issue.kind == IssueKind::UnsafeOperation);
        let is_valid = !issues.iter().any(|issue| {
            matches!(issue.severity, IssueSeverity::Critical | IssueSeverity::High)
        });
        let allow_execution =
            !has_critical && !has_unsafe && score >= self.config.execution_threshold;

        let mut seen = HashSet::new();
        let suggestions: Vec<String> = issues
            .iter()
            .filter_map(|issue| issue.suggested_fix.clone())
            .filter(|fix| seen.insert(fix.clone()))
            .collect();

        let corrected = self.correct(response, &issues);

        if !issues.is_empty() {
            tracing::debug!(
                issues = issues.len(),
                score,
                allow_execution,
                "Response validation found issues"
            );
        }

        ValidationResult {
            is_valid,
            score,
            issues,
            suggestions,
            corrected,
            allow_execution,
        }
    }

    fn score(&self, response: &AgentResponse, issues: &[ValidationIssue]) -> f32 {
        let mut score = 1.0;
        for issue in issues {
            score -= self.config.severity.penalty(issue.severity);
        }
        if !response.reasoning.is_empty() {
            score += self.config.severity.reasoning_bonus;
        }
        if let Some(confidence) = response.confidence {
            if confidence > self.config.severity.confidence_bonus_threshold {
                score += self.config.severity.confidence_bonus;
            }
        }
        score.clamp(0.0, 1.0)
    }

    /// Build a corrected response with flagged tool calls removed.
    ///
    /// Only issues that name a specific call are correctable; findings about
    /// the content itself yield no correction.
    fn correct(&self, response: &AgentResponse, issues: &[ValidationIssue]) -> Option<AgentResponse> {
        let flagged: HashSet<&str> = issues
            .iter()
            .filter(|issue| {
                matches!(
                    issue.kind,
                    IssueKind::ToolUnavailable
                        | IssueKind::HallucinatedTool
                        | IssueKind::UnsafeOperation
                )
            })
            .filter_map(|issue| issue.location.as_deref())
            .collect();

        if flagged.is_empty() {
            return None;
        }

        let mut corrected = response.clone();
        corrected
            .tool_calls
            .retain(|call| !flagged.contains(call.name.as_str()));
        if corrected.tool_calls.len() == response.tool_calls.len() {
            return None;
        }
        if !corrected.content.is_empty() {
            corrected.content.push(' ');
        }
        corrected.content.push_str(CORRECTION_NOTE);
        Some(corrected)
    }
}
