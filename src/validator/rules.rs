//! The individual validation rules composed by the response validator

use serde_json::Value;

use crate::error::Result;
use crate::tools::ToolHealth;
use crate::validator::types::{
    AgentResponse, IssueKind, IssueSeverity, ValidationConstraints, ValidationContext,
    ValidationIssue,
};

/// One check over a candidate response.
///
/// Rules only observe; they never mutate the response. A rule returning an
/// error is reported as a finding against the rule itself rather than
/// aborting the whole validation pass.
pub trait ValidationRule: Send + Sync {
    /// Stable rule name, used in failure reporting
    fn name(&self) -> &'static str;

    /// Run the check and return any findings
    fn check(
        &self,
        response: &AgentResponse,
        context: &ValidationContext,
        constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>>;
}

/// Flags tool calls naming tools that do not exist in the context
pub struct HallucinatedToolRule;

impl ValidationRule for HallucinatedToolRule {
    fn name(&self) -> &'static str {
        "hallucinated_tool"
    }

    fn check(
        &self,
        response: &AgentResponse,
        context: &ValidationContext,
        _constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for call in &response.tool_calls {
            if context.tool(&call.name).is_none() {
                issues.push(
                    ValidationIssue::new(
                        IssueKind::HallucinatedTool,
                        IssueSeverity::Critical,
                        format!("tool call '{}' names a tool that does not exist", call.name),
                    )
                    .with_location(call.name.clone())
                    .with_fix("remove the call or use a tool from the available set"),
                );
            }
        }
        Ok(issues)
    }
}

/// Flags calls to tools that exist but report themselves unusable
pub struct ToolAvailabilityRule;

impl ValidationRule for ToolAvailabilityRule {
    fn name(&self) -> &'static str {
        "tool_availability"
    }

    fn check(
        &self,
        response: &AgentResponse,
        context: &ValidationContext,
        _constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for call in &response.tool_calls {
            if let Some(tool) = context.tool(&call.name) {
                if tool.health == ToolHealth::Unavailable {
                    issues.push(
                        ValidationIssue::new(
                            IssueKind::ToolUnavailable,
                            IssueSeverity::High,
                            format!("tool '{}' is registered but currently unavailable", call.name),
                        )
                        .with_location(call.name.clone())
                        .with_fix("wait for the tool to recover or use an alternative"),
                    );
                }
            }
        }
        Ok(issues)
    }
}

/// Flags calls that omit arguments to tools declaring an input payload
pub struct ParameterPresenceRule;

impl ValidationRule for ParameterPresenceRule {
    fn name(&self) -> &'static str {
        "parameter_presence"
    }

    fn check(
        &self,
        response: &AgentResponse,
        context: &ValidationContext,
        _constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for call in &response.tool_calls {
            let Some(tool) = context.tool(&call.name) else {
                continue; // the hallucination rule owns unknown names
            };
            if !tool.expects_input() {
                continue;
            }
            let empty = match &call.arguments {
                Value::Null => true,
                Value::Object(map) => map.is_empty(),
                Value::String(s) => s.is_empty(),
                _ => false,
            };
            if empty {
                issues.push(
                    ValidationIssue::new(
                        IssueKind::MissingParameter,
                        IssueSeverity::Medium,
                        format!("tool call '{}' carries no arguments", call.name),
                    )
                    .with_location(call.name.clone()),
                );
            }
        }
        Ok(issues)
    }
}

/// Scans content and call arguments for dangerous shell patterns and
/// protected-path writes. Disabled entirely when the caller opts out of
/// safety checks.
pub struct SafetyRule {
    dangerous_patterns: Vec<String>,
    protected_paths: Vec<String>,
}

impl SafetyRule {
    pub fn new(dangerous_patterns: Vec<String>, protected_paths: Vec<String>) -> Self {
        Self {
            dangerous_patterns,
            protected_paths,
        }
    }

    fn scan_text(&self, text: &str, location: Option<&str>, issues: &mut Vec<ValidationIssue>) {
        let lowered = text.to_lowercase();
        for pattern in &self.dangerous_patterns {
            if lowered.contains(&pattern.to_lowercase()) {
                let mut issue = ValidationIssue::new(
                    IssueKind::UnsafeOperation,
                    IssueSeverity::Critical,
                    format!("matches dangerous pattern '{pattern}'"),
                );
                if let Some(location) = location {
                    issue = issue.with_location(location);
                }
                issues.push(issue);
            }
        }
    }

    fn protected_path_hit(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => self
                .protected_paths
                .iter()
                .any(|prefix| s.starts_with(prefix.as_str()))
                .then(|| s.clone()),
            Value::Object(map) => map.values().find_map(|v| self.protected_path_hit(v)),
            Value::Array(items) => items.iter().find_map(|v| self.protected_path_hit(v)),
            _ => None,
        }
    }
}

impl ValidationRule for SafetyRule {
    fn name(&self) -> &'static str {
        "safety"
    }

    fn check(
        &self,
        response: &AgentResponse,
        context: &ValidationContext,
        constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        if !constraints.enable_safety_checks {
            return Ok(Vec::new());
        }

        let mut issues = Vec::new();
        self.scan_text(&response.content, None, &mut issues);

        for call in &response.tool_calls {
            self.scan_text(&call.arguments.to_string(), Some(&call.name), &mut issues);

            let writes = context
                .tool(&call.name)
                .map(|tool| tool.capabilities.write)
                .unwrap_or(false);
            if writes {
                if let Some(path) = self.protected_path_hit(&call.arguments) {
                    issues.push(
                        ValidationIssue::new(
                            IssueKind::UnsafeOperation,
                            IssueSeverity::High,
                            format!("write-capable tool '{}' targets protected path '{path}'", call.name),
                        )
                        .with_location(call.name.clone()),
                    );
                }
            }
        }
        Ok(issues)
    }
}

/// Flags tool usage proposed without any stated reasoning
pub struct ReasoningPresenceRule;

impl ValidationRule for ReasoningPresenceRule {
    fn name(&self) -> &'static str {
        "reasoning_presence"
    }

    fn check(
        &self,
        response: &AgentResponse,
        _context: &ValidationContext,
        constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        if response.reasoning.is_empty() {
            if !response.tool_calls.is_empty() {
                issues.push(ValidationIssue::new(
                    IssueKind::MissingReasoning,
                    IssueSeverity::Low,
                    "tool calls proposed without stated reasoning",
                ));
            } else if constraints.require_reasoning {
                issues.push(ValidationIssue::new(
                    IssueKind::MissingReasoning,
                    IssueSeverity::Medium,
                    "reasoning is required but the response carries none",
                ));
            }
        }
        Ok(issues)
    }
}

/// Enforces the caller's self-reported confidence floor
pub struct ConfidenceFloorRule;

impl ValidationRule for ConfidenceFloorRule {
    fn name(&self) -> &'static str {
        "confidence_floor"
    }

    fn check(
        &self,
        response: &AgentResponse,
        _context: &ValidationContext,
        constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        let Some(floor) = constraints.min_confidence else {
            return Ok(Vec::new());
        };
        let mut issues = Vec::new();
        match response.confidence {
            Some(confidence) if confidence < floor => {
                issues.push(ValidationIssue::new(
                    IssueKind::LowConfidence,
                    IssueSeverity::Medium,
                    format!("self-reported confidence {confidence:.2} is below the floor {floor:.2}"),
                ));
            }
            None => {
                issues.push(ValidationIssue::new(
                    IssueKind::LowConfidence,
                    IssueSeverity::Low,
                    "a confidence floor is set but the response reports no confidence",
                ));
            }
            Some(_) => {}
        }
        Ok(issues)
    }
}

/// Flags content or arguments matching caller-forbidden operations
pub struct ForbiddenOperationRule;

impl ValidationRule for ForbiddenOperationRule {
    fn name(&self) -> &'static str {
        "forbidden_operation"
    }

    fn check(
        &self,
        response: &AgentResponse,
        _context: &ValidationContext,
        constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let content = response.content.to_lowercase();
        for forbidden in &constraints.forbidden_operations {
            let needle = forbidden.to_lowercase();
            if content.contains(&needle) {
                issues.push(ValidationIssue::new(
                    IssueKind::ForbiddenOperation,
                    IssueSeverity::High,
                    format!("response content matches forbidden operation '{forbidden}'"),
                ));
            }
            for call in &response.tool_calls {
                if call.arguments.to_string().to_lowercase().contains(&needle) {
                    issues.push(
                        ValidationIssue::new(
                            IssueKind::ForbiddenOperation,
                            IssueSeverity::High,
                            format!("tool call '{}' matches forbidden operation '{forbidden}'", call.name),
                        )
                        .with_location(call.name.clone()),
                    );
                }
            }
        }
        Ok(issues)
    }
}

/// Flags adjacent reasoning statements asserting opposite polarities
pub struct ContradictionRule {
    pairs: Vec<(String, String)>,
}

impl ContradictionRule {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    fn polarity(&self, statement: &str, positive: &str, negative: &str) -> Option<bool> {
        let lowered = statement.to_lowercase();
        if lowered.contains(negative) {
            Some(false)
        } else if lowered.contains(positive) {
            Some(true)
        } else {
            None
        }
    }
}

impl ValidationRule for ContradictionRule {
    fn name(&self) -> &'static str {
        "contradiction"
    }

    fn check(
        &self,
        response: &AgentResponse,
        _context: &ValidationContext,
        _constraints: &ValidationConstraints,
    ) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for window in response.reasoning.windows(2) {
            for (positive, negative) in &self.pairs {
                let a = self.polarity(&window[0], positive, negative);
                let b = self.polarity(&window[1], positive, negative);
                if let (Some(a), Some(b)) = (a, b) {
                    if a != b {
                        issues.push(
                            ValidationIssue::new(
                                IssueKind::Contradiction,
                                IssueSeverity::Medium,
                                format!(
                                    "adjacent reasoning statements contradict on '{positive}' / '{negative}'"
                                ),
                            )
                            .with_evidence(window[0].clone())
                            .with_evidence(window[1].clone()),
                        );
                    }
                }
            }
        }
        Ok(issues)
    }
}
