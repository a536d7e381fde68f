//! Validation issue, response, and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::ToolDescriptor;

/// How serious a validation finding is.
///
/// Ordering is ascending, so `Critical` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Cosmetic or advisory
    Low,
    /// Worth fixing, does not block
    Medium,
    /// Makes the finding invalid
    High,
    /// Must never reach execution
    Critical,
}

/// What kind of problem a validation finding describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A known tool is registered but currently unusable
    ToolUnavailable,
    /// A tool call names a tool that does not exist in the context
    HallucinatedTool,
    /// A tool call is missing an argument payload
    MissingParameter,
    /// Content or parameters match a dangerous pattern or protected path
    UnsafeOperation,
    /// Tool calls proposed without any stated reasoning
    MissingReasoning,
    /// Self-reported confidence below the caller's floor
    LowConfidence,
    /// Content matches a caller-forbidden operation
    ForbiddenOperation,
    /// Adjacent reasoning statements assert opposite polarities
    Contradiction,
    /// Reasoning repeats itself
    CircularReasoning,
    /// Conclusion without supporting evidence
    MissingEvidence,
    /// Too many unverified assumptions
    ExcessiveAssumptions,
    /// Step ordering that undermines the chain's logic
    InconsistentLogic,
    /// Content violates a stated constraint
    ConstraintViolation,
    /// Chain ended before reaching a usable length
    ChainTooShort,
    /// Chain never reached a conclusion
    MissingConclusion,
    /// A validation rule itself failed to run
    RuleFailure,
}

/// One validation finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Kind of problem
    pub kind: IssueKind,

    /// How serious it is
    pub severity: IssueSeverity,

    /// Human-readable description
    pub message: String,

    /// Where the problem is, e.g. a tool call name
    pub location: Option<String>,

    /// How to fix it, when a fix is known
    pub suggested_fix: Option<String>,

    /// Supporting details
    pub evidence: Vec<String>,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            location: None,
            suggested_fix: None,
            evidence: Vec::new(),
        }
    }

    /// Attach a location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attach a suggested fix
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// Attach a supporting detail
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }
}

/// A proposed tool invocation inside a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,

    /// Argument payload
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// A candidate response awaiting validation before anything executes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The response text
    pub content: String,

    /// Proposed tool invocations
    pub tool_calls: Vec<ToolCall>,

    /// Reasoning statements backing the response
    pub reasoning: Vec<String>,

    /// Self-reported confidence in [0, 1], when provided
    pub confidence: Option<f32>,

    /// When the response was produced
    pub created_at: DateTime<Utc>,
}

impl AgentResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            reasoning: Vec::new(),
            confidence: None,
            created_at: Utc::now(),
        }
    }

    /// Add a proposed tool call
    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }

    /// Add a reasoning statement
    pub fn with_reasoning(mut self, statement: impl Into<String>) -> Self {
        self.reasoning.push(statement.into());
        self
    }

    /// Set self-reported confidence
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// What the validator knows about the world when checking a response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationContext {
    /// Tools the response is allowed to call
    pub available_tools: Vec<ToolDescriptor>,
}

impl ValidationContext {
    pub fn new(available_tools: Vec<ToolDescriptor>) -> Self {
        Self { available_tools }
    }

    /// Names of the available tools
    pub fn available_names(&self) -> Vec<&str> {
        self.available_tools
            .iter()
            .map(|tool| tool.name.as_str())
            .collect()
    }

    /// Look up a tool descriptor by name
    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.available_tools.iter().find(|tool| tool.name == name)
    }
}

/// Caller-supplied validation policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConstraints {
    /// Run the dangerous-pattern and protected-path checks
    pub enable_safety_checks: bool,

    /// Operation substrings the caller forbids outright
    pub forbidden_operations: Vec<String>,

    /// Reject responses whose self-reported confidence is below this
    pub min_confidence: Option<f32>,

    /// Require reasoning statements on every response
    pub require_reasoning: bool,
}

impl Default for ValidationConstraints {
    fn default() -> Self {
        Self {
            enable_safety_checks: true,
            forbidden_operations: Vec::new(),
            min_confidence: None,
            require_reasoning: false,
        }
    }
}

/// Outcome of validating one response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// No critical or high severity issues were found
    pub is_valid: bool,

    /// Aggregate score in [0, 1]
    pub score: f32,

    /// Everything the rules found
    pub issues: Vec<ValidationIssue>,

    /// Deduplicated suggested fixes
    pub suggestions: Vec<String>,

    /// A corrected response with offending tool calls removed, when one
    /// could be built
    pub corrected: Option<AgentResponse>,

    /// Whether the response may proceed to execution
    pub allow_execution: bool,
}
