//! Plan, step, and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Opaque identifier for a stored plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(Uuid);

impl PlanId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Classification of a plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    /// Understand the request
    Analysis,
    /// Invoke one or more tools
    ToolCall,
    /// Check preconditions or results
    Verification,
    /// Choose between alternatives
    Decision,
    /// Combine prior outputs into the final answer
    Synthesis,
}

/// Complexity tier of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Aggregate risk level of a plan or decision option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A single step in a plan.
///
/// Dependencies must reference steps declared before or alongside this one in
/// the same plan, and the resulting graph must be acyclic; both invariants
/// are enforced by [`PlanEngine::validate_plan`](crate::plan::PlanEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Unique step identifier
    pub id: Uuid,

    /// Step classification
    pub category: StepCategory,

    /// Short title
    pub title: String,

    /// Free-text description of the work
    pub description: String,

    /// Ids of steps that must complete successfully first
    pub depends_on: Vec<Uuid>,

    /// Names of tools this step requires
    pub required_tools: Vec<String>,

    /// Complexity tier
    pub complexity: Complexity,

    /// Substrings the step output must contain to pass validation
    pub validation_criteria: Vec<String>,

    /// Advisory fallback description; execution continues past a failure
    /// only when this is present
    pub fallback: Option<String>,
}

impl PlanStep {
    /// Create a step with defaults (medium complexity, no dependencies)
    pub fn new(category: StepCategory, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            title: title.into(),
            description: String::new(),
            depends_on: Vec::new(),
            required_tools: Vec::new(),
            complexity: Complexity::Medium,
            validation_criteria: Vec::new(),
            fallback: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a dependency on another step
    pub fn depends_on(mut self, step_id: Uuid) -> Self {
        self.depends_on.push(step_id);
        self
    }

    /// Set required tool names
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.required_tools = tools;
        self
    }

    /// Set the complexity tier
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Add a validation criterion substring
    pub fn with_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.validation_criteria.push(criterion.into());
        self
    }

    /// Set an advisory fallback description
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

/// A dependency-ordered decomposition of a goal.
///
/// The goal and tool snapshot are immutable after creation; steps are
/// consumed by execution but never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier
    pub id: PlanId,

    /// The goal this plan decomposes
    pub goal: String,

    /// Ordered steps; analysis first, synthesis last
    pub steps: Vec<PlanStep>,

    /// Aggregate risk derived from step complexity
    pub risk: RiskLevel,

    /// Weighted duration estimate in abstract units
    pub estimated_duration: u64,

    /// Tool names registered when the plan was built
    pub tool_snapshot: Vec<String>,

    /// When the plan was created
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Look up a step by id
    pub fn step(&self, id: Uuid) -> Option<&PlanStep> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// Number of high-complexity steps
    pub fn high_complexity_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.complexity == Complexity::High)
            .count()
    }

    /// All step ids, in declaration order
    pub fn step_ids(&self) -> Vec<Uuid> {
        self.steps.iter().map(|step| step.id).collect()
    }

    /// Union of all required tool names
    pub fn required_tools(&self) -> HashSet<&str> {
        self.steps
            .iter()
            .flat_map(|step| step.required_tools.iter().map(String::as_str))
            .collect()
    }
}

/// Outcome of executing one plan step.
///
/// At most one result is produced per step per execution pass. Steps whose
/// dependencies did not all succeed receive a synthesized failure without
/// their body ever running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// The step this result belongs to
    pub step_id: Uuid,

    /// Whether the step body completed successfully
    pub success: bool,

    /// Free-text output of the step
    pub output: String,

    /// Tools actually invoked by the step body
    pub tools_invoked: Vec<String>,

    /// Whether the output satisfied the step's validation criteria
    pub validation_passed: bool,

    /// Wall-clock time spent, in milliseconds
    pub elapsed_ms: u64,

    /// Confidence in the result, in [0, 1]
    pub confidence: f32,

    /// Non-fatal findings
    pub warnings: Vec<String>,

    /// Failure details
    pub errors: Vec<String>,
}

impl StepResult {
    /// Synthesize a failure for a step whose dependencies were not met
    pub fn dependency_failure(step_id: Uuid, missing: &[Uuid]) -> Self {
        let missing_list = missing
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            step_id,
            success: false,
            output: String::new(),
            tools_invoked: Vec::new(),
            validation_passed: false,
            elapsed_ms: 0,
            confidence: 0.0,
            warnings: Vec::new(),
            errors: vec![format!("unmet dependencies: {missing_list}")],
        }
    }

    /// Synthesize a failure for a step body that returned an error
    pub fn body_failure(step_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            step_id,
            success: false,
            output: String::new(),
            tools_invoked: Vec::new(),
            validation_passed: false,
            elapsed_ms: 0,
            confidence: 0.0,
            warnings: Vec::new(),
            errors: vec![error.into()],
        }
    }
}

/// Result of validating a plan's structure against the current tool set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanReport {
    /// True when no errors were found; warnings leave the plan usable
    pub is_valid: bool,

    /// Structural or availability defects
    pub errors: Vec<String>,

    /// Non-fatal findings
    pub warnings: Vec<String>,

    /// Advice for improving the plan
    pub suggestions: Vec<String>,
}
