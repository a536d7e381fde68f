//! Reasoning chain, step, and context types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier for a stored reasoning chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(Uuid);

impl ChainId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of contribution a reasoning step makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A grounded observation about the situation
    Observation,
    /// A proposed explanation or approach
    Hypothesis,
    /// A check of a hypothesis against evidence
    Verification,
    /// A choice between alternatives
    Decision,
    /// A concrete act, typically a tool invocation
    Action,
    /// A final answer or summary judgment
    Conclusion,
}

/// Validation status of a reasoning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet validated
    Pending,
    /// Passed step validation
    Validated,
    /// Failed step validation; kept in the chain for the audit trail
    Rejected,
}

/// Lifecycle status of a reasoning chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    /// Accepting new steps
    Active,
    /// Suspended; rejects new steps until resumed
    Paused,
    /// Finished successfully
    Completed,
    /// Abandoned
    Failed,
}

/// One step in a reasoning chain.
///
/// Rejected steps stay in the chain with their rejection reasons appended to
/// `evidence`, so the full deliberation remains auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// Unique step identifier
    pub id: Uuid,

    /// Kind of contribution
    pub kind: StepKind,

    /// The reasoning text itself
    pub content: String,

    /// Scored confidence in [0, 1]
    pub confidence: f32,

    /// Supporting evidence statements
    pub evidence: Vec<String>,

    /// Unverified assumptions the step leans on
    pub assumptions: Vec<String>,

    /// Alternatives that were considered and set aside
    pub alternatives: Vec<String>,

    /// Validation outcome
    pub status: StepStatus,

    /// When the step was added
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied context a chain reasons within
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainContext {
    /// Tool names the reasoner may refer to in action steps
    pub available_tools: Vec<String>,

    /// Free-text constraints the reasoning must respect
    pub constraints: Vec<String>,

    /// Optional cap on chain length
    pub max_steps: Option<u32>,

    /// Optional deliberation budget in milliseconds
    pub timeout_ms: Option<u64>,
}

/// A confidence-scored sequence of reasoning steps working toward a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningChain {
    /// Chain identifier
    pub id: ChainId,

    /// The goal being reasoned about
    pub goal: String,

    /// Steps in the order they were added
    pub steps: Vec<ReasoningStep>,

    /// Index one past the most recently added step
    pub current_step: usize,

    /// Aggregate confidence in [0, 1]
    pub confidence: f32,

    /// Lifecycle status
    pub status: ChainStatus,

    /// Context the chain reasons within
    pub context: ChainContext,

    /// When the chain was started
    pub created_at: DateTime<Utc>,
}

impl ReasoningChain {
    /// Create an empty active chain
    pub fn new(goal: impl Into<String>, context: ChainContext) -> Self {
        Self {
            id: ChainId::new(),
            goal: goal.into(),
            steps: Vec::new(),
            current_step: 0,
            confidence: 0.0,
            status: ChainStatus::Active,
            context,
            created_at: Utc::now(),
        }
    }

    /// The most recently added step
    pub fn last_step(&self) -> Option<&ReasoningStep> {
        self.steps.last()
    }

    /// Number of validated steps
    pub fn validated_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Validated)
            .count()
    }

    /// Number of rejected steps
    pub fn rejected_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Rejected)
            .count()
    }

    /// Whether the chain contains a conclusion step
    pub fn has_conclusion(&self) -> bool {
        self.steps.iter().any(|step| step.kind == StepKind::Conclusion)
    }

    /// Recompute aggregate confidence: mean confidence of validated steps
    /// minus a penalty per rejected step, floored at zero.
    pub fn recompute_confidence(&mut self, rejected_step_penalty: f32) {
        let validated: Vec<f32> = self
            .steps
            .iter()
            .filter(|step| step.status == StepStatus::Validated)
            .map(|step| step.confidence)
            .collect();

        let mean = if validated.is_empty() {
            0.0
        } else {
            validated.iter().sum::<f32>() / validated.len() as f32
        };

        let penalty = self.rejected_count() as f32 * rejected_step_penalty;
        self.confidence = (mean - penalty).max(0.0);
    }
}
