//! Configuration types for the deliberation engine

use serde::{Deserialize, Serialize};

use crate::scoring::{
    ConfidenceWeights, DurationWeights, FeasibilityWeights, SeverityWeights, StepResultWeights,
};

/// Main configuration for the deliberation engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Plan engine configuration
    pub plan: PlanConfig,

    /// Reasoning engine configuration
    pub reasoning: ReasoningConfig,

    /// Response validator configuration
    pub validator: ValidatorConfig,
}

/// Configuration for plan construction and execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Duration estimate per complexity tier
    pub duration: DurationWeights,

    /// Result confidence weighting
    pub step_result: StepResultWeights,

    /// More high-complexity steps than this makes the whole plan high risk
    pub high_risk_step_threshold: usize,

    /// More high-complexity steps than this draws a validation warning
    pub high_complexity_warning_threshold: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            duration: DurationWeights::default(),
            step_result: StepResultWeights::default(),
            high_risk_step_threshold: 2,
            high_complexity_warning_threshold: 3,
        }
    }
}

/// Configuration for reasoning chains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Confidence of the seed observation step
    pub seed_confidence: f32,

    /// Step confidence weighting
    pub confidence: ConfidenceWeights,

    /// Decision option feasibility weighting
    pub feasibility: FeasibilityWeights,

    /// Token-set Jaccard similarity above which two steps count as circular
    pub circular_similarity_threshold: f32,

    /// More assumptions than this draws a medium-severity issue
    pub max_assumptions: usize,

    /// Chains shorter than this draw a medium-severity issue
    pub min_chain_steps: usize,

    /// Chain confidence penalty per rejected step
    pub rejected_step_penalty: f32,

    /// Constraint substrings that must not appear in step content
    pub forbidden_constraints: Vec<String>,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            seed_confidence: 0.9,
            confidence: ConfidenceWeights::default(),
            feasibility: FeasibilityWeights::default(),
            circular_similarity_threshold: 0.8,
            max_assumptions: 3,
            min_chain_steps: 3,
            rejected_step_penalty: 0.1,
            forbidden_constraints: Vec::new(),
        }
    }
}

/// Configuration for response validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Severity weighting and score bonuses
    pub severity: SeverityWeights,

    /// Minimum score required for the execution gate
    pub execution_threshold: f32,

    /// Shell substrings that are never allowed in content or parameters
    pub dangerous_patterns: Vec<String>,

    /// Path prefixes that write-capable tools may not touch
    pub protected_paths: Vec<String>,

    /// Opposite-polarity phrase pairs for contradiction detection
    pub contradiction_pairs: Vec<(String, String)>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            severity: SeverityWeights::default(),
            execution_threshold: 0.6,
            dangerous_patterns: vec![
                "rm -rf /".to_string(),
                "mkfs".to_string(),
                "dd if=".to_string(),
                ":(){ :|:& };:".to_string(),
                "> /dev/sd".to_string(),
                "chmod -r 777 /".to_string(),
            ],
            protected_paths: vec![
                "/etc".to_string(),
                "/boot".to_string(),
                "/sys".to_string(),
                "/proc".to_string(),
                "/dev".to_string(),
            ],
            contradiction_pairs: vec![
                ("exists".to_string(), "does not exist".to_string()),
                ("is available".to_string(), "is not available".to_string()),
                ("succeeded".to_string(), "failed".to_string()),
                ("is possible".to_string(), "is impossible".to_string()),
                ("is running".to_string(), "is not running".to_string()),
            ],
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.plan.validate()?;
        self.reasoning.validate()?;
        self.validator.validate()?;
        Ok(())
    }
}

impl PlanConfig {
    fn validate(&self) -> Result<(), String> {
        if self.duration.low == 0 || self.duration.medium == 0 || self.duration.high == 0 {
            return Err("duration estimates must be greater than 0".to_string());
        }
        if self.high_complexity_warning_threshold == 0 {
            return Err("high_complexity_warning_threshold must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl ReasoningConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.seed_confidence) {
            return Err("seed_confidence must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.circular_similarity_threshold) {
            return Err("circular_similarity_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.min_chain_steps == 0 {
            return Err("min_chain_steps must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl ValidatorConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.execution_threshold) {
            return Err("execution_threshold must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.severity.confidence_bonus_threshold) {
            return Err("confidence_bonus_threshold must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}
