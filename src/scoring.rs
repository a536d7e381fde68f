//! Named scoring policies for confidence, feasibility, and severity weighting
//!
//! Every additive constant used by the engines lives here so the weights are
//! a reviewable contract rather than inline arithmetic. The defaults are the
//! compatibility-critical values; callers may tune them through
//! [`EngineConfig`](crate::config::EngineConfig).

use serde::{Deserialize, Serialize};

use crate::plan::{Complexity, RiskLevel};
use crate::reasoning::StepKind;
use crate::validator::IssueSeverity;

/// Weight table for reasoning-step confidence.
///
/// | component            | default |
/// |----------------------|---------|
/// | base                 | 0.5     |
/// | per evidence item    | +0.1 (cap +0.3) |
/// | per assumption       | -0.05 (cap -0.2) |
/// | observation bonus    | +0.1    |
/// | verification bonus   | +0.2    |
/// | conclusion bonus     | +0.1    |
/// | valid transition     | +0.1    |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub base: f32,
    pub evidence_unit: f32,
    pub evidence_cap: f32,
    pub assumption_unit: f32,
    pub assumption_cap: f32,
    pub observation_bonus: f32,
    pub verification_bonus: f32,
    pub conclusion_bonus: f32,
    pub transition_bonus: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            evidence_unit: 0.1,
            evidence_cap: 0.3,
            assumption_unit: 0.05,
            assumption_cap: 0.2,
            observation_bonus: 0.1,
            verification_bonus: 0.2,
            conclusion_bonus: 0.1,
            transition_bonus: 0.1,
        }
    }
}

impl ConfidenceWeights {
    /// Confidence for a step of `kind` following `previous`, clamped to [0, 1].
    pub fn step_confidence(
        &self,
        kind: StepKind,
        previous: Option<StepKind>,
        evidence_count: usize,
        assumption_count: usize,
    ) -> f32 {
        let mut confidence = self.base;

        confidence += (evidence_count as f32 * self.evidence_unit).min(self.evidence_cap);
        confidence -= (assumption_count as f32 * self.assumption_unit).min(self.assumption_cap);
        confidence += self.kind_bonus(kind);

        if let Some(previous) = previous {
            if Self::is_valid_transition(previous, kind) {
                confidence += self.transition_bonus;
            }
        }

        confidence.clamp(0.0, 1.0)
    }

    /// Fixed per-kind bonus
    pub fn kind_bonus(&self, kind: StepKind) -> f32 {
        match kind {
            StepKind::Observation => self.observation_bonus,
            StepKind::Verification => self.verification_bonus,
            StepKind::Conclusion => self.conclusion_bonus,
            StepKind::Hypothesis | StepKind::Decision | StepKind::Action => 0.0,
        }
    }

    /// The recognized step-kind transitions that earn the transition bonus
    pub fn is_valid_transition(from: StepKind, to: StepKind) -> bool {
        matches!(
            (from, to),
            (StepKind::Observation, StepKind::Hypothesis)
                | (StepKind::Hypothesis, StepKind::Verification)
                | (StepKind::Verification, StepKind::Conclusion)
        )
    }
}

/// Weight table for decision-option feasibility.
///
/// | component                  | default |
/// |----------------------------|---------|
/// | base                       | 0.5     |
/// | all required tools present | +0.3    |
/// | some tool missing          | -0.2    |
/// | low risk                   | +0.2    |
/// | high risk                  | -0.1    |
/// | pros outnumber cons        | +0.1    |
/// | cons outnumber pros        | -0.1    |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityWeights {
    pub base: f32,
    pub tools_available_bonus: f32,
    pub tools_missing_penalty: f32,
    pub low_risk_bonus: f32,
    pub high_risk_penalty: f32,
    pub pros_bonus: f32,
    pub cons_penalty: f32,
}

impl Default for FeasibilityWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            tools_available_bonus: 0.3,
            tools_missing_penalty: 0.2,
            low_risk_bonus: 0.2,
            high_risk_penalty: 0.1,
            pros_bonus: 0.1,
            cons_penalty: 0.1,
        }
    }
}

impl FeasibilityWeights {
    /// Feasibility score for an option, clamped to [0, 1]
    pub fn feasibility(
        &self,
        all_tools_available: bool,
        risk: RiskLevel,
        pros: usize,
        cons: usize,
    ) -> f32 {
        let mut score = self.base;

        if all_tools_available {
            score += self.tools_available_bonus;
        } else {
            score -= self.tools_missing_penalty;
        }

        score += match risk {
            RiskLevel::Low => self.low_risk_bonus,
            RiskLevel::Medium => 0.0,
            RiskLevel::High => -self.high_risk_penalty,
        };

        if pros > cons {
            score += self.pros_bonus;
        } else if cons > pros {
            score -= self.cons_penalty;
        }

        score.clamp(0.0, 1.0)
    }
}

/// Per-severity score penalties and response bonuses.
///
/// The execution gate compares the resulting score against
/// [`ValidatorConfig::execution_threshold`](crate::config::ValidatorConfig);
/// both the 0.6 cutoff and these four weights are compatibility-critical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub critical: f32,
    pub high: f32,
    pub medium: f32,
    pub low: f32,
    /// Bonus when the response carries reasoning steps
    pub reasoning_bonus: f32,
    /// Bonus when self-reported confidence exceeds the bonus threshold
    pub confidence_bonus: f32,
    /// Self-reported confidence needed to earn the bonus
    pub confidence_bonus_threshold: f32,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            critical: 0.4,
            high: 0.2,
            medium: 0.1,
            low: 0.05,
            reasoning_bonus: 0.1,
            confidence_bonus: 0.05,
            confidence_bonus_threshold: 0.8,
        }
    }
}

impl SeverityWeights {
    /// Score penalty for one issue of the given severity
    pub fn penalty(&self, severity: IssueSeverity) -> f32 {
        match severity {
            IssueSeverity::Critical => self.critical,
            IssueSeverity::High => self.high,
            IssueSeverity::Medium => self.medium,
            IssueSeverity::Low => self.low,
        }
    }
}

/// Weight table for executed-step result confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResultWeights {
    pub base: f32,
    /// Added when output satisfied the validation criteria
    pub validation_bonus: f32,
    /// Subtracted when it did not
    pub validation_penalty: f32,
    /// Added when the output exceeds the substantive-output length
    pub long_output_bonus: f32,
    /// Output length (chars) considered substantive
    pub long_output_len: usize,
    pub low_complexity_bonus: f32,
    pub high_complexity_penalty: f32,
}

impl Default for StepResultWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            validation_bonus: 0.3,
            validation_penalty: 0.2,
            long_output_bonus: 0.1,
            long_output_len: 100,
            low_complexity_bonus: 0.1,
            high_complexity_penalty: 0.1,
        }
    }
}

impl StepResultWeights {
    /// Confidence for a completed step result, clamped to [0, 1]
    pub fn result_confidence(
        &self,
        validation_passed: bool,
        output_len: usize,
        complexity: Complexity,
    ) -> f32 {
        let mut confidence = self.base;

        if validation_passed {
            confidence += self.validation_bonus;
        } else {
            confidence -= self.validation_penalty;
        }

        if output_len > self.long_output_len {
            confidence += self.long_output_bonus;
        }

        confidence += match complexity {
            Complexity::Low => self.low_complexity_bonus,
            Complexity::Medium => 0.0,
            Complexity::High => -self.high_complexity_penalty,
        };

        confidence.clamp(0.0, 1.0)
    }
}

/// Duration estimate per complexity tier, in abstract fixed units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationWeights {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl Default for DurationWeights {
    fn default() -> Self {
        Self { low: 30, medium: 120, high: 300 }
    }
}

impl DurationWeights {
    /// Duration estimate for one step of the given complexity
    pub fn estimate(&self, complexity: Complexity) -> u64 {
        match complexity {
            Complexity::Low => self.low,
            Complexity::Medium => self.medium,
            Complexity::High => self.high,
        }
    }
}
