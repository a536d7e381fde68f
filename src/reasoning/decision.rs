//! Decision points: feasibility-scored choices inside a reasoning chain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::RiskLevel;
use crate::scoring::FeasibilityWeights;

/// One candidate answer to a decision question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Caller-chosen identifier, unique within the decision point
    pub id: String,

    /// What picking this option means
    pub description: String,

    /// Arguments for the option
    pub pros: Vec<String>,

    /// Arguments against it
    pub cons: Vec<String>,

    /// Risk of taking this path
    pub risk: RiskLevel,

    /// Tools the option needs to be executable
    pub required_tools: Vec<String>,

    /// Scored feasibility in [0, 1]; assigned when the decision point is built
    pub feasibility: f32,
}

impl DecisionOption {
    /// Create an option with medium risk and no arguments either way
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            pros: Vec::new(),
            cons: Vec::new(),
            risk: RiskLevel::Medium,
            required_tools: Vec::new(),
            feasibility: 0.0,
        }
    }

    /// Add an argument for the option
    pub fn with_pro(mut self, pro: impl Into<String>) -> Self {
        self.pros.push(pro.into());
        self
    }

    /// Add an argument against the option
    pub fn with_con(mut self, con: impl Into<String>) -> Self {
        self.cons.push(con.into());
        self
    }

    /// Set the risk level
    pub fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.risk = risk;
        self
    }

    /// Set the tools this option needs
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.required_tools = tools;
        self
    }
}

/// A question with feasibility-ranked options.
///
/// Options are sorted by descending feasibility at construction, so the first
/// option is always the default recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPoint {
    /// Decision identifier
    pub id: Uuid,

    /// The question being decided
    pub question: String,

    /// Candidate options, best first
    pub options: Vec<DecisionOption>,

    /// Id of the chosen option, once decided
    pub chosen: Option<String>,

    /// Why the choice was made
    pub rationale: Option<String>,

    /// Feasibility of the top option at construction time
    pub confidence: f32,

    /// When the decision point was created
    pub created_at: DateTime<Utc>,
}

impl DecisionPoint {
    /// Score each option against the available tools and rank them
    pub fn new(
        question: impl Into<String>,
        mut options: Vec<DecisionOption>,
        available_tools: &[String],
        weights: &FeasibilityWeights,
    ) -> Self {
        for option in &mut options {
            let all_available = option
                .required_tools
                .iter()
                .all(|tool| available_tools.contains(tool));
            option.feasibility = weights.feasibility(
                all_available,
                option.risk,
                option.pros.len(),
                option.cons.len(),
            );
        }
        options.sort_by(|a, b| {
            b.feasibility
                .partial_cmp(&a.feasibility)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let confidence = options.first().map(|o| o.feasibility).unwrap_or(0.0);

        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            options,
            chosen: None,
            rationale: None,
            confidence,
            created_at: Utc::now(),
        }
    }

    /// The highest-feasibility option
    pub fn recommended(&self) -> Option<&DecisionOption> {
        self.options.first()
    }

    /// Record the recommended option as chosen, with an optional rationale
    /// override replacing the default explanation.
    pub fn decide(&mut self, rationale: Option<String>) -> Option<&DecisionOption> {
        let top = self.options.first()?;
        self.chosen = Some(top.id.clone());
        self.rationale = Some(rationale.unwrap_or_else(|| {
            format!(
                "'{}' ranked highest with feasibility {:.2}",
                top.id, top.feasibility
            )
        }));
        self.options.first()
    }
}
