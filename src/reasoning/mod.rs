//! Reasoning engine: confidence-scored step chains with validation and decisions

mod decision;
mod types;
mod validation;

pub use decision::{DecisionOption, DecisionPoint};
pub use types::{
    ChainContext, ChainId, ChainStatus, ReasoningChain, ReasoningStep, StepKind, StepStatus,
};
pub use validation::{jaccard_similarity, StepValidator};

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ReasoningConfig;
use crate::error::{EngineError, Result};
use crate::store::ChainStore;
use crate::tools::ToolRegistry;
use crate::validator::ValidationIssue;

/// Builds and maintains reasoning chains.
///
/// Every candidate step passes through [`StepValidator`] before it lands;
/// rejected steps are kept in the chain with their rejection reasons so the
/// deliberation stays auditable.
pub struct ReasoningEngine {
    config: ReasoningConfig,
    registry: Arc<dyn ToolRegistry>,
    store: Arc<dyn ChainStore>,
    validator: StepValidator,
}

impl ReasoningEngine {
    pub fn new(
        config: ReasoningConfig,
        registry: Arc<dyn ToolRegistry>,
        store: Arc<dyn ChainStore>,
    ) -> Self {
        let validator = StepValidator::new(config.clone());
        Self {
            config,
            registry,
            store,
            validator,
        }
    }

    /// Start a chain seeded with a high-confidence observation of the goal.
    ///
    /// When the context names no tools, the currently registered tool names
    /// are snapshotted in so action steps can be checked against something.
    pub async fn start_reasoning(&self, goal: &str, mut context: ChainContext) -> Result<ReasoningChain> {
        if context.available_tools.is_empty() {
            context.available_tools = self
                .registry
                .list_tools()
                .await
                .into_iter()
                .map(|tool| tool.name)
                .collect();
        }

        let mut chain = ReasoningChain::new(goal, context);
        let seed = ReasoningStep {
            id: Uuid::new_v4(),
            kind: StepKind::Observation,
            content: format!("Starting to reason about: {goal}"),
            confidence: self.config.seed_confidence,
            evidence: vec![format!("goal stated by caller: {goal}")],
            assumptions: Vec::new(),
            alternatives: Vec::new(),
            status: StepStatus::Validated,
            created_at: Utc::now(),
        };
        chain.steps.push(seed);
        chain.current_step = chain.steps.len();
        chain.recompute_confidence(self.config.rejected_step_penalty);

        tracing::info!(chain_id = %chain.id, %goal, "Reasoning chain started");
        self.store.insert(chain.clone());
        Ok(chain)
    }

    /// Score, validate, and append a step to an active chain.
    ///
    /// A step that fails validation is still appended, marked rejected, with
    /// the rejection reasons added to its evidence; it contributes nothing to
    /// chain confidence except the rejection penalty.
    pub async fn add_reasoning_step(
        &self,
        chain_id: &ChainId,
        kind: StepKind,
        content: impl Into<String>,
        evidence: Vec<String>,
        assumptions: Vec<String>,
        alternatives: Vec<String>,
    ) -> Result<ReasoningStep> {
        let mut chain = self.get_chain(chain_id)?;
        if chain.status != ChainStatus::Active {
            return Err(EngineError::structure(format!(
                "chain {chain_id} is {:?}, not active",
                chain.status
            )));
        }
        if let Some(max_steps) = chain.context.max_steps {
            if chain.steps.len() as u32 >= max_steps {
                return Err(EngineError::structure(format!(
                    "chain {chain_id} reached its step limit of {max_steps}"
                )));
            }
        }

        let previous_kind = chain.last_step().map(|step| step.kind);
        let confidence = self.config.confidence.step_confidence(
            kind,
            previous_kind,
            evidence.len(),
            assumptions.len(),
        );

        let mut step = ReasoningStep {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            confidence,
            evidence,
            assumptions,
            alternatives,
            status: StepStatus::Pending,
            created_at: Utc::now(),
        };

        let issues = self.validator.validate_step(&chain, &step);
        if StepValidator::is_step_valid(&issues) {
            step.status = StepStatus::Validated;
            tracing::debug!(chain_id = %chain_id, ?kind, confidence, "Step validated");
        } else {
            step.status = StepStatus::Rejected;
            for issue in &issues {
                step.evidence.push(format!("rejected: {}", issue.message));
            }
            tracing::warn!(chain_id = %chain_id, ?kind, issues = issues.len(), "Step rejected");
        }

        chain.steps.push(step.clone());
        chain.current_step = chain.steps.len();
        chain.recompute_confidence(self.config.rejected_step_penalty);
        self.store.insert(chain);

        Ok(step)
    }

    /// Build a decision point whose options are feasibility-ranked against
    /// the chain's available tools.
    pub fn create_decision_point(
        &self,
        chain_id: &ChainId,
        question: impl Into<String>,
        options: Vec<DecisionOption>,
    ) -> Result<DecisionPoint> {
        if options.is_empty() {
            return Err(EngineError::decision("a decision point needs at least one option"));
        }
        let chain = self.get_chain(chain_id)?;
        Ok(DecisionPoint::new(
            question,
            options,
            &chain.context.available_tools,
            &self.config.feasibility,
        ))
    }

    /// Commit the recommended option and record the choice as a conclusion
    /// step on the chain. The rationale, when given, replaces the generated
    /// explanation but never changes which option wins.
    pub async fn make_decision(
        &self,
        chain_id: &ChainId,
        mut decision: DecisionPoint,
        rationale: Option<String>,
    ) -> Result<DecisionPoint> {
        let chosen = decision
            .decide(rationale)
            .map(|option| (option.id.clone(), option.description.clone()))
            .ok_or_else(|| EngineError::decision("cannot decide with no options"))?;

        let rationale_text = decision
            .rationale
            .clone()
            .unwrap_or_else(|| "recommended option selected".to_string());
        self.add_reasoning_step(
            chain_id,
            StepKind::Conclusion,
            format!("Decided '{}' for: {}", chosen.0, decision.question),
            vec![
                format!("option '{}': {}", chosen.0, chosen.1),
                rationale_text,
            ],
            Vec::new(),
            Vec::new(),
        )
        .await?;

        tracing::info!(chain_id = %chain_id, option = %chosen.0, "Decision recorded");
        Ok(decision)
    }

    /// Re-validate every step in order plus whole-chain checks
    pub fn validate_chain(&self, chain_id: &ChainId) -> Result<Vec<ValidationIssue>> {
        let chain = self.get_chain(chain_id)?;
        let mut issues = Vec::new();

        let mut prefix = chain.clone();
        prefix.steps.clear();
        for step in &chain.steps {
            issues.extend(self.validator.validate_step(&prefix, step));
            prefix.steps.push(step.clone());
        }

        issues.extend(self.validator.validate_chain_level(&chain));
        Ok(issues)
    }

    /// Mark a chain completed and return its final state
    pub fn complete_reasoning(&self, chain_id: &ChainId) -> Result<ReasoningChain> {
        let mut chain = self.get_chain(chain_id)?;
        chain.status = ChainStatus::Completed;
        self.store.insert(chain.clone());
        tracing::info!(chain_id = %chain_id, confidence = chain.confidence, steps = chain.steps.len(), "Reasoning completed");
        Ok(chain)
    }

    /// Suspend an active chain
    pub fn pause_reasoning(&self, chain_id: &ChainId) -> Result<()> {
        let mut chain = self.get_chain(chain_id)?;
        if chain.status != ChainStatus::Active {
            return Err(EngineError::structure(format!(
                "only active chains can be paused; chain {chain_id} is {:?}",
                chain.status
            )));
        }
        chain.status = ChainStatus::Paused;
        self.store.insert(chain);
        Ok(())
    }

    /// Resume a paused chain
    pub fn resume_reasoning(&self, chain_id: &ChainId) -> Result<()> {
        let mut chain = self.get_chain(chain_id)?;
        if chain.status != ChainStatus::Paused {
            return Err(EngineError::structure(format!(
                "only paused chains can be resumed; chain {chain_id} is {:?}",
                chain.status
            )));
        }
        chain.status = ChainStatus::Active;
        self.store.insert(chain);
        Ok(())
    }

    /// Fetch a chain by id
    pub fn get_chain(&self, chain_id: &ChainId) -> Result<ReasoningChain> {
        self.store
            .get(chain_id)
            .ok_or_else(|| EngineError::chain_not_found(chain_id))
    }

    /// Remove a chain, returning its final state
    pub fn delete_chain(&self, chain_id: &ChainId) -> Result<ReasoningChain> {
        self.store
            .remove(chain_id)
            .ok_or_else(|| EngineError::chain_not_found(chain_id))
    }

    /// Ids of all stored chains
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.store.ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::RiskLevel;
    use crate::store::MemoryChainStore;
    use crate::tools::{StaticToolRegistry, ToolDescriptor};
    use crate::validator::IssueKind;

    fn engine_with_tools(names: &[&str]) -> ReasoningEngine {
        let registry = Arc::new(StaticToolRegistry::with_tools(
            names.iter().map(|n| ToolDescriptor::new(*n)),
        ));
        ReasoningEngine::new(
            ReasoningConfig::default(),
            registry,
            Arc::new(MemoryChainStore::new()),
        )
    }

    #[tokio::test]
    async fn test_chain_starts_with_seed_observation() {
        let engine = engine_with_tools(&["file_read"]);
        let chain = engine
            .start_reasoning("why is the build slow", ChainContext::default())
            .await
            .unwrap();

        assert_eq!(chain.steps.len(), 1);
        assert_eq!(chain.steps[0].kind, StepKind::Observation);
        assert_eq!(chain.steps[0].status, StepStatus::Validated);
        assert!((chain.steps[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(chain.status, ChainStatus::Active);
        // Empty context picked up the registered tools.
        assert_eq!(chain.context.available_tools, vec!["file_read".to_string()]);
    }

    #[tokio::test]
    async fn test_step_lifecycle_and_confidence() {
        let engine = engine_with_tools(&[]);
        let chain = engine
            .start_reasoning("diagnose the flaky test", ChainContext::default())
            .await
            .unwrap();

        let step = engine
            .add_reasoning_step(
                &chain.id,
                StepKind::Hypothesis,
                "the test depends on wall-clock ordering",
                vec!["failure only reproduces under load".to_string()],
                vec!["scheduler behavior is the only variable".to_string()],
                Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(step.status, StepStatus::Validated);
        // base 0.5 + evidence 0.1 - assumption 0.05 + transition 0.1
        assert!((step.confidence - 0.65).abs() < 1e-6);

        let updated = engine.get_chain(&chain.id).unwrap();
        assert_eq!(updated.steps.len(), 2);
        assert!(updated.confidence > 0.0);
    }

    #[tokio::test]
    async fn test_rejected_step_is_kept_with_reasons() {
        let engine = engine_with_tools(&[]);
        let chain = engine
            .start_reasoning("finish the report", ChainContext::default())
            .await
            .unwrap();

        let step = engine
            .add_reasoning_step(
                &chain.id,
                StepKind::Conclusion,
                "the report is done",
                Vec::new(),
                Vec::new(),
                Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(step.status, StepStatus::Rejected);
        assert!(step.evidence.iter().any(|e| e.starts_with("rejected:")));

        let updated = engine.get_chain(&chain.id).unwrap();
        assert_eq!(updated.steps.len(), 2);
        assert_eq!(updated.rejected_count(), 1);
        // Seed 0.9 minus one rejection penalty.
        assert!((updated.confidence - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_paused_chain_rejects_new_steps() {
        let engine = engine_with_tools(&[]);
        let chain = engine
            .start_reasoning("goal", ChainContext::default())
            .await
            .unwrap();

        engine.pause_reasoning(&chain.id).unwrap();
        let err = engine
            .add_reasoning_step(&chain.id, StepKind::Observation, "more", Vec::new(), Vec::new(), Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not active"));

        engine.resume_reasoning(&chain.id).unwrap();
        assert!(engine
            .add_reasoning_step(&chain.id, StepKind::Observation, "more", Vec::new(), Vec::new(), Vec::new())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_step_limit_enforced() {
        let engine = engine_with_tools(&[]);
        let context = ChainContext {
            max_steps: Some(1),
            ..ChainContext::default()
        };
        let chain = engine.start_reasoning("goal", context).await.unwrap();

        let err = engine
            .add_reasoning_step(&chain.id, StepKind::Observation, "over", Vec::new(), Vec::new(), Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("step limit"));
    }

    #[tokio::test]
    async fn test_decision_flow_appends_conclusion() {
        let engine = engine_with_tools(&["file_read"]);
        let chain = engine
            .start_reasoning("pick an approach", ChainContext::default())
            .await
            .unwrap();

        let options = vec![
            DecisionOption::new("read", "inspect the file first")
                .with_tools(vec!["file_read".to_string()])
                .with_risk(RiskLevel::Low)
                .with_pro("cheap to check"),
            DecisionOption::new("guess", "act without looking")
                .with_risk(RiskLevel::High)
                .with_con("may act on stale state"),
        ];
        let point = engine
            .create_decision_point(&chain.id, "inspect or guess?", options)
            .unwrap();
        assert_eq!(point.recommended().unwrap().id, "read");

        let decided = engine
            .make_decision(&chain.id, point, Some("reading is reversible".to_string()))
            .await
            .unwrap();
        assert_eq!(decided.chosen.as_deref(), Some("read"));
        assert_eq!(decided.rationale.as_deref(), Some("reading is reversible"));

        let updated = engine.get_chain(&chain.id).unwrap();
        assert!(updated.has_conclusion());
        assert_eq!(updated.last_step().unwrap().status, StepStatus::Validated);
    }

    #[tokio::test]
    async fn test_empty_decision_is_an_error() {
        let engine = engine_with_tools(&[]);
        let chain = engine
            .start_reasoning("goal", ChainContext::default())
            .await
            .unwrap();
        assert!(engine
            .create_decision_point(&chain.id, "?", Vec::new())
            .is_err());
    }

    #[tokio::test]
    async fn test_validate_chain_reports_missing_conclusion() {
        let engine = engine_with_tools(&[]);
        let chain = engine
            .start_reasoning("goal", ChainContext::default())
            .await
            .unwrap();

        let issues = engine.validate_chain(&chain.id).unwrap();
        assert!(issues.iter().any(|i| i.kind == IssueKind::ChainTooShort));
        assert!(issues.iter().any(|i| i.kind == IssueKind::MissingConclusion));
    }

    #[tokio::test]
    async fn test_complete_and_delete() {
        let engine = engine_with_tools(&[]);
        let chain = engine
            .start_reasoning("goal", ChainContext::default())
            .await
            .unwrap();

        let completed = engine.complete_reasoning(&chain.id).unwrap();
        assert_eq!(completed.status, ChainStatus::Completed);

        engine.delete_chain(&chain.id).unwrap();
        assert!(engine.get_chain(&chain.id).unwrap_err().is_not_found());
        assert!(engine.chain_ids().is_empty());
    }

    mod properties {
        use super::*;
        use crate::scoring::ConfidenceWeights;
        use proptest::prelude::*;

        fn step_kind() -> impl Strategy<Value = StepKind> {
            prop_oneof![
                Just(StepKind::Observation),
                Just(StepKind::Hypothesis),
                Just(StepKind::Verification),
                Just(StepKind::Decision),
                Just(StepKind::Action),
                Just(StepKind::Conclusion),
            ]
        }

        proptest! {
            #[test]
            fn step_confidence_stays_in_unit_interval(
                kind in step_kind(),
                previous in proptest::option::of(step_kind()),
                evidence in 0usize..10,
                assumptions in 0usize..10,
            ) {
                let weights = ConfidenceWeights::default();
                let confidence = weights.step_confidence(kind, previous, evidence, assumptions);
                prop_assert!((0.0..=1.0).contains(&confidence));
            }

            #[test]
            fn near_identical_content_is_always_circular(
                kind in step_kind(),
                base in "[a-z]{3,8} [a-z]{3,8} [a-z]{3,8} [a-z]{3,8} [a-z]{3,8}",
            ) {
                let validator = StepValidator::new(ReasoningConfig::default());
                let mut chain = ReasoningChain::new("goal", ChainContext::default());
                chain.steps.push(ReasoningStep {
                    id: Uuid::new_v4(),
                    kind: StepKind::Observation,
                    content: base.clone(),
                    confidence: 0.5,
                    evidence: Vec::new(),
                    assumptions: Vec::new(),
                    alternatives: Vec::new(),
                    status: StepStatus::Validated,
                    created_at: Utc::now(),
                });

                let candidate = ReasoningStep {
                    id: Uuid::new_v4(),
                    kind,
                    content: base,
                    confidence: 0.5,
                    evidence: Vec::new(),
                    assumptions: Vec::new(),
                    alternatives: Vec::new(),
                    status: StepStatus::Pending,
                    created_at: Utc::now(),
                };

                let issues = validator.validate_step(&chain, &candidate);
                prop_assert!(issues.iter().any(|i| i.kind == IssueKind::CircularReasoning));
            }
        }
    }
}
