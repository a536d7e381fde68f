//! End-to-end flows across the plan, reasoning, and validation engines

use std::sync::Arc;

use serde_json::json;

use deliberation_engine::config::EngineConfig;
use deliberation_engine::plan::{PlanContext, PlanEngine, RiskLevel, StepCategory};
use deliberation_engine::reasoning::{
    ChainContext, ChainStatus, DecisionOption, ReasoningEngine, StepKind, StepStatus,
};
use deliberation_engine::store::{MemoryChainStore, MemoryPlanStore};
use deliberation_engine::tools::{
    StaticToolRegistry, ToolCapabilities, ToolDescriptor, ToolHealth, ToolRegistry,
};
use deliberation_engine::validator::{
    AgentResponse, IssueKind, IssueSeverity, ResponseValidator, ToolCall, ValidationConstraints,
    ValidationContext,
};

fn registry() -> Arc<StaticToolRegistry> {
    Arc::new(StaticToolRegistry::with_tools(vec![
        ToolDescriptor::new("file_read").with_description("Read a file from disk"),
        ToolDescriptor::new("file_write")
            .with_description("Write a file to disk")
            .with_capabilities(ToolCapabilities::read_write()),
        ToolDescriptor::new("search_code").with_description("Search the codebase"),
        ToolDescriptor::new("shell_execute")
            .with_description("Run a shell command")
            .with_capabilities(ToolCapabilities::full()),
    ]))
}

fn plan_engine(registry: Arc<StaticToolRegistry>) -> PlanEngine {
    PlanEngine::new(
        EngineConfig::default().plan,
        registry,
        Arc::new(MemoryPlanStore::new()),
    )
}

fn reasoning_engine(registry: Arc<StaticToolRegistry>) -> ReasoningEngine {
    ReasoningEngine::new(
        EngineConfig::default().reasoning,
        registry,
        Arc::new(MemoryChainStore::new()),
    )
}

#[tokio::test]
async fn test_plan_lifecycle_create_validate_execute() {
    let registry = registry();
    let engine = plan_engine(registry.clone());

    let plan = engine
        .create_plan(
            "fix the failing parser test",
            &PlanContext::default(),
            &["do not touch generated code".to_string()],
        )
        .await
        .unwrap();

    // Scaffold contract: analysis first with no dependencies, synthesis last
    // depending on everything else.
    assert_eq!(plan.steps[0].category, StepCategory::Analysis);
    assert!(plan.steps[0].depends_on.is_empty());
    let last = plan.steps.last().unwrap();
    assert_eq!(last.category, StepCategory::Synthesis);
    assert_eq!(last.depends_on.len(), plan.steps.len() - 1);
    assert!(plan.estimated_duration > 0);

    let report = engine.validate_plan(&plan).await;
    assert!(report.is_valid);

    let results = engine
        .execute_plan(&plan.id, &PlanContext::default())
        .await
        .unwrap();
    assert_eq!(results.len(), plan.steps.len());
    assert!(results.iter().all(|r| r.success));
    assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.confidence)));
    // The synthesis step reports on every prior result.
    let synthesis = results.last().unwrap();
    assert!(synthesis.output.contains("succeeded"));
}

#[tokio::test]
async fn test_plan_detects_tool_loss_between_creation_and_validation() {
    let registry = registry();
    let engine = plan_engine(registry.clone());

    let plan = engine
        .create_plan("refactor the config loader", &PlanContext::default(), &[])
        .await
        .unwrap();
    assert!(engine.validate_plan(&plan).await.is_valid);

    registry.unregister("search_code");
    let report = engine.validate_plan(&plan).await;
    assert!(!report.is_valid);
    assert!(report.errors.iter().any(|e| e.contains("search_code")));
}

#[tokio::test]
async fn test_reasoning_chain_full_lifecycle_with_decision() {
    let registry = registry();
    let engine = reasoning_engine(registry);

    let chain = engine
        .start_reasoning("why does startup take ten seconds", ChainContext::default())
        .await
        .unwrap();
    assert_eq!(chain.steps.len(), 1);
    assert_eq!(chain.steps[0].kind, StepKind::Observation);

    engine
        .add_reasoning_step(
            &chain.id,
            StepKind::Hypothesis,
            "startup blocks on synchronous config fetches",
            vec!["the log shows three sequential network round trips".to_string()],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();

    engine
        .add_reasoning_step(
            &chain.id,
            StepKind::Verification,
            "timing each fetch confirms nine seconds spent waiting on the network",
            vec!["instrumented run attached to the ticket".to_string()],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();

    let options = vec![
        DecisionOption::new("parallel", "fetch the three configs concurrently")
            .with_risk(RiskLevel::Low)
            .with_pro("no behavior change, pure latency win"),
        DecisionOption::new("cache", "cache configs across restarts")
            .with_risk(RiskLevel::Medium)
            .with_pro("fastest startup")
            .with_con("staleness window after config changes"),
    ];
    let point = engine
        .create_decision_point(&chain.id, "how do we cut startup time?", options)
        .unwrap();
    assert_eq!(point.recommended().unwrap().id, "parallel");

    let decided = engine.make_decision(&chain.id, point, None).await.unwrap();
    assert_eq!(decided.chosen.as_deref(), Some("parallel"));

    // The decision landed as a validated conclusion, so the chain-level
    // checks are clean.
    let issues = engine.validate_chain(&chain.id).unwrap();
    assert!(!issues.iter().any(|i| i.kind == IssueKind::MissingConclusion));
    assert!(!issues.iter().any(|i| i.kind == IssueKind::ChainTooShort));

    let completed = engine.complete_reasoning(&chain.id).unwrap();
    assert_eq!(completed.status, ChainStatus::Completed);
    assert!(completed.confidence > 0.5);
}

#[tokio::test]
async fn test_rejected_steps_stay_auditable_and_penalize() {
    let registry = registry();
    let engine = reasoning_engine(registry);

    let chain = engine
        .start_reasoning("close out the incident", ChainContext::default())
        .await
        .unwrap();

    // Conclusion without evidence is rejected but kept.
    let rejected = engine
        .add_reasoning_step(
            &chain.id,
            StepKind::Conclusion,
            "the incident is resolved",
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, StepStatus::Rejected);

    let updated = engine.get_chain(&chain.id).unwrap();
    assert_eq!(updated.steps.len(), 2);
    assert!(updated.confidence < 0.9);
}

#[tokio::test]
async fn test_validator_gates_hallucinated_destructive_call() {
    let registry = registry();
    let validator = ResponseValidator::new(EngineConfig::default().validator);
    let context = ValidationContext::new(registry.list_tools().await);

    let response = AgentResponse::new("I'll remove the directory for you")
        .with_reasoning("the user asked to delete build artifacts")
        .with_tool_call(ToolCall::new("rm_tool", json!({"path": "/workspace/build"})));

    let result = validator
        .validate_response(&response, &context, &ValidationConstraints::default())
        .await;

    assert!(!result.allow_execution);
    assert!(result
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::HallucinatedTool && i.severity == IssueSeverity::Critical));

    // The corrected response drops the bad call and discloses the removal.
    let corrected = result.corrected.unwrap();
    assert!(corrected.tool_calls.is_empty());
    assert_ne!(corrected.content, response.content);
}

#[tokio::test]
async fn test_validator_passes_clean_tool_use() {
    let registry = registry();
    let validator = ResponseValidator::new(EngineConfig::default().validator);
    let context = ValidationContext::new(registry.list_tools().await);

    let response = AgentResponse::new("Reading the file before editing it")
        .with_reasoning("need current contents to apply a minimal diff")
        .with_confidence(0.9)
        .with_tool_call(ToolCall::new("file_read", json!({"path": "src/lib.rs"})));

    let result = validator
        .validate_response(&response, &context, &ValidationConstraints::default())
        .await;

    assert!(result.is_valid);
    assert!(result.allow_execution);
    assert_eq!(result.score, 1.0);
}

#[tokio::test]
async fn test_pipeline_plan_then_reason_then_validate() {
    let registry = registry();
    let plans = plan_engine(registry.clone());
    let chains = reasoning_engine(registry.clone());
    let validator = ResponseValidator::new(EngineConfig::default().validator);

    // Plan the work.
    let plan = plans
        .create_plan("summarize the error logs", &PlanContext::default(), &[])
        .await
        .unwrap();
    let results = plans
        .execute_plan(&plan.id, &PlanContext::default())
        .await
        .unwrap();
    assert!(results.iter().all(|r| r.success));

    // Reason about what the execution showed.
    let chain = chains
        .start_reasoning(&plan.goal, ChainContext::default())
        .await
        .unwrap();
    chains
        .add_reasoning_step(
            &chain.id,
            StepKind::Conclusion,
            "all plan steps completed, the summary is ready to send",
            vec![format!("{} step results, all successful", results.len())],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();

    // Gate the final response against the same registry.
    let context = ValidationContext::new(registry.list_tools().await);
    let response = AgentResponse::new("Here is the log summary")
        .with_reasoning("plan executed and every step validated")
        .with_confidence(chains.get_chain(&chain.id).unwrap().confidence);

    let result = validator
        .validate_response(&response, &context, &ValidationConstraints::default())
        .await;
    assert!(result.allow_execution);
}

#[tokio::test]
async fn test_degraded_tool_passes_unavailable_fails() {
    let registry = registry();
    registry.set_health("file_write", ToolHealth::Degraded);
    registry.set_health("search_code", ToolHealth::Unavailable);

    let validator = ResponseValidator::new(EngineConfig::default().validator);
    let context = ValidationContext::new(registry.list_tools().await);

    let degraded = AgentResponse::new("writing")
        .with_reasoning("save the draft")
        .with_tool_call(ToolCall::new("file_write", json!({"path": "draft.md"})));
    let result = validator
        .validate_response(&degraded, &context, &ValidationConstraints::default())
        .await;
    assert!(!result
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::ToolUnavailable));

    let unavailable = AgentResponse::new("searching")
        .with_reasoning("find the definition")
        .with_tool_call(ToolCall::new("search_code", json!({"query": "fn main"})));
    let result = validator
        .validate_response(&unavailable, &context, &ValidationConstraints::default())
        .await;
    assert!(result
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::ToolUnavailable));
}

#[tokio::test]
async fn test_caller_constraints_flow_through() {
    let registry = registry();
    let validator = ResponseValidator::new(EngineConfig::default().validator);
    let context = ValidationContext::new(registry.list_tools().await);

    let constraints = ValidationConstraints {
        forbidden_operations: vec!["force push".to_string()],
        min_confidence: Some(0.8),
        require_reasoning: true,
        ..ValidationConstraints::default()
    };

    let response = AgentResponse::new("I will force push the rebased branch").with_confidence(0.5);
    let result = validator
        .validate_response(&response, &context, &constraints)
        .await;

    assert!(result.issues.iter().any(|i| i.kind == IssueKind::ForbiddenOperation));
    assert!(result.issues.iter().any(|i| i.kind == IssueKind::LowConfidence));
    assert!(result.issues.iter().any(|i| i.kind == IssueKind::MissingReasoning));
    assert!(!result.is_valid);
}
