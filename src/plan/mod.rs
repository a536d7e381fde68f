//! Plan engine: goal decomposition, graph validation, and ordered execution

mod classifier;
mod types;

pub use classifier::{GoalCategory, GoalClassifier, KeywordClassifier};
pub use types::{Complexity, Plan, PlanId, PlanReport, PlanStep, RiskLevel, StepCategory, StepResult};

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::PlanConfig;
use crate::error::{EngineError, Result};
use crate::store::PlanStore;
use crate::tools::{ToolHealth, ToolRegistry};

/// Caller-supplied context for plan creation and execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanContext {
    /// Free-text summary of the working situation
    pub summary: Option<String>,

    /// Arbitrary key/value context passed through to step descriptions
    pub metadata: HashMap<String, String>,
}

/// Decomposes goals into dependency-ordered plans and executes them.
///
/// The engine never repairs an invalid graph: cycles and dangling
/// dependencies fail plan creation outright. Policy problems found during
/// validation (missing tools, weak criteria) are reported as data in a
/// [`PlanReport`].
pub struct PlanEngine {
    config: PlanConfig,
    registry: Arc<dyn ToolRegistry>,
    store: Arc<dyn PlanStore>,
    classifier: Arc<dyn GoalClassifier>,
}

impl PlanEngine {
    /// Create a plan engine with the default keyword classifier
    pub fn new(config: PlanConfig, registry: Arc<dyn ToolRegistry>, store: Arc<dyn PlanStore>) -> Self {
        Self {
            config,
            registry,
            store,
            classifier: Arc::new(KeywordClassifier::new()),
        }
    }

    /// Replace the goal classifier
    pub fn with_classifier(mut self, classifier: Arc<dyn GoalClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Decompose `goal` into a validated plan and store it.
    ///
    /// The tool-name snapshot is taken from the registry at this moment; a
    /// later [`validate_plan`](Self::validate_plan) pass re-checks against
    /// whatever is registered then.
    pub async fn create_plan(
        &self,
        goal: &str,
        context: &PlanContext,
        constraints: &[String],
    ) -> Result<Plan> {
        let tool_snapshot: Vec<String> = self
            .registry
            .list_tools()
            .await
            .into_iter()
            .map(|tool| tool.name)
            .collect();

        let category = self.classifier.classify(goal);
        tracing::info!(%goal, ?category, tools = tool_snapshot.len(), "Creating plan");

        let steps = self.decompose(goal, category, context, constraints, &tool_snapshot);

        let high_count = steps
            .iter()
            .filter(|step| step.complexity == Complexity::High)
            .count();
        let risk = if high_count > self.config.high_risk_step_threshold {
            RiskLevel::High
        } else if high_count >= 1 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let estimated_duration = steps
            .iter()
            .map(|step| self.config.duration.estimate(step.complexity))
            .sum();

        let plan = Plan {
            id: PlanId::new(),
            goal: goal.to_string(),
            steps,
            risk,
            estimated_duration,
            tool_snapshot,
            created_at: Utc::now(),
        };

        let report = self.validate_plan(&plan).await;
        if !report.is_valid {
            return Err(EngineError::structure(report.errors.join("; ")));
        }

        self.store.insert(plan.clone());
        tracing::info!(plan_id = %plan.id, steps = plan.steps.len(), ?risk, "Plan created");
        Ok(plan)
    }

    /// Fetch a stored plan
    pub fn get_plan(&self, id: &PlanId) -> Result<Plan> {
        self.store.get(id).ok_or_else(|| EngineError::plan_not_found(id))
    }

    /// Remove a stored plan
    pub fn delete_plan(&self, id: &PlanId) -> Result<Plan> {
        self.store.remove(id).ok_or_else(|| EngineError::plan_not_found(id))
    }

    /// Check a plan's structure against the currently registered tools.
    ///
    /// Cycles, unresolved dependency ids, and missing tools are errors; too
    /// many high-complexity steps and missing validation criteria are
    /// warnings that leave the plan usable.
    pub async fn validate_plan(&self, plan: &Plan) -> PlanReport {
        let mut report = PlanReport::default();

        let known_ids: HashSet<Uuid> = plan.step_ids().into_iter().collect();
        for step in &plan.steps {
            for dep in &step.depends_on {
                if !known_ids.contains(dep) {
                    report.errors.push(format!(
                        "step '{}' depends on unknown step id {dep}",
                        step.title
                    ));
                }
            }
        }

        report.errors.extend(detect_cycles(&plan.steps));

        let current_tools: HashSet<String> = self
            .registry
            .list_tools()
            .await
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        for step in &plan.steps {
            for tool in &step.required_tools {
                if !current_tools.contains(tool) {
                    report.errors.push(format!(
                        "step '{}' requires unregistered tool '{tool}'",
                        step.title
                    ));
                }
            }
        }

        if plan.high_complexity_count() > self.config.high_complexity_warning_threshold {
            report.warnings.push(format!(
                "plan has {} high-complexity steps",
                plan.high_complexity_count()
            ));
            report
                .suggestions
                .push("split high-complexity steps into smaller units".to_string());
        }
        for step in &plan.steps {
            if step.validation_criteria.is_empty() {
                report.warnings.push(format!(
                    "step '{}' has no validation criteria",
                    step.title
                ));
            }
        }

        report.is_valid = report.errors.is_empty();
        if !report.is_valid {
            tracing::warn!(plan_id = %plan.id, errors = report.errors.len(), "Plan failed validation");
        }
        report
    }

    /// Execute a stored plan in dependency order.
    ///
    /// A step runs only once all of its dependencies produced successful
    /// results; otherwise a failed result is synthesized without invoking the
    /// body. A body failure halts the pass unless the step declares a
    /// fallback. The fallback is advisory text only; no alternate execution
    /// happens here.
    pub async fn execute_plan(&self, plan_id: &PlanId, context: &PlanContext) -> Result<Vec<StepResult>> {
        let plan = self.get_plan(plan_id)?;
        let order = topological_order(&plan.steps)?;

        let mut results: IndexMap<Uuid, StepResult> = IndexMap::new();

        for index in order {
            let step = &plan.steps[index];

            let missing: Vec<Uuid> = step
                .depends_on
                .iter()
                .filter(|dep| !results.get(*dep).map(|r| r.success).unwrap_or(false))
                .copied()
                .collect();
            if !missing.is_empty() {
                tracing::debug!(step = %step.title, missing = missing.len(), "Skipping step with unmet dependencies");
                results.insert(step.id, StepResult::dependency_failure(step.id, &missing));
                continue;
            }

            let started = Instant::now();
            let result = match self.run_step_body(&plan, step, context, &results).await {
                Ok((output, tools_invoked)) => {
                    let validation_passed = meets_criteria(&output, &step.validation_criteria);
                    let confidence = self.config.step_result.result_confidence(
                        validation_passed,
                        output.len(),
                        step.complexity,
                    );
                    StepResult {
                        step_id: step.id,
                        success: true,
                        output,
                        tools_invoked,
                        validation_passed,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        confidence,
                        warnings: Vec::new(),
                        errors: Vec::new(),
                    }
                }
                Err(err) => {
                    tracing::warn!(step = %step.title, %err, "Step body failed");
                    let mut failure = StepResult::body_failure(step.id, err.to_string());
                    failure.elapsed_ms = started.elapsed().as_millis() as u64;
                    failure
                }
            };

            let halt = !result.success && step.fallback.is_none();
            results.insert(step.id, result);

            if halt {
                tracing::warn!(plan_id = %plan.id, step = %step.title, "Halting execution: failed step has no fallback");
                break;
            }
        }

        Ok(results.into_values().collect())
    }

    /// Build the fixed scaffold plus category-specific middle steps.
    ///
    /// Contract: analysis first (no deps), verification second (depends on
    /// analysis), category steps depending on verification, synthesis last
    /// depending on everything else.
    fn decompose(
        &self,
        goal: &str,
        category: GoalCategory,
        context: &PlanContext,
        constraints: &[String],
        tool_snapshot: &[String],
    ) -> Vec<PlanStep> {
        let mut analysis_description = format!("Understand the request: {goal}");
        if let Some(summary) = &context.summary {
            analysis_description.push_str(&format!("\nContext: {summary}"));
        }
        if !constraints.is_empty() {
            analysis_description.push_str(&format!("\nConstraints: {}", constraints.join("; ")));
        }

        let analyze = PlanStep::new(StepCategory::Analysis, "Analyze Request")
            .with_description(analysis_description)
            .with_complexity(Complexity::Low)
            .with_criterion("analyzed");

        let verify = PlanStep::new(StepCategory::Verification, "Verify Tool Availability")
            .with_description("Confirm every tool the plan requires is registered and healthy")
            .with_complexity(Complexity::Low)
            .with_criterion("verified")
            .depends_on(analyze.id);

        let mut steps = vec![analyze, verify];
        let verify_id = steps[1].id;

        let middle = match category {
            GoalCategory::FileSystem => vec![
                PlanStep::new(StepCategory::ToolCall, "Inspect Target Files")
                    .with_description("Locate and read the files named by the request")
                    .with_tools(select_tools(tool_snapshot, &["file", "read", "list"]))
                    .with_complexity(Complexity::Medium)
                    .with_criterion("executed")
                    .depends_on(verify_id),
                PlanStep::new(StepCategory::ToolCall, "Apply File Changes")
                    .with_description("Perform the requested file operations")
                    .with_tools(select_tools(tool_snapshot, &["write", "edit", "file"]))
                    .with_complexity(Complexity::High)
                    .with_criterion("executed")
                    .with_fallback("report the intended changes without applying them")
                    .depends_on(verify_id),
            ],
            GoalCategory::Code => vec![
                PlanStep::new(StepCategory::ToolCall, "Locate Relevant Code")
                    .with_description("Find the code paths the request touches")
                    .with_tools(select_tools(tool_snapshot, &["search", "code", "grep"]))
                    .with_complexity(Complexity::Medium)
                    .with_criterion("executed")
                    .depends_on(verify_id),
                PlanStep::new(StepCategory::ToolCall, "Modify Code")
                    .with_description("Apply the requested code changes")
                    .with_tools(select_tools(tool_snapshot, &["edit", "write"]))
                    .with_complexity(Complexity::High)
                    .with_criterion("executed")
                    .with_fallback("describe the required edits for manual application")
                    .depends_on(verify_id),
                PlanStep::new(StepCategory::Verification, "Check Modified Code")
                    .with_description("Verify the changes build and behave as requested")
                    .with_tools(select_tools(tool_snapshot, &["test", "shell", "build"]))
                    .with_complexity(Complexity::Medium)
                    .with_criterion("checked")
                    .depends_on(verify_id),
            ],
            GoalCategory::Analysis => vec![
                PlanStep::new(StepCategory::ToolCall, "Gather Material")
                    .with_description("Collect the inputs the analysis needs")
                    .with_tools(select_tools(tool_snapshot, &["read", "search", "fetch"]))
                    .with_complexity(Complexity::Medium)
                    .with_criterion("executed")
                    .depends_on(verify_id),
                PlanStep::new(StepCategory::Analysis, "Evaluate Findings")
                    .with_description("Work through the gathered material against the request")
                    .with_complexity(Complexity::Medium)
                    .with_criterion("analyzed")
                    .depends_on(verify_id),
            ],
            GoalCategory::General => vec![
                PlanStep::new(StepCategory::ToolCall, "Execute Request")
                    .with_description("Carry out the request with the available tools")
                    .with_tools(Vec::new())
                    .with_complexity(Complexity::Medium)
                    .with_criterion("executed")
                    .depends_on(verify_id),
            ],
        };
        steps.extend(middle);

        let mut synthesize = PlanStep::new(StepCategory::Synthesis, "Synthesize Results")
            .with_description("Combine step outputs into the final answer")
            .with_complexity(Complexity::Low)
            .with_criterion("synthesis");
        for step in &steps {
            synthesize.depends_on.push(step.id);
        }
        steps.push(synthesize);

        steps
    }

    /// Dispatch a step body by category; returns (output, tools invoked)
    async fn run_step_body(
        &self,
        plan: &Plan,
        step: &PlanStep,
        _context: &PlanContext,
        prior: &IndexMap<Uuid, StepResult>,
    ) -> Result<(String, Vec<String>)> {
        match step.category {
            StepCategory::Analysis => Ok((
                format!("Request analyzed. {}", step.description),
                Vec::new(),
            )),
            StepCategory::Verification => {
                let mut missing = Vec::new();
                for tool in plan.required_tools() {
                    match self.registry.get_tool(tool).await {
                        Some(descriptor) if descriptor.health != ToolHealth::Unavailable => {}
                        Some(_) => missing.push(format!("{tool} (unavailable)")),
                        None => missing.push(format!("{tool} (unregistered)")),
                    }
                }
                if missing.is_empty() {
                    Ok((
                        format!(
                            "Tool availability verified: {} tool(s) checked",
                            plan.required_tools().len()
                        ),
                        Vec::new(),
                    ))
                } else {
                    Err(EngineError::structure(format!(
                        "required tools missing: {}",
                        missing.join(", ")
                    )))
                }
            }
            StepCategory::ToolCall => {
                let mut invoked = Vec::new();
                for tool in &step.required_tools {
                    match self.registry.get_tool(tool).await {
                        Some(descriptor) if descriptor.health != ToolHealth::Unavailable => {
                            invoked.push(tool.clone());
                        }
                        _ => {
                            return Err(EngineError::structure(format!(
                                "tool '{tool}' is not invocable"
                            )));
                        }
                    }
                }
                let output = if invoked.is_empty() {
                    format!("Step '{}' executed with no tool invocations", step.title)
                } else {
                    format!(
                        "Step '{}' executed; invoked tools: {}. {}",
                        step.title,
                        invoked.join(", "),
                        step.description
                    )
                };
                Ok((output, invoked))
            }
            StepCategory::Decision => Ok((
                format!("Decision recorded for '{}': default approach selected", step.title),
                Vec::new(),
            )),
            StepCategory::Synthesis => {
                let successes = prior.values().filter(|r| r.success).count();
                let failures = prior.len() - successes;
                let mut output = format!(
                    "Synthesis of {} prior step(s): {successes} succeeded, {failures} failed.",
                    prior.len()
                );
                for result in prior.values().filter(|r| r.success) {
                    if !result.output.is_empty() {
                        output.push_str("\n- ");
                        output.push_str(&result.output);
                    }
                }
                Ok((output, Vec::new()))
            }
        }
    }
}

/// All criteria substrings must appear in the output (case-insensitive)
fn meets_criteria(output: &str, criteria: &[String]) -> bool {
    let lowered = output.to_lowercase();
    criteria.iter().all(|c| lowered.contains(&c.to_lowercase()))
}

/// Pick snapshot tools whose names contain any of the given fragments
fn select_tools(snapshot: &[String], fragments: &[&str]) -> Vec<String> {
    snapshot
        .iter()
        .filter(|name| {
            let lowered = name.to_lowercase();
            fragments.iter().any(|fragment| lowered.contains(fragment))
        })
        .cloned()
        .collect()
}

/// Depth-first cycle detection with an explicit recursion stack
fn detect_cycles(steps: &[PlanStep]) -> Vec<String> {
    let by_id: HashMap<Uuid, &PlanStep> = steps.iter().map(|s| (s.id, s)).collect();
    let mut visited = HashSet::new();
    let mut errors = Vec::new();

    fn visit(
        id: Uuid,
        by_id: &HashMap<Uuid, &PlanStep>,
        visited: &mut HashSet<Uuid>,
        stack: &mut HashSet<Uuid>,
        errors: &mut Vec<String>,
    ) {
        if stack.contains(&id) {
            if let Some(step) = by_id.get(&id) {
                errors.push(format!("cyclic dependency involving step '{}'", step.title));
            }
            return;
        }
        if !visited.insert(id) {
            return;
        }
        stack.insert(id);
        if let Some(step) = by_id.get(&id) {
            for dep in &step.depends_on {
                visit(*dep, by_id, visited, stack, errors);
            }
        }
        stack.remove(&id);
    }

    for step in steps {
        let mut stack = HashSet::new();
        visit(step.id, &by_id, &mut visited, &mut stack, &mut errors);
    }
    errors
}

/// Topological order of step indices (dependencies first).
///
/// Defensive: plan creation already rejects cycles, but execution re-checks
/// and raises a structural error rather than looping.
fn topological_order(steps: &[PlanStep]) -> Result<Vec<usize>> {
    let index_of: HashMap<Uuid, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| (step.id, i))
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        index: usize,
        steps: &[PlanStep],
        index_of: &HashMap<Uuid, usize>,
        marks: &mut [Mark],
        order: &mut Vec<usize>,
    ) -> Result<()> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(EngineError::structure(format!(
                    "cyclic dependency involving step '{}'",
                    steps[index].title
                )));
            }
            Mark::Unvisited => {}
        }
        marks[index] = Mark::InProgress;
        for dep in &steps[index].depends_on {
            let dep_index = index_of.get(dep).ok_or_else(|| {
                EngineError::structure(format!(
                    "step '{}' depends on unknown step id {dep}",
                    steps[index].title
                ))
            })?;
            visit(*dep_index, steps, index_of, marks, order)?;
        }
        marks[index] = Mark::Done;
        order.push(index);
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; steps.len()];
    let mut order = Vec::with_capacity(steps.len());
    for index in 0..steps.len() {
        visit(index, steps, &index_of, &mut marks, &mut order)?;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPlanStore;
    use crate::tools::{StaticToolRegistry, ToolDescriptor};

    fn engine_with_tools(names: &[&str]) -> (PlanEngine, Arc<StaticToolRegistry>) {
        let registry = Arc::new(StaticToolRegistry::with_tools(
            names.iter().map(|n| ToolDescriptor::new(*n)),
        ));
        let engine = PlanEngine::new(
            PlanConfig::default(),
            registry.clone(),
            Arc::new(MemoryPlanStore::new()),
        );
        (engine, registry)
    }

    #[tokio::test]
    async fn test_plan_scaffold_shape() {
        let (engine, _) = engine_with_tools(&["file_read", "file_write"]);
        let plan = engine
            .create_plan("move the logs folder", &PlanContext::default(), &[])
            .await
            .unwrap();

        let first = &plan.steps[0];
        assert_eq!(first.category, StepCategory::Analysis);
        assert!(first.depends_on.is_empty());

        let second = &plan.steps[1];
        assert_eq!(second.category, StepCategory::Verification);
        assert_eq!(second.depends_on, vec![first.id]);

        let last = plan.steps.last().unwrap();
        assert_eq!(last.category, StepCategory::Synthesis);
        assert_eq!(last.depends_on.len(), plan.steps.len() - 1);
    }

    #[tokio::test]
    async fn test_create_then_validate_roundtrip_all_categories() {
        let (engine, _) = engine_with_tools(&["file_read", "search_code", "shell_execute"]);
        for goal in [
            "rename the output directory",
            "fix the bug in the tokenizer",
            "summarize the benchmark results",
            "plan my week",
        ] {
            let plan = engine
                .create_plan(goal, &PlanContext::default(), &[])
                .await
                .unwrap();
            let report = engine.validate_plan(&plan).await;
            assert!(report.is_valid, "goal '{goal}' produced errors: {:?}", report.errors);
        }
    }

    #[tokio::test]
    async fn test_cycle_is_rejected() {
        let (engine, _) = engine_with_tools(&[]);

        let mut a = PlanStep::new(StepCategory::Analysis, "a");
        let mut b = PlanStep::new(StepCategory::Analysis, "b");
        let mut c = PlanStep::new(StepCategory::Analysis, "c");
        a.depends_on.push(b.id);
        b.depends_on.push(c.id);
        c.depends_on.push(a.id);

        let plan = Plan {
            id: PlanId::new(),
            goal: "cycle".to_string(),
            steps: vec![a, b, c],
            risk: RiskLevel::Low,
            estimated_duration: 0,
            tool_snapshot: Vec::new(),
            created_at: Utc::now(),
        };

        let report = engine.validate_plan(&plan).await;
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("cyclic")));
        assert!(topological_order(&plan.steps).is_err());
    }

    #[tokio::test]
    async fn test_missing_tool_is_named_in_error() {
        let (engine, registry) = engine_with_tools(&["search_code"]);
        let plan = engine
            .create_plan("fix the failing test", &PlanContext::default(), &[])
            .await
            .unwrap();

        registry.unregister("search_code");
        let report = engine.validate_plan(&plan).await;
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("search_code")));
    }

    #[tokio::test]
    async fn test_unresolved_dependency_is_error() {
        let (engine, _) = engine_with_tools(&[]);
        let step = PlanStep::new(StepCategory::Analysis, "orphan").depends_on(Uuid::new_v4());
        let plan = Plan {
            id: PlanId::new(),
            goal: "dangling".to_string(),
            steps: vec![step],
            risk: RiskLevel::Low,
            estimated_duration: 0,
            tool_snapshot: Vec::new(),
            created_at: Utc::now(),
        };

        let report = engine.validate_plan(&plan).await;
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("unknown step id")));
    }

    #[tokio::test]
    async fn test_warnings_leave_plan_usable() {
        let (engine, _) = engine_with_tools(&[]);
        let steps: Vec<PlanStep> = (0..5)
            .map(|i| {
                PlanStep::new(StepCategory::Analysis, format!("step {i}"))
                    .with_complexity(Complexity::High)
            })
            .collect();
        let plan = Plan {
            id: PlanId::new(),
            goal: "heavy".to_string(),
            steps,
            risk: RiskLevel::High,
            estimated_duration: 1500,
            tool_snapshot: Vec::new(),
            created_at: Utc::now(),
        };

        let report = engine.validate_plan(&plan).await;
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("high-complexity")));
        assert!(report.warnings.iter().any(|w| w.contains("validation criteria")));
    }

    #[tokio::test]
    async fn test_risk_and_duration_aggregation() {
        let (engine, _) = engine_with_tools(&["file_write_tool"]);
        let plan = engine
            .create_plan("delete the temp files", &PlanContext::default(), &[])
            .await
            .unwrap();

        // Scaffold: 2 low + 1 medium + 1 high + 1 low synthesis.
        assert_eq!(plan.high_complexity_count(), 1);
        assert_eq!(plan.risk, RiskLevel::Medium);
        let expected: u64 = plan
            .steps
            .iter()
            .map(|s| PlanConfig::default().duration.estimate(s.complexity))
            .sum();
        assert_eq!(plan.estimated_duration, expected);
    }

    #[tokio::test]
    async fn test_execute_plan_orders_and_synthesizes() {
        let (engine, _) = engine_with_tools(&["file_read"]);
        let plan = engine
            .create_plan("summarize the release notes", &PlanContext::default(), &[])
            .await
            .unwrap();

        let results = engine
            .execute_plan(&plan.id, &PlanContext::default())
            .await
            .unwrap();

        assert_eq!(results.len(), plan.steps.len());
        assert!(results.iter().all(|r| r.success));
        // Analysis executes first, synthesis last.
        assert_eq!(results.first().unwrap().step_id, plan.steps[0].id);
        assert_eq!(results.last().unwrap().step_id, plan.steps.last().unwrap().id);
        for result in &results {
            assert!((0.0..=1.0).contains(&result.confidence));
        }
    }

    #[tokio::test]
    async fn test_failed_dependency_synthesizes_failure_without_invocation() {
        let (engine, registry) = engine_with_tools(&["ghost_tool"]);

        let a = PlanStep::new(StepCategory::ToolCall, "a")
            .with_tools(vec!["ghost_tool".to_string()])
            .with_fallback("continue without the tool output");
        let b = PlanStep::new(StepCategory::ToolCall, "b").depends_on(a.id);
        let b_id = b.id;

        let plan = Plan {
            id: PlanId::new(),
            goal: "dependency propagation".to_string(),
            steps: vec![a, b],
            risk: RiskLevel::Low,
            estimated_duration: 60,
            tool_snapshot: vec!["ghost_tool".to_string()],
            created_at: Utc::now(),
        };
        engine.store.insert(plan.clone());

        // Make step a fail by removing its tool before execution.
        registry.unregister("ghost_tool");

        let results = engine
            .execute_plan(&plan.id, &PlanContext::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        let b_result = results.iter().find(|r| r.step_id == b_id).unwrap();
        assert!(!b_result.success);
        assert!(b_result.tools_invoked.is_empty());
        assert!(b_result.errors[0].contains("unmet dependencies"));
    }

    #[tokio::test]
    async fn test_failure_without_fallback_halts_execution() {
        let (engine, registry) = engine_with_tools(&["flaky_tool"]);

        let a = PlanStep::new(StepCategory::ToolCall, "a").with_tools(vec!["flaky_tool".to_string()]);
        let b = PlanStep::new(StepCategory::Analysis, "b");
        let plan = Plan {
            id: PlanId::new(),
            goal: "halt".to_string(),
            steps: vec![a, b],
            risk: RiskLevel::Low,
            estimated_duration: 60,
            tool_snapshot: vec!["flaky_tool".to_string()],
            created_at: Utc::now(),
        };
        engine.store.insert(plan.clone());
        registry.unregister("flaky_tool");

        let results = engine
            .execute_plan(&plan.id, &PlanContext::default())
            .await
            .unwrap();

        // b is independent of a but execution halted before reaching it.
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
    }

    #[tokio::test]
    async fn test_execute_unknown_plan_fails_loudly() {
        let (engine, _) = engine_with_tools(&[]);
        let err = engine
            .execute_plan(&PlanId::new(), &PlanContext::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
