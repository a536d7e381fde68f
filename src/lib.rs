//! Deliberation engine for tool-calling agents.
//!
//! Three cooperating engines take a goal from intent to a gated response:
//!
//! - [`plan::PlanEngine`] decomposes a goal into a dependency-ordered plan,
//!   validates the step graph against the registered tools, and executes
//!   steps in topological order with failure propagation.
//! - [`reasoning::ReasoningEngine`] maintains confidence-scored reasoning
//!   chains with per-step validation and feasibility-ranked decision points.
//! - [`validator::ResponseValidator`] runs a composed rule set over candidate
//!   responses and decides, via a severity-weighted score, whether a response
//!   may reach execution.
//!
//! Nothing in this crate executes tools. The engines consult a
//! [`tools::ToolRegistry`] for what exists and what it may do, and leave the
//! invocation to the embedding application.
//!
//! ```no_run
//! use std::sync::Arc;
//! use deliberation_engine::config::EngineConfig;
//! use deliberation_engine::plan::{PlanContext, PlanEngine};
//! use deliberation_engine::store::MemoryPlanStore;
//! use deliberation_engine::tools::{StaticToolRegistry, ToolDescriptor};
//!
//! # async fn example() -> deliberation_engine::error::Result<()> {
//! let registry = Arc::new(StaticToolRegistry::with_tools(vec![
//!     ToolDescriptor::new("file_read"),
//! ]));
//! let config = EngineConfig::default();
//! let engine = PlanEngine::new(config.plan, registry, Arc::new(MemoryPlanStore::new()));
//!
//! let plan = engine
//!     .create_plan("summarize the release notes", &PlanContext::default(), &[])
//!     .await?;
//! let _results = engine.execute_plan(&plan.id, &PlanContext::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod plan;
pub mod reasoning;
pub mod scoring;
pub mod store;
pub mod tools;
pub mod validator;

pub use config::{EngineConfig, PlanConfig, ReasoningConfig, ValidatorConfig};
pub use error::{EngineError, Result};
pub use plan::{Plan, PlanContext, PlanEngine, PlanId, PlanReport, PlanStep, StepResult};
pub use reasoning::{
    ChainContext, ChainId, DecisionOption, DecisionPoint, ReasoningChain, ReasoningEngine,
    ReasoningStep, StepKind,
};
pub use store::{ChainStore, MemoryChainStore, MemoryPlanStore, PlanStore};
pub use tools::{StaticToolRegistry, ToolDescriptor, ToolHealth, ToolRegistry};
pub use validator::{
    AgentResponse, ResponseValidator, ToolCall, ValidationConstraints, ValidationContext,
    ValidationIssue, ValidationResult,
};
