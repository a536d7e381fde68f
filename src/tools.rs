//! Tool registry interface and capability descriptors
//!
//! The engines never execute tools; they only consult the registry for what
//! exists and what it is allowed to do. Capabilities are resolved once at
//! registration time instead of being re-derived from tool names at
//! validation time.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// What a tool is permitted to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCapabilities {
    /// Reads data from the environment
    pub read: bool,
    /// Writes or mutates the environment
    pub write: bool,
    /// Executes external processes
    pub execute: bool,
}

impl ToolCapabilities {
    /// Read-only capability set
    pub fn read_only() -> Self {
        Self { read: true, write: false, execute: false }
    }

    /// Read/write capability set
    pub fn read_write() -> Self {
        Self { read: true, write: true, execute: false }
    }

    /// Full capability set including process execution
    pub fn full() -> Self {
        Self { read: true, write: true, execute: true }
    }
}

/// Shape of a tool's input or output payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoKind {
    /// No payload
    None,
    /// Free text
    Text,
    /// Structured JSON
    Structured,
    /// Opaque bytes
    Binary,
}

/// Reported health of a registered tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolHealth {
    /// Responding normally
    Healthy,
    /// Responding but impaired
    Degraded,
    /// Registered but not currently usable
    Unavailable,
}

/// Closed descriptor for a registered tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Capability flags resolved at registration time
    pub capabilities: ToolCapabilities,
    /// Input payload kind
    pub input_kind: IoKind,
    /// Output payload kind
    pub output_kind: IoKind,
    /// Current health as reported by telemetry
    pub health: ToolHealth,
}

impl ToolDescriptor {
    /// Create a healthy read-only tool descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            capabilities: ToolCapabilities::read_only(),
            input_kind: IoKind::Structured,
            output_kind: IoKind::Text,
            health: ToolHealth::Healthy,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the capability flags
    pub fn with_capabilities(mut self, capabilities: ToolCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set input and output payload kinds
    pub fn with_io(mut self, input: IoKind, output: IoKind) -> Self {
        self.input_kind = input;
        self.output_kind = output;
        self
    }

    /// Set the health status
    pub fn with_health(mut self, health: ToolHealth) -> Self {
        self.health = health;
        self
    }

    /// Whether the tool expects an input payload
    pub fn expects_input(&self) -> bool {
        self.input_kind != IoKind::None
    }
}

/// Read-only view of the tool registry consumed by the engines.
///
/// Lookups are async so a remote registry can back this trait; the in-memory
/// implementation below resolves immediately.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// All registered tool descriptors
    async fn list_tools(&self) -> Vec<ToolDescriptor>;

    /// A single descriptor by name, if registered
    async fn get_tool(&self, name: &str) -> Option<ToolDescriptor>;
}

/// In-memory tool registry
#[derive(Debug, Default)]
pub struct StaticToolRegistry {
    tools: DashMap<String, ToolDescriptor>,
}

impl StaticToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from descriptors
    pub fn with_tools(tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Register or replace a tool descriptor
    pub fn register(&self, tool: ToolDescriptor) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Remove a tool, returning its descriptor if it was registered
    pub fn unregister(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools.remove(name).map(|(_, tool)| tool)
    }

    /// Update the health of a registered tool
    pub fn set_health(&self, name: &str, health: ToolHealth) -> bool {
        match self.tools.get_mut(name) {
            Some(mut entry) => {
                entry.health = health;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ToolRegistry for StaticToolRegistry {
    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|entry| entry.value().clone()).collect()
    }

    async fn get_tool(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools.get(name).map(|entry| entry.value().clone())
    }
}
