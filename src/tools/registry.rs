//! Tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::Instrument;

use super::Tool;
use crate::observability::tool_span;
use crate::service::MedicalAgent;
use crate::types::{ToolDefinition, ToolOutput};

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Every medical tool, bound to one shared agent.
    pub fn medical(agent: Arc<MedicalAgent>) -> Self {
        let mut registry = Self::new();

        let all_tools: Vec<Arc<dyn Tool>> = vec![
            // Analysis
            Arc::new(super::AnalyzeDocumentTool::new(agent.clone())),
            Arc::new(super::PaidAnalysisTool::new(agent.clone())),
            Arc::new(super::PatientSummaryTool::new(agent.clone())),
            // Catalog and pricing
            Arc::new(super::ServicesTool::new(agent.clone())),
            Arc::new(super::CalculateBillingTool::new(agent.clone())),
            Arc::new(super::HealthCheckTool::new(agent.clone())),
            // Payments
            Arc::new(super::CreateCustomerTool::new(agent.clone())),
            Arc::new(super::CustomerInfoTool::new(agent.clone())),
            Arc::new(super::CreatePaymentIntentTool::new(agent.clone())),
            Arc::new(super::ConfirmPaymentTool::new(agent)),
        ];

        for tool in all_tools {
            registry.register(tool);
        }

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Execute a tool by name under a fresh request id
    pub async fn execute(&self, name: &str, input: serde_json::Value) -> ToolOutput {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.execute_with_id(name, input, &request_id).await
    }

    pub async fn execute_with_id(
        &self,
        name: &str,
        input: serde_json::Value,
        request_id: &str,
    ) -> ToolOutput {
        let span = tool_span(name, request_id);
        let output = match self.tools.get(name) {
            Some(tool) => tool.execute(input).instrument(span.clone()).await,
            None => ToolOutput::invalid_input(format!("Unknown tool: {}", name)),
        };
        span.record("is_error", output.is_error());
        output
    }

    /// Tool definitions sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
