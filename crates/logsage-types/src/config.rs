//! Configuration structs for Logsage.
//!
//! Required connection settings come from the environment (loaded in
//! logsage-infra); the tunables here may additionally be overridden by an
//! optional `config.toml`.

use serde::{Deserialize, Serialize};

/// Azure OpenAI connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Service endpoint, e.g. `https://myresource.openai.azure.com`.
    pub endpoint: String,
    /// Deployment (model) name to route completions to.
    pub deployment: String,
    /// REST API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_version() -> String {
    "2024-06-01".to_string()
}

/// Log Analytics workspace and tenant scope settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace to run queries against.
    pub workspace_id: String,
    /// The caller's resource id; injected (lower-cased) into every
    /// generated query as a mandatory literal filter.
    pub resource_id: String,
    /// AAD tenant for the client-credentials token flow.
    pub tenant_id: String,
    /// AAD application (client) id.
    pub client_id: String,
}

/// Tunables for the turn orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorTuning {
    /// Max tokens per generation step.
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
    /// Sampling temperature for all four generation steps.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Hard cap on engine/executor steps per turn in the tool-call variant.
    #[serde(default = "default_tool_step_budget")]
    pub tool_step_budget: u32,
}

fn default_max_completion_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.0
}

fn default_tool_step_budget() -> u32 {
    8
}

impl Default for OrchestratorTuning {
    fn default() -> Self {
        Self {
            max_completion_tokens: default_max_completion_tokens(),
            temperature: default_temperature(),
            tool_step_budget: default_tool_step_budget(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_defaults() {
        let tuning = OrchestratorTuning::default();
        assert_eq!(tuning.max_completion_tokens, 1024);
        assert!((tuning.temperature - 0.0).abs() < f64::EPSILON);
        assert_eq!(tuning.tool_step_budget, 8);
    }

    #[test]
    fn test_tuning_partial_toml() {
        let tuning: OrchestratorTuning = toml::from_str("tool_step_budget = 3").unwrap();
        assert_eq!(tuning.tool_step_budget, 3);
        assert_eq!(tuning.max_completion_tokens, 1024);
    }

    #[test]
    fn test_llm_config_default_api_version() {
        let cfg: LlmConfig = toml::from_str(
            "endpoint = \"https://example.openai.azure.com\"\ndeployment = \"gpt-4o\"",
        )
        .unwrap();
        assert_eq!(cfg.api_version, "2024-06-01");
    }
}
