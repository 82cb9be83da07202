//! Configuration loader for Logsage.
//!
//! Connection settings and credentials come from the environment; tuning
//! knobs may additionally be overridden by an optional `config.toml` next
//! to the binary. A missing or malformed tuning file falls back to
//! defaults with a warning rather than failing startup.

use std::path::Path;

use anyhow::Context;
use secrecy::SecretString;

use logsage_types::config::{LlmConfig, OrchestratorTuning, WorkspaceConfig};

/// Fully resolved application configuration.
pub struct AppConfig {
    pub llm: LlmConfig,
    pub llm_api_key: SecretString,
    pub workspace: WorkspaceConfig,
    pub client_secret: SecretString,
    pub tuning: OrchestratorTuning,
}

fn require_env(name: &'static str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing required environment variable {name}"))
}

impl AppConfig {
    /// Resolve configuration from the process environment, plus tunables
    /// from `config.toml` in `config_dir` when present.
    pub async fn from_env(config_dir: &Path) -> anyhow::Result<Self> {
        let llm = LlmConfig {
            endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
            deployment: require_env("AZURE_OPENAI_CHATGPT_DEPLOYMENT")?,
            api_version: std::env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2024-06-01".to_string()),
        };
        let llm_api_key = SecretString::from(require_env("AZURE_OPENAI_API_KEY")?);

        let workspace = WorkspaceConfig {
            workspace_id: require_env("AZURE_LOG_ANALYTICS_WORKSPACE_ID")?,
            resource_id: require_env("LOGSAGE_RESOURCE_ID")?,
            tenant_id: require_env("AZURE_APP_TENANT_ID")?,
            client_id: require_env("AZURE_APP_CLIENT_ID")?,
        };
        let client_secret = SecretString::from(require_env("AZURE_APP_CLIENT_SECRET")?);

        Ok(Self {
            llm,
            llm_api_key,
            workspace,
            client_secret,
            tuning: load_tuning(config_dir).await,
        })
    }
}

/// Load orchestrator tunables from `{config_dir}/config.toml`.
///
/// - Missing file: defaults, at debug level.
/// - Unreadable or unparseable file: defaults, with a warning.
pub async fn load_tuning(config_dir: &Path) -> OrchestratorTuning {
    let config_path = config_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return OrchestratorTuning::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return OrchestratorTuning::default();
        }
    };

    match toml::from_str::<OrchestratorTuning>(&content) {
        Ok(tuning) => tuning,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            OrchestratorTuning::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_tuning_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let tuning = load_tuning(tmp.path()).await;
        assert_eq!(tuning.max_completion_tokens, 1024);
        assert_eq!(tuning.tool_step_budget, 8);
    }

    #[tokio::test]
    async fn load_tuning_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            "max_completion_tokens = 2048\ntemperature = 0.2\n",
        )
        .await
        .unwrap();

        let tuning = load_tuning(tmp.path()).await;
        assert_eq!(tuning.max_completion_tokens, 2048);
        assert!((tuning.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(tuning.tool_step_budget, 8);
    }

    #[tokio::test]
    async fn load_tuning_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "not { valid toml !!!")
            .await
            .unwrap();

        let tuning = load_tuning(tmp.path()).await;
        assert_eq!(tuning.max_completion_tokens, 1024);
    }
}
