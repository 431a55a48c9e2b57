use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
    pub datasets: DatasetsConfig,
    pub tools: ToolsConfig,
    pub history: HistoryConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
    /// Named model tiers. Must contain at least a "default" entry.
    /// Supported tiers: "default" (routing), "coder", "tabular".
    pub models: HashMap<String, ModelRef>,
}

/// Reference to a provider + model combination for a named tier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelRef {
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDefaults {
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_tool_iterations: u32,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.0,
            max_tool_iterations: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
    pub ollama: Option<ProviderConfig>,
    pub openrouter: Option<ProviderConfig>,
    pub groq: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

/// Paths to the fixed CSV datasets, one per tabular agent.
/// Defaults keep the original dataset filenames, resolved relative to
/// `dataDir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetsConfig {
    pub data_dir: String,
    pub cats: String,
    pub dogs: String,
    pub sleep_patterns: String,
    pub healthy_foods: String,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.switchboard/data".into(),
            cats: "cats_dataset.csv".into(),
            dogs: "dogs_breads_around_world.csv".into(),
            sleep_patterns: "student_sleep_patterns.csv".into(),
            healthy_foods: "top_100_healthiest_food_in_the_world.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub python: PythonToolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PythonToolConfig {
    /// Interpreter executable used by the coder agent.
    pub interpreter: String,
    pub timeout_secs: u64,
}

impl Default for PythonToolConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Append-only interaction log, one question/answer line per entry.
    pub path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: "~/.switchboard/history.txt".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8590,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.history.path, "~/.switchboard/history.txt");
        assert_eq!(cfg.gateway.port, 8590);
        assert_eq!(cfg.tools.python.interpreter, "python3");
        assert_eq!(cfg.datasets.cats, "cats_dataset.csv");
        assert!(cfg.agents.models.is_empty());
    }

    #[test]
    fn camel_case_fields_parsed() {
        let cfg: Config = serde_json::from_value(serde_json::json!({
            "datasets": {
                "dataDir": "/srv/data",
                "sleepPatterns": "sleep.csv"
            },
            "tools": {
                "python": { "timeoutSecs": 5 }
            }
        }))
        .unwrap();
        assert_eq!(cfg.datasets.data_dir, "/srv/data");
        assert_eq!(cfg.datasets.sleep_patterns, "sleep.csv");
        assert_eq!(cfg.tools.python.timeout_secs, 5);
        // untouched fields keep their defaults
        assert_eq!(cfg.datasets.dogs, "dogs_breads_around_world.csv");
    }

    #[test]
    fn model_tiers_parsed() {
        let cfg: Config = serde_json::from_value(serde_json::json!({
            "agents": {
                "models": {
                    "default": { "provider": "openai", "model": "gpt-4-turbo" },
                    "coder": { "provider": "openai", "model": "gpt-4o" }
                }
            }
        }))
        .unwrap();
        assert_eq!(cfg.agents.models["default"].model, "gpt-4-turbo");
        assert_eq!(cfg.agents.models["coder"].provider, "openai");
    }

    #[test]
    fn provider_api_key_optional() {
        let cfg: Config = serde_json::from_value(serde_json::json!({
            "providers": {
                "openai": { "apiKey": "sk-test" },
                "ollama": { "apiBase": "http://localhost:11434" }
            }
        }))
        .unwrap();
        assert_eq!(
            cfg.providers.openai.as_ref().unwrap().api_key.as_deref(),
            Some("sk-test")
        );
        assert!(cfg.providers.ollama.as_ref().unwrap().api_key.is_none());
    }
}
