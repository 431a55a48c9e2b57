pub mod python;
pub mod table;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for tools callable by a sub-agent's LLM loop.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> serde_json::Value;
    async fn execute(&self, params: serde_json::Value) -> Result<String>;
}

/// The fixed tool set handed to one sub-agent.
pub struct ToolSet {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn list(&self) -> Vec<&dyn Tool> {
        self.tools.values().map(|t| t.as_ref()).collect()
    }

    pub async fn execute(&self, name: &str, params: serde_json::Value) -> Result<String> {
        match self.tools.get(name) {
            Some(tool) => {
                if let Some(missing) = missing_required(&params, &tool.parameters_schema()) {
                    return Ok(format!(
                        "Error: missing required parameter '{missing}' for tool '{name}'"
                    ));
                }
                tool.execute(params).await
            }
            None => anyhow::bail!("unknown tool: {name}"),
        }
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

/// First required field absent from `params`, if any.
fn missing_required(params: &serde_json::Value, schema: &serde_json::Value) -> Option<String> {
    let required = schema.get("required")?.as_array()?;
    let obj = params.as_object();
    for field in required.iter().filter_map(|f| f.as_str()) {
        let present = obj.map(|o| o.contains_key(field)).unwrap_or(false);
        if !present {
            return Some(field.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the input back"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string"}
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, params: serde_json::Value) -> Result<String> {
            Ok(params["text"].as_str().unwrap_or_default().to_string())
        }
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let mut set = ToolSet::new();
        set.register(Box::new(EchoTool));
        let out = set
            .execute("echo", serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_errors() {
        let set = ToolSet::new();
        assert!(set.execute("nope", serde_json::json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_required_reported_to_model() {
        let mut set = ToolSet::new();
        set.register(Box::new(EchoTool));
        let out = set.execute("echo", serde_json::json!({})).await.unwrap();
        assert!(out.contains("missing required parameter 'text'"));
    }
}
