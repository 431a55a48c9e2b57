use async_trait::async_trait;
#[allow(deprecated)]
use rig::client::completion::CompletionModelHandle;
use rig::completion::{CompletionModel, CompletionRequest, Message, ToolDefinition};
use rig::message::{AssistantContent, Text, UserContent};
use rig::OneOrMany;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::registry::Descriptor;

/// Outcome of one capability selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Invoke the named capability. The router forwards the user's prompt
    /// verbatim — never the model's paraphrase of it.
    Invoke { capability: String },
    /// The engine answered directly instead of delegating; covers the
    /// instructed "I don't know" fallback. A normal answer, not an error.
    Answer(String),
}

/// Chooses at most one capability for a prompt.
///
/// One real implementation (an LLM call) and one deterministic double for
/// tests and offline use.
#[async_trait]
pub trait Selector: Send + Sync {
    async fn select(
        &self,
        question: &str,
        capabilities: &[Descriptor],
    ) -> Result<Selection, DispatchError>;
}

const ROUTING_PREAMBLE: &str = "You are a routing agent. You are given a user question and a set \
of tools, one per specialist agent. Pick the single best-matching tool for the question and call \
it, passing the question along. Call at most one tool. If no specialist fits, answer the question \
yourself in plain text; if you cannot answer it either, reply exactly \"I don't know\". Never \
guess a specialist that does not match.";

/// Selection delegated to an LLM: the capability set is presented as tool
/// definitions and the model's first tool call names the winner.
#[allow(deprecated)]
pub struct ModelSelector {
    model: CompletionModelHandle<'static>,
    model_name: String,
    temperature: f64,
    max_tokens: u64,
}

#[allow(deprecated)]
impl ModelSelector {
    pub fn new(
        model: CompletionModelHandle<'static>,
        model_name: String,
        temperature: f64,
        max_tokens: u64,
    ) -> Self {
        Self {
            model,
            model_name,
            temperature,
            max_tokens,
        }
    }
}

/// Tool definitions shown to the routing model, one per capability.
fn routing_tool_defs(capabilities: &[Descriptor]) -> Vec<ToolDefinition> {
    capabilities
        .iter()
        .map(|c| ToolDefinition {
            name: c.name.clone(),
            description: c.description.clone(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The user's question"
                    }
                },
                "required": ["question"]
            }),
        })
        .collect()
}

#[allow(deprecated)]
#[async_trait]
impl Selector for ModelSelector {
    async fn select(
        &self,
        question: &str,
        capabilities: &[Descriptor],
    ) -> Result<Selection, DispatchError> {
        let request = CompletionRequest {
            preamble: Some(ROUTING_PREAMBLE.to_string()),
            chat_history: OneOrMany::one(Message::User {
                content: OneOrMany::one(UserContent::Text(Text {
                    text: question.to_string(),
                })),
            }),
            documents: Vec::new(),
            tools: routing_tool_defs(capabilities),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            tool_choice: None,
            additional_params: None,
        };

        debug!(
            "Routing request to {}: {} candidate capabilities",
            self.model_name,
            capabilities.len()
        );

        let response = self
            .model
            .completion(request)
            .await
            .map_err(|e| DispatchError::Selection(e.to_string()))?;

        let mut text = String::new();
        for content in response.choice.iter() {
            match content {
                AssistantContent::ToolCall(tc) => {
                    // First tool call wins; the prompt itself is forwarded by
                    // the router, so the call arguments are ignored.
                    info!("Selector chose capability '{}'", tc.function.name);
                    return Ok(Selection::Invoke {
                        capability: tc.function.name.clone(),
                    });
                }
                AssistantContent::Text(t) => text.push_str(&t.text),
                _ => {}
            }
        }

        if text.is_empty() {
            text = "I don't know".to_string();
        }
        info!("Selector answered directly ({} chars)", text.len());
        Ok(Selection::Answer(text))
    }
}

/// Deterministic rule-based selector: first keyword hit wins, in rule
/// order; no hit yields the fallback answer.
pub struct KeywordSelector {
    rules: Vec<(Vec<String>, String)>,
    fallback: String,
}

impl KeywordSelector {
    pub fn new(rules: Vec<(Vec<String>, String)>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }
}

#[async_trait]
impl Selector for KeywordSelector {
    async fn select(
        &self,
        question: &str,
        capabilities: &[Descriptor],
    ) -> Result<Selection, DispatchError> {
        let lower = question.to_lowercase();
        for (keywords, capability) in &self.rules {
            if keywords.iter().any(|k| lower.contains(k.as_str())) {
                if !capabilities.iter().any(|c| &c.name == capability) {
                    return Err(DispatchError::UnknownCapability(capability.clone()));
                }
                return Ok(Selection::Invoke {
                    capability: capability.clone(),
                });
            }
        }
        Ok(Selection::Answer(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors() -> Vec<Descriptor> {
        vec![
            Descriptor {
                name: "python_coder".into(),
                description: "runs python".into(),
            },
            Descriptor {
                name: "cats_data".into(),
                description: "cat breeds".into(),
            },
        ]
    }

    fn selector() -> KeywordSelector {
        KeywordSelector::new(
            vec![
                (vec!["cat".into(), "persian".into()], "cats_data".into()),
                (vec!["python".into(), "code".into()], "python_coder".into()),
            ],
            "I don't know",
        )
    }

    #[tokio::test]
    async fn test_keyword_selector_picks_first_match() {
        let sel = selector();
        let result = sel
            .select("What is the average weight of a Persian cat?", &descriptors())
            .await
            .unwrap();
        assert_eq!(
            result,
            Selection::Invoke {
                capability: "cats_data".into()
            }
        );
    }

    #[tokio::test]
    async fn test_keyword_selector_fallback_answer() {
        let sel = selector();
        let result = sel
            .select("What's the weather on Mars?", &descriptors())
            .await
            .unwrap();
        assert_eq!(result, Selection::Answer("I don't know".into()));
    }

    #[tokio::test]
    async fn test_keyword_selector_rejects_unregistered_target() {
        let sel = KeywordSelector::new(
            vec![(vec!["cat".into()], "missing_agent".into())],
            "I don't know",
        );
        let err = sel.select("cat question", &descriptors()).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCapability(_)));
    }

    #[test]
    fn test_routing_tool_defs_carry_descriptions() {
        let defs = routing_tool_defs(&descriptors());
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "python_coder");
        assert_eq!(defs[1].description, "cat breeds");
        assert_eq!(defs[0].parameters["required"][0], "question");
    }
}
