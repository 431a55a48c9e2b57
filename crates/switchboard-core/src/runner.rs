use anyhow::Result;
#[allow(deprecated)]
use rig::client::completion::CompletionModelHandle;
use rig::completion::{CompletionModel, CompletionRequest, Message, ToolDefinition};
use rig::message::{AssistantContent, Text, ToolCall, ToolResult, ToolResultContent, UserContent};
use rig::OneOrMany;
use tracing::{debug, info, warn};

use crate::tools::ToolSet;

/// LLM ↔ tool loop shared by every sub-agent.
///
/// One question in, one answer out: the model is called with the agent's
/// preamble and tool set, tool calls are executed and their results fed
/// back, until the model produces a plain text response or the iteration
/// cap is reached. Tool failures are reported back to the model as tool
/// results so it can debug and retry; only LLM transport errors abort
/// the run.
#[allow(deprecated)]
pub struct AgentRunner {
    model: CompletionModelHandle<'static>,
    model_name: String,
    preamble: String,
    tools: ToolSet,
    max_iterations: usize,
    temperature: f64,
    max_tokens: u64,
}

#[allow(deprecated)]
impl AgentRunner {
    pub fn new(
        model: CompletionModelHandle<'static>,
        model_name: String,
        preamble: String,
        tools: ToolSet,
        max_iterations: usize,
        temperature: f64,
        max_tokens: u64,
    ) -> Self {
        Self {
            model,
            model_name,
            preamble,
            tools,
            max_iterations,
            temperature,
            max_tokens,
        }
    }

    /// Run the loop for one question and return the model's final text.
    pub async fn run(&self, question: &str) -> Result<String> {
        let tool_defs: Vec<ToolDefinition> = self
            .tools
            .list()
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();

        let mut chat_history: Vec<Message> = Vec::new();
        let mut current_prompt = Message::User {
            content: OneOrMany::one(UserContent::Text(Text {
                text: question.to_string(),
            })),
        };

        for iteration in 0..self.max_iterations {
            let mut all_messages = chat_history.clone();
            all_messages.push(current_prompt.clone());

            debug!(
                "LLM request [{}/{}] to {}: {} messages",
                iteration + 1,
                self.max_iterations,
                self.model_name,
                all_messages.len()
            );

            let request = CompletionRequest {
                preamble: Some(self.preamble.clone()),
                chat_history: OneOrMany::many(all_messages)
                    .unwrap_or_else(|_| OneOrMany::one(current_prompt.clone())),
                documents: Vec::new(),
                tools: tool_defs.clone(),
                temperature: Some(self.temperature),
                max_tokens: Some(self.max_tokens),
                tool_choice: None,
                additional_params: None,
            };

            let response = self
                .model
                .completion(request)
                .await
                .map_err(|e| anyhow::anyhow!("LLM completion error: {e}"))?;

            let mut text_content = String::new();
            let mut tool_calls_to_execute: Vec<ToolCall> = Vec::new();

            for content in response.choice.iter() {
                match content {
                    AssistantContent::Text(t) => {
                        text_content.push_str(&t.text);
                    }
                    AssistantContent::ToolCall(tc) => {
                        tool_calls_to_execute.push(tc.clone());
                    }
                    _ => {}
                }
            }

            if tool_calls_to_execute.is_empty() {
                // Model returned a text response — we're done
                if text_content.is_empty() {
                    text_content = "I've completed processing but have no response to give.".into();
                }
                return Ok(text_content);
            }

            // Record the assistant turn, then execute each tool call
            chat_history.push(current_prompt);
            chat_history.push(Message::Assistant {
                id: None,
                content: response.choice.clone(),
            });

            let mut tool_results: Vec<UserContent> = Vec::new();
            for tc in &tool_calls_to_execute {
                let tool_name = &tc.function.name;
                let tool_args = &tc.function.arguments;

                info!(
                    "Tool call [{}/{}]: {tool_name}",
                    iteration + 1,
                    self.max_iterations
                );

                let result = match self.tools.execute(tool_name, tool_args.clone()).await {
                    Ok(r) => r,
                    Err(e) => format!("Error executing {tool_name}: {e}"),
                };

                tool_results.push(UserContent::ToolResult(ToolResult {
                    id: tc.id.clone(),
                    call_id: tc.call_id.clone(),
                    content: OneOrMany::one(ToolResultContent::Text(Text { text: result })),
                }));
            }

            current_prompt = Message::User {
                content: OneOrMany::many(tool_results).unwrap_or_else(|_| {
                    OneOrMany::one(UserContent::Text(Text {
                        text: "Tool execution completed.".into(),
                    }))
                }),
            };
        }

        warn!(
            "Agent loop reached max iterations ({}) without final response",
            self.max_iterations
        );
        Ok(
            "I've been working on this but reached the maximum number of iterations. \
             Here's what I've done so far."
                .to_string(),
        )
    }
}
