use anyhow::Result;
use async_trait::async_trait;
use switchboard_config::Config;

use crate::models::{ModelPool, ModelTier};
use crate::registry::Agent;
use crate::runner::AgentRunner;
use crate::tools::python::RunPythonTool;
use crate::tools::ToolSet;

/// Routing description for the coder capability. The final clause exists
/// to bias the selector away from handing it raw code.
pub const CODER_DESCRIPTION: &str = "Useful when you need to transform natural language to \
python and execute the python code, returning the results of the code execution. \
DOES NOT ACCEPT CODE AS INPUT.";

/// Canned example prompts offered by the interaction surfaces, run through
/// the coder capability directly.
pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "Divide 4000 by 40",
    "Generate a pyramid pattern of asterisks of height 5",
    "Write a basic snake game using the pygame library",
];

const CODER_PREAMBLE: &str = "You are an agent designed to write and execute python code to \
answer questions. You have access to a run_python tool which executes a python script and \
returns its output. If you get an error, debug your code and try again. Only use the output \
of your code to answer the question. You might know the answer without running any code, but \
you should still run the code to get the answer. If it does not seem like you can write code \
to answer the question, just return \"I don't know\" as the answer.";

/// The generic code-execution agent: turns a natural-language request into
/// python, runs it, and answers from the execution output.
pub struct CoderAgent {
    runner: AgentRunner,
}

impl CoderAgent {
    pub fn new(config: &Config, models: &ModelPool) -> Self {
        let mut tools = ToolSet::new();
        tools.register(Box::new(RunPythonTool::new(
            config.tools.python.interpreter.clone(),
            config.tools.python.timeout_secs,
        )));

        let model = models.get(ModelTier::Coder);
        let defaults = &config.agents.defaults;
        let runner = AgentRunner::new(
            model.handle.clone(),
            model.name.clone(),
            CODER_PREAMBLE.to_string(),
            tools,
            defaults.max_tool_iterations as usize,
            defaults.temperature as f64,
            defaults.max_tokens as u64,
        );

        Self { runner }
    }
}

#[async_trait]
impl Agent for CoderAgent {
    async fn answer(&self, question: &str) -> Result<String> {
        self.runner.run(question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_prompts_are_natural_language() {
        // The coder capability never receives raw code; the canned prompts
        // must honor that.
        for prompt in EXAMPLE_PROMPTS {
            assert!(!prompt.contains("print("));
            assert!(!prompt.contains("import "));
        }
    }

    #[test]
    fn test_description_biases_selector_away_from_code_input() {
        assert!(CODER_DESCRIPTION.contains("DOES NOT ACCEPT CODE AS INPUT"));
    }
}
