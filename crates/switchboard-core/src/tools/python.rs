use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;

use super::Tool;

const MAX_OUTPUT_CHARS: usize = 10_000;

/// Executes python code generated by the coder agent.
///
/// The code is written to a scratch file and run under a subprocess
/// timeout; stdout, stderr, and a non-zero exit code are all reported back
/// to the model so it can debug and retry.
pub struct RunPythonTool {
    interpreter: String,
    timeout: Duration,
}

impl RunPythonTool {
    pub fn new(interpreter: String, timeout_secs: u64) -> Self {
        Self {
            interpreter,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl Tool for RunPythonTool {
    fn name(&self) -> &str {
        "run_python"
    }

    fn description(&self) -> &str {
        "Execute a python script and return its output. The script runs in a fresh \
         interpreter process with no state carried over between calls, so include \
         all imports and print the values you need to see."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Complete python source to execute"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String> {
        let code = params
            .get("code")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing required parameter: code"))?;

        let mut script = tempfile::Builder::new()
            .prefix("switchboard-")
            .suffix(".py")
            .tempfile()?;
        script.write_all(code.as_bytes())?;
        script.flush()?;

        let result = tokio::time::timeout(
            self.timeout,
            Command::new(&self.interpreter).arg(script.path()).output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                let mut parts = Vec::new();

                let stdout = String::from_utf8_lossy(&output.stdout);
                if !stdout.is_empty() {
                    parts.push(stdout.to_string());
                }

                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.trim().is_empty() {
                    parts.push(format!("STDERR:\n{stderr}"));
                }

                if !output.status.success() {
                    parts.push(format!(
                        "\nExit code: {}",
                        output.status.code().unwrap_or(-1)
                    ));
                }

                let result = if parts.is_empty() {
                    "(no output)".to_string()
                } else {
                    parts.join("\n")
                };

                if result.len() > MAX_OUTPUT_CHARS {
                    let cut = floor_char_boundary(&result, MAX_OUTPUT_CHARS);
                    Ok(format!(
                        "{}\n... (truncated, {} more chars)",
                        &result[..cut],
                        result.len() - cut
                    ))
                } else {
                    Ok(result)
                }
            }
            Ok(Err(e)) => Ok(format!("Error running {}: {e}", self.interpreter)),
            Err(_) => Ok(format!(
                "Error: Script timed out after {} seconds",
                self.timeout.as_secs()
            )),
        }
    }
}

/// Find the largest byte index <= `max` that is a UTF-8 char boundary.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut i = max;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
