use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::agents::coder::EXAMPLE_PROMPTS;
use crate::error::DispatchError;
use crate::history::HistoryStore;
use crate::registry::{AgentKind, Registry};
use crate::router::Router;

/// Successful outcome of a gateway action. The answer is always present;
/// a history-append failure is carried alongside it rather than voiding
/// the answer.
#[derive(Debug)]
pub struct Reply {
    pub answer: String,
    pub history_error: Option<String>,
}

/// Explicit application context: registry, router, and history log,
/// constructed once in the binary and shared by every surface.
pub struct Gateway {
    router: Router,
    registry: Arc<Registry>,
    history: HistoryStore,
}

impl Gateway {
    pub fn new(router: Router, registry: Arc<Registry>, history: HistoryStore) -> Self {
        Self {
            router,
            registry,
            history,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Dispatch a free-form question through the router. On success the
    /// pair is appended to history; failed dispatches are never persisted.
    pub async fn ask(&self, question: &str) -> Result<Reply, DispatchError> {
        let answer = self.router.dispatch(question).await?;
        Ok(self.record(question, answer))
    }

    /// Run one of the canned coder examples, invoking the coder capability
    /// directly (the router is not consulted).
    pub async fn run_example(&self, prompt: &str) -> Result<Reply, DispatchError> {
        if !EXAMPLE_PROMPTS.contains(&prompt) {
            return Err(DispatchError::InvalidRequest(format!(
                "'{prompt}' is not one of the canned examples"
            )));
        }

        let coder = self
            .registry
            .get(AgentKind::Coder.name())
            .ok_or_else(|| DispatchError::UnknownCapability(AgentKind::Coder.name().into()))?;

        info!("Running canned example via '{}'", coder.name());
        let answer = coder
            .answer(prompt)
            .await
            .map_err(|e| DispatchError::Agent {
                name: coder.name().to_string(),
                message: e.to_string(),
            })?;
        Ok(self.record(prompt, answer))
    }

    /// Full history log, verbatim lines in append order.
    pub fn history_lines(&self) -> Result<Vec<String>> {
        self.history.load_all()
    }

    fn record(&self, question: &str, answer: String) -> Reply {
        let history_error = match self.history.append(question, &answer) {
            Ok(()) => None,
            Err(e) => {
                warn!("History append failed: {e:#}");
                Some(e.to_string())
            }
        };
        Reply {
            answer,
            history_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::registry::{Agent, Capability, Dataset};
    use crate::selector::KeywordSelector;

    struct FixedAgent(&'static str);

    #[async_trait]
    impl Agent for FixedAgent {
        async fn answer(&self, _question: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl Agent for FailingAgent {
        async fn answer(&self, _question: &str) -> anyhow::Result<String> {
            anyhow::bail!("boom")
        }
    }

    fn gateway_in(dir: &tempfile::TempDir, coder: Arc<dyn Agent>) -> Gateway {
        let registry = Arc::new(
            Registry::new(vec![
                Capability::new(AgentKind::Coder, "runs python", coder),
                Capability::new(
                    AgentKind::Dataset(Dataset::Cats),
                    "cat breeds",
                    Arc::new(FixedAgent("cats answer")),
                ),
            ])
            .unwrap(),
        );
        let selector = KeywordSelector::new(
            vec![
                (vec!["cat".into()], "cats_data".into()),
                (vec!["python".into()], "python_coder".into()),
            ],
            "I don't know",
        );
        let router = Router::new(Arc::new(selector), registry.clone());
        let history = HistoryStore::new(dir.path().join("history.txt"));
        Gateway::new(router, registry, history)
    }

    #[tokio::test]
    async fn test_ask_success_appends_history() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway_in(&dir, Arc::new(FixedAgent("42")));

        let reply = gw.ask("tell me about a cat").await.unwrap();
        assert_eq!(reply.answer, "cats answer");
        assert!(reply.history_error.is_none());

        let lines = gw.history_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("tell me about a cat-->cats answer"));
    }

    #[tokio::test]
    async fn test_ask_failure_never_persists() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway_in(&dir, Arc::new(FailingAgent));

        assert!(gw.ask("python please").await.is_err());
        assert!(gw.history_lines().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_answer_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway_in(&dir, Arc::new(FixedAgent("42")));

        let reply = gw.ask("unroutable question").await.unwrap();
        assert_eq!(reply.answer, "I don't know");
        let lines = gw.history_lines().unwrap();
        assert!(lines[0].ends_with("unroutable question-->I don't know"));
    }

    #[tokio::test]
    async fn test_run_example_requires_canned_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway_in(&dir, Arc::new(FixedAgent("done")));

        let err = gw.run_example("rm -rf / please").await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
        assert!(gw.history_lines().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_example_hits_coder_directly() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway_in(&dir, Arc::new(FixedAgent("100")));

        let reply = gw.run_example(EXAMPLE_PROMPTS[0]).await.unwrap();
        assert_eq!(reply.answer, "100");
        let lines = gw.history_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(EXAMPLE_PROMPTS[0]));
    }
}
