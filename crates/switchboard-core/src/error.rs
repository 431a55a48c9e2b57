use thiserror::Error;

/// Failures surfaced by `Router::dispatch` and the gateway actions.
///
/// Every variant is recoverable at the interaction surface: it becomes an
/// inline error message and is never written to the history log. Startup
/// failures (agent factories, model construction) are not represented here —
/// those propagate out of `main` and abort the process before serving.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The capability-selection call itself failed.
    #[error("capability selection failed: {0}")]
    Selection(String),

    /// The selector named a capability that is not in the registry.
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),

    /// The chosen agent ran but failed to produce an answer.
    #[error("agent '{name}' failed: {message}")]
    Agent { name: String, message: String },

    /// The surface submitted a request the gateway cannot act on
    /// (e.g. an example prompt that is not in the canned list).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
