use std::sync::Arc;

use tracing::{info, warn};

use crate::error::DispatchError;
use crate::registry::Registry;
use crate::selector::{Selection, Selector};

/// Top-level dispatcher: selector picks exactly one capability, the prompt
/// is forwarded to it unmodified, and its answer is returned unchanged.
/// No retry, no result transformation.
pub struct Router {
    selector: Arc<dyn Selector>,
    registry: Arc<Registry>,
}

impl Router {
    pub fn new(selector: Arc<dyn Selector>, registry: Arc<Registry>) -> Self {
        Self { selector, registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn dispatch(&self, prompt: &str) -> Result<String, DispatchError> {
        let descriptors = self.registry.descriptors();
        match self.selector.select(prompt, &descriptors).await? {
            Selection::Answer(text) => Ok(text),
            Selection::Invoke { capability } => {
                let cap = self
                    .registry
                    .get(&capability)
                    .ok_or_else(|| DispatchError::UnknownCapability(capability.clone()))?;

                info!("Dispatching question to '{capability}'");
                cap.answer(prompt).await.map_err(|e| {
                    warn!("Capability '{capability}' failed: {e:#}");
                    DispatchError::Agent {
                        name: capability,
                        message: e.to_string(),
                    }
                })
            }
        }
    }
}
