use std::fmt;

#[allow(deprecated)]
use rig::client::completion::CompletionModelHandle;

/// The three places a model is consulted. Like the capability set, the
/// tier set is closed: the router runs on `Routing`, the coder agent on
/// `Coder`, the dataset agents on `Tabular`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Routing,
    Coder,
    Tabular,
}

impl ModelTier {
    /// Config key for this tier under `agents.models`.
    pub fn key(self) -> &'static str {
        match self {
            ModelTier::Routing => "default",
            ModelTier::Coder => "coder",
            ModelTier::Tabular => "tabular",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One constructed model: the rig handle plus its name for logging.
#[allow(deprecated)]
#[derive(Clone)]
pub struct TierModel {
    pub handle: CompletionModelHandle<'static>,
    pub name: String,
}

/// The models backing each tier. "default" is mandatory; the specialist
/// tiers fall back to it when not configured, mirroring a deployment that
/// runs everything on one model.
#[allow(deprecated)]
#[derive(Clone)]
pub struct ModelPool {
    routing: TierModel,
    coder: Option<TierModel>,
    tabular: Option<TierModel>,
}

#[allow(deprecated)]
impl ModelPool {
    pub fn new(routing: TierModel, coder: Option<TierModel>, tabular: Option<TierModel>) -> Self {
        Self {
            routing,
            coder,
            tabular,
        }
    }

    /// The model for a tier, falling back to the "default" tier.
    pub fn get(&self, tier: ModelTier) -> &TierModel {
        let specialist = match tier {
            ModelTier::Routing => None,
            ModelTier::Coder => self.coder.as_ref(),
            ModelTier::Tabular => self.tabular.as_ref(),
        };
        specialist.unwrap_or(&self.routing)
    }
}
