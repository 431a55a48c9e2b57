use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// The four fixed datasets served by tabular agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Cats,
    Dogs,
    SleepPatterns,
    HealthyFoods,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Cats,
        Dataset::Dogs,
        Dataset::SleepPatterns,
        Dataset::HealthyFoods,
    ];

    /// Human-readable label used in agent prompts.
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Cats => "cat breeds",
            Dataset::Dogs => "dog breeds around the world",
            Dataset::SleepPatterns => "student sleep patterns",
            Dataset::HealthyFoods => "the 100 healthiest foods in the world",
        }
    }
}

/// The closed set of capabilities this gateway serves. Fixed at deployment
/// time — there is no dynamic registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Coder,
    Dataset(Dataset),
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::Coder,
        AgentKind::Dataset(Dataset::Cats),
        AgentKind::Dataset(Dataset::Dogs),
        AgentKind::Dataset(Dataset::SleepPatterns),
        AgentKind::Dataset(Dataset::HealthyFoods),
    ];

    /// Unique capability name, used as the tool name shown to the selector.
    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Coder => "python_coder",
            AgentKind::Dataset(Dataset::Cats) => "cats_data",
            AgentKind::Dataset(Dataset::Dogs) => "dogs_data",
            AgentKind::Dataset(Dataset::SleepPatterns) => "sleep_patterns_data",
            AgentKind::Dataset(Dataset::HealthyFoods) => "healthy_foods_data",
        }
    }
}

/// A question-answering agent behind one capability.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String>;
}

/// One registered capability: a name, the natural-language description the
/// selector routes on, and the handler.
pub struct Capability {
    pub kind: AgentKind,
    pub description: String,
    handler: Arc<dyn Agent>,
}

impl Capability {
    pub fn new(kind: AgentKind, description: impl Into<String>, handler: Arc<dyn Agent>) -> Self {
        Self {
            kind,
            description: description.into(),
            handler,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub async fn answer(&self, question: &str) -> Result<String> {
        self.handler.answer(question).await
    }
}

/// {name, description} pair handed to the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub name: String,
    pub description: String,
}

/// Static, ordered list of capabilities. Built once at startup; read-only
/// after construction.
pub struct Registry {
    capabilities: Vec<Capability>,
}

impl Registry {
    /// Build from an ordered capability list. Duplicate names are rejected.
    pub fn new(capabilities: Vec<Capability>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for cap in &capabilities {
            if !seen.insert(cap.name()) {
                anyhow::bail!("duplicate capability name '{}'", cap.name());
            }
        }
        Ok(Self { capabilities })
    }

    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// The {name, description} pairs, in registration order.
    pub fn descriptors(&self) -> Vec<Descriptor> {
        self.capabilities
            .iter()
            .map(|c| Descriptor {
                name: c.name().to_string(),
                description: c.description.clone(),
            })
            .collect()
    }
}
