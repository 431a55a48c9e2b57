pub mod agents;
pub mod error;
pub mod gateway;
pub mod history;
pub mod models;
pub mod registry;
pub mod router;
pub mod runner;
pub mod selector;
pub mod table;
pub mod tools;

// Re-export key types
pub use error::DispatchError;
pub use gateway::{Gateway, Reply};
pub use history::HistoryStore;
pub use models::{ModelPool, ModelTier, TierModel};
pub use registry::{Agent, AgentKind, Capability, Dataset, Descriptor, Registry};
pub use router::Router;
pub use selector::{KeywordSelector, ModelSelector, Selection, Selector};
