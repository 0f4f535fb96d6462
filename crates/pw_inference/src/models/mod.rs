use std::str::FromStr;
use std::sync::Arc;

use pw_core::{Error, Result, TextGenerator, UsageTracker};

use crate::client::GenerationClient;
use crate::Config;

pub mod chat;
pub mod dummy;

pub use chat::ChatCompletionModel;
pub use dummy::DummyModel;

/// Which generator backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    /// The configured chat-completion providers.
    #[default]
    Remote,
    /// Deterministic offline filler.
    Dummy,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "remote" | "api" => Ok(ModelKind::Remote),
            "dummy" | "offline" => Ok(ModelKind::Dummy),
            other => Err(Error::InvalidRequest(format!("Unknown model kind: {}", other))),
        }
    }
}

pub fn create_model(kind: ModelKind, config: Config, usage: Arc<UsageTracker>) -> Result<Arc<dyn TextGenerator>> {
    match kind {
        ModelKind::Remote => Ok(Arc::new(GenerationClient::new(config, usage)?)),
        ModelKind::Dummy => Ok(Arc::new(DummyModel::new())),
    }
}
