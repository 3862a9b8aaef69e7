//! Sovereign agent common library - domain types, simulated tools and the
//! eight-stage recovery pipeline shared by the daemon and the CLI.

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod learning;
pub mod llm_client;
pub mod pipeline;
pub mod privacy;
pub mod tools;
pub mod types;

pub use agent::{AgentSettings, SovereignAgent};
pub use config::{Config, LlmConfig, PresentationConfig, ServerConfig};
pub use error::AgentError;
pub use llm_client::{FakeLlmClient, LlmClient, LlmError, OllamaClient};
pub use pipeline::{Stage, StageSummary, SIMULATED_REASONING};
pub use types::{BookingKind, PrivacyActionKind, RunRecord, StageLog};
