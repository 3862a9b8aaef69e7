//! Sovereign Executive Agent: runs the eight stages once per call.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, LlmConfig};
use crate::context::MissionContext;
use crate::error::AgentError;
use crate::learning::ContinuousLearningModule;
use crate::llm_client::{LlmClient, OllamaClient};
use crate::pipeline::{self, Stage, StageSummary};
use crate::types::{RunRecord, StageOutput};

/// Per-run agent settings
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub use_llm: bool,
    pub context_path: PathBuf,
    pub llm: LlmConfig,
}

impl AgentSettings {
    pub fn from_config(config: &Config, use_llm: bool) -> Self {
        Self {
            use_llm,
            context_path: config.mission.context_path.clone(),
            llm: config.llm.clone(),
        }
    }
}

pub struct SovereignAgent {
    llm: Option<Arc<dyn LlmClient>>,
    mission_context: MissionContext,
    learning: ContinuousLearningModule,
}

impl SovereignAgent {
    /// Build an agent, connecting to the configured Ollama backend when the
    /// model is enabled. A backend that cannot be set up drops the agent
    /// into simulation mode.
    pub fn new(settings: &AgentSettings) -> Result<Self, AgentError> {
        let llm = if settings.use_llm {
            match OllamaClient::new(settings.llm.clone()) {
                Ok(client) => Some(Arc::new(client) as Arc<dyn LlmClient>),
                Err(e) => {
                    warn!("Local LLM not available ({}). Using simulation mode.", e);
                    None
                }
            }
        } else {
            None
        };
        Self::assemble(llm, settings)
    }

    /// Build an agent around a given client. The client is only kept when
    /// `settings.use_llm` is set.
    pub fn with_client(
        settings: &AgentSettings,
        client: Arc<dyn LlmClient>,
    ) -> Result<Self, AgentError> {
        Self::assemble(settings.use_llm.then_some(client), settings)
    }

    fn assemble(
        llm: Option<Arc<dyn LlmClient>>,
        settings: &AgentSettings,
    ) -> Result<Self, AgentError> {
        Ok(Self {
            llm,
            mission_context: MissionContext::load(&settings.context_path)?,
            learning: ContinuousLearningModule::new(),
        })
    }

    /// Whether stage 4 will consult the model
    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn mission_context(&self) -> &MissionContext {
        &self.mission_context
    }

    pub fn learning(&self) -> &ContinuousLearningModule {
        &self.learning
    }

    /// Execute the full recovery workflow for one incident
    pub async fn run(&mut self, incident: &str) -> Result<RunRecord, AgentError> {
        info!("Recovery run starting (llm: {})", self.uses_llm());
        let mut record = RunRecord::new(incident);

        for stage in Stage::ALL {
            let output = self.execute(stage, &record).await?;
            info!("  Stage {}: {}", stage.number(), stage.title());
            record.apply(output);
        }

        info!("Recovery run complete: {} stages logged", record.stage_logs.len());
        Ok(record)
    }

    async fn execute(&mut self, stage: Stage, record: &RunRecord) -> Result<StageOutput, AgentError> {
        let output = match stage {
            Stage::EdgeDetection => pipeline::edge_detection(record),
            Stage::ContextualAnalysis => pipeline::contextual_analysis(&self.mission_context),
            Stage::CausalEvaluation => pipeline::causal_evaluation(),
            Stage::StrategicReasoning => pipeline::strategic_reasoning(self.llm.as_deref()).await,
            Stage::PrivacyShield => pipeline::privacy_shield()?,
            Stage::AgenticExecution => pipeline::agentic_execution(),
            Stage::HumanNotification => pipeline::human_notification(record),
            Stage::ContinuousLearning => pipeline::continuous_learning(record, &mut self.learning)?,
        };
        Ok(output)
    }

    /// Stage table for documentation
    pub fn stage_summary() -> Vec<StageSummary> {
        Stage::ALL.iter().map(Stage::summary).collect()
    }
}
