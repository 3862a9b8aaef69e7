//! Run record and the structures threaded through the recovery pipeline.
//!
//! The record is created fresh for each run. Stages never mutate it directly:
//! each one hands back a [`StageOutput`] and [`RunRecord::apply`] appends the
//! log entry and sets exactly one field.

use serde::{Deserialize, Serialize};

use crate::learning::LearningRecord;
use crate::tools::{FlightConfirmation, GroundDispatch, TrainConfirmation};

/// One entry in the execution timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageLog {
    pub stage: u8,
    pub name: String,
    pub timestamp: String,
    pub concept: String,
    pub actions: Vec<String>,
    pub key_insight: String,

    /// Stage 4 only: narrative produced by the model or the static fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_reasoning: Option<String>,

    /// Stage 7 only: the briefing pushed to the executive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_message: Option<String>,

    /// Stage 8 only: the lesson captured for this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_record: Option<LearningRecord>,
}

/// Mission understanding assembled in stage 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub mission: String,
    pub objective: String,
    pub classification: String,
    pub deadline: String,
    pub negotiation_history: String,
    pub cultural_factor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalLink {
    pub cause: String,
    pub effect: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeOption {
    pub option: String,
    pub viable: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalAnalysis {
    pub trigger: String,
    pub chain: Vec<CausalLink>,
    pub alternative_evaluated: AlternativeOption,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub mode: String,
    pub route: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub name: String,
    pub segments: Vec<RouteSegment>,
    pub total_time: String,
    pub arrival_estimate: String,
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicPlan {
    pub primary_route: RoutePlan,
    pub reasoning_trace: String,
    pub confidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivacyActionKind {
    PiiRedaction,
    MissionShield,
    TokenGeneration,
}

impl PrivacyActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PiiRedaction => "PII_REDACTION",
            Self::MissionShield => "MISSION_SHIELD",
            Self::TokenGeneration => "TOKEN_GENERATION",
        }
    }
}

/// A cosmetic obfuscation step. Redactions carry `original`/`transformed`,
/// token generation carries `purpose`/`token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyAction {
    pub action: PrivacyActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub status: String,
}

impl PrivacyAction {
    pub fn redaction(kind: PrivacyActionKind, original: &str, transformed: &str) -> Self {
        Self {
            action: kind,
            original: Some(original.to_string()),
            transformed: Some(transformed.to_string()),
            purpose: None,
            token: None,
            status: "PROTECTED".to_string(),
        }
    }

    pub fn token(purpose: &str, token: &str) -> Self {
        Self {
            action: PrivacyActionKind::TokenGeneration,
            original: None,
            transformed: None,
            purpose: Some(purpose.to_string()),
            token: Some(token.to_string()),
            status: "ACTIVE".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingKind {
    Flight,
    Train,
    GroundTransport,
}

impl BookingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flight => "FLIGHT",
            Self::Train => "TRAIN",
            Self::GroundTransport => "GROUND_TRANSPORT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingDetails {
    Flight(FlightConfirmation),
    Train(TrainConfirmation),
    Ground(GroundDispatch),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "type")]
    pub kind: BookingKind,
    pub details: BookingDetails,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub departure: String,
    pub osaka_arrival: String,
    pub shinkansen: String,
    pub tokyo_arrival: String,
    pub venue_arrival: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSolution {
    pub status: String,
    pub protocol: String,
    pub route_summary: String,
    pub timeline: Timeline,
    pub buffer_time: String,
    pub privacy_status: String,
    pub bookings_secured: usize,
    pub confidence: String,
}

/// Partial update produced by a single stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    Timestamp(String),
    Context(ContextSummary),
    CausalAnalysis(CausalAnalysis),
    StrategicPlan(StrategicPlan),
    PrivacyActions(Vec<PrivacyAction>),
    Bookings(Vec<Booking>),
    FinalSolution(FinalSolution),
    LearningRecord(LearningRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub log: StageLog,
    pub update: StateUpdate,
}

/// The single record threaded through all eight stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub incident: String,
    pub timestamp: String,
    pub stage_logs: Vec<StageLog>,
    pub context: Option<ContextSummary>,
    pub causal_analysis: Option<CausalAnalysis>,
    pub strategic_plan: Option<StrategicPlan>,
    pub privacy_actions: Vec<PrivacyAction>,
    pub bookings: Vec<Booking>,
    pub final_solution: Option<FinalSolution>,
    pub learning_record: Option<LearningRecord>,
}

impl RunRecord {
    pub fn new(incident: &str) -> Self {
        Self {
            incident: incident.to_string(),
            ..Self::default()
        }
    }

    /// Merge one stage's output. The log only ever grows.
    pub fn apply(&mut self, output: StageOutput) {
        self.stage_logs.push(output.log);
        match output.update {
            StateUpdate::Timestamp(ts) => self.timestamp = ts,
            StateUpdate::Context(ctx) => self.context = Some(ctx),
            StateUpdate::CausalAnalysis(analysis) => self.causal_analysis = Some(analysis),
            StateUpdate::StrategicPlan(plan) => self.strategic_plan = Some(plan),
            StateUpdate::PrivacyActions(actions) => self.privacy_actions = actions,
            StateUpdate::Bookings(bookings) => self.bookings = bookings,
            StateUpdate::FinalSolution(solution) => self.final_solution = Some(solution),
            StateUpdate::LearningRecord(record) => self.learning_record = Some(record),
        }
    }

    /// Stage numbers in the order they were logged
    pub fn stage_numbers(&self) -> Vec<u8> {
        self.stage_logs.iter().map(|log| log.stage).collect()
    }
}
