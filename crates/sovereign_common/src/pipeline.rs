//! The eight recovery stages.
//!
//! Each stage reads the record built so far and returns a [`StageOutput`].
//! Order is fixed by [`Stage::ALL`]; there is no branching and no retry.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::MissionContext;
use crate::error::AgentError;
use crate::learning::ContinuousLearningModule;
use crate::llm_client::LlmClient;
use crate::privacy::{create_anonymous_token, hash_pii, redact_request, TravelRequest};
use crate::tools::{
    book_flight, book_train, dispatch_driver, search_flights, FlightRequest, TrainRequest,
};
use crate::types::{
    AlternativeOption, Booking, BookingDetails, BookingKind, CausalAnalysis, CausalLink,
    ContextSummary, FinalSolution, PrivacyAction, PrivacyActionKind, RoutePlan, RouteSegment,
    RunRecord, StageLog, StageOutput, StateUpdate, StrategicPlan, Timeline,
};

/// Narrative used when the local model is off or fails
pub const SIMULATED_REASONING: &str = "REASONING CHAIN:
1. Direct Tokyo access blocked → must find bypass
2. Osaka (KIX) has availability + Shinkansen infrastructure
3. Flight 01:20 + landing 19:45 + transit + Nozomi 06:00 = feasible
4. Arrival 08:15 gives 45min buffer for contingencies
RECOMMENDATION: Execute Osaka Bypass Protocol immediately.";

/// Instruction sent to the local model in stage 4
pub const STRATEGY_PROMPT: &str = "You are a strategic logistics AI. A CEO must reach Tokyo by 09:00 AM for a critical M&A signing.
Their direct flight was cancelled at 23:00.

CONSTRAINTS:
- All direct Tokyo flights (HND/NRT) are unavailable until noon tomorrow
- The meeting CANNOT be moved or done virtually
- Time is the #1 priority

AVAILABLE OPTIONS:
- Osaka Kansai (KIX): Flights available, then Shinkansen to Tokyo (2h15m)
- Nagoya (NGO): Limited availability, then Shinkansen (1h40m)

Reason step-by-step and recommend the best intermodal route.
Keep response under 100 words. Be direct and tactical.";

/// Incident type recorded by the learning stage
pub const INCIDENT_TYPE: &str = "M&A Travel Disruption";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EdgeDetection,
    ContextualAnalysis,
    CausalEvaluation,
    StrategicReasoning,
    PrivacyShield,
    AgenticExecution,
    HumanNotification,
    ContinuousLearning,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::EdgeDetection,
        Stage::ContextualAnalysis,
        Stage::CausalEvaluation,
        Stage::StrategicReasoning,
        Stage::PrivacyShield,
        Stage::AgenticExecution,
        Stage::HumanNotification,
        Stage::ContinuousLearning,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Stage::EdgeDetection => 1,
            Stage::ContextualAnalysis => 2,
            Stage::CausalEvaluation => 3,
            Stage::StrategicReasoning => 4,
            Stage::PrivacyShield => 5,
            Stage::AgenticExecution => 6,
            Stage::HumanNotification => 7,
            Stage::ContinuousLearning => 8,
        }
    }

    /// Title shown in the timeline
    pub fn title(&self) -> &'static str {
        match self {
            Stage::EdgeDetection => "EDGE AI - Local Detection",
            Stage::ContextualAnalysis => "CONTEXTUAL AI - Mission Understanding",
            Stage::CausalEvaluation => "CAUSAL AI - Consequence Mapping",
            Stage::StrategicReasoning => "TRUE REASONING - Strategic Planning",
            Stage::PrivacyShield => "SOVEREIGN AI + PRIVACY SHIELD",
            Stage::AgenticExecution => "AGENTIC AI - Autonomous Execution",
            Stage::HumanNotification => "HUMAN-AI COLLABORATION - Executive Briefing",
            Stage::ContinuousLearning => "CONTINUOUS LEARNING - Knowledge Capture",
        }
    }

    pub fn concept(&self) -> &'static str {
        match self {
            Stage::EdgeDetection => "Edge AI",
            Stage::ContextualAnalysis => "Contextual AI",
            Stage::CausalEvaluation => "Causal AI",
            Stage::StrategicReasoning => "True Reasoning",
            Stage::PrivacyShield => "Sovereign AI & Privacy Preserving Techniques",
            Stage::AgenticExecution => "Agentic AI",
            Stage::HumanNotification => "Human-AI Collaboration",
            Stage::ContinuousLearning => "Continuous Learning",
        }
    }

    /// Narrative clock, not wall time
    pub fn timestamp(&self) -> &'static str {
        match self {
            Stage::EdgeDetection => "23:00:00",
            Stage::ContextualAnalysis => "23:01:00",
            Stage::CausalEvaluation => "23:02:00",
            Stage::StrategicReasoning => "23:03:00",
            Stage::PrivacyShield => "23:04:00",
            Stage::AgenticExecution => "23:05:00",
            Stage::HumanNotification => "23:06:00",
            Stage::ContinuousLearning => "Day +7",
        }
    }

    pub fn key_insight(&self) -> &'static str {
        match self {
            Stage::EdgeDetection => "Intelligence at the edge: data stays where it's generated.",
            Stage::ContextualAnalysis => {
                "Without context, data is just noise. The AI understands THIS meeting matters."
            }
            Stage::CausalEvaluation => {
                "The AI doesn't just predict outcomes - it understands mechanisms."
            }
            Stage::StrategicReasoning => {
                "Real reasoning = solving problems never seen before through deduction."
            }
            Stage::PrivacyShield => "Privacy is not an option - it's an architecture decision.",
            Stage::AgenticExecution => "Agentic AI doesn't ask unnecessary questions. It solves.",
            Stage::HumanNotification => "AI handles complexity so humans can focus on what matters.",
            Stage::ContinuousLearning => "Experience only has value if it's captured and applied.",
        }
    }

    pub fn summary(&self) -> StageSummary {
        let (name, description) = match self {
            Stage::EdgeDetection => ("Edge AI", "Local incident detection"),
            Stage::ContextualAnalysis => ("Contextual AI", "Mission understanding"),
            Stage::CausalEvaluation => ("Causal AI", "Consequence analysis"),
            Stage::StrategicReasoning => ("True Reasoning", "Strategic planning"),
            Stage::PrivacyShield => ("Sovereign AI + Privacy", "Protected queries"),
            Stage::AgenticExecution => ("Agentic AI", "Autonomous execution"),
            Stage::HumanNotification => ("Human-AI Collaboration", "Executive notification"),
            Stage::ContinuousLearning => ("Continuous Learning", "Knowledge capture"),
        };
        StageSummary {
            stage: self.number(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// Log skeleton with the fixed per-stage fields filled in
    fn log(&self, actions: Vec<String>) -> StageLog {
        StageLog {
            stage: self.number(),
            name: self.title().to_string(),
            timestamp: self.timestamp().to_string(),
            concept: self.concept().to_string(),
            actions,
            key_insight: self.key_insight().to_string(),
            llm_reasoning: None,
            executive_message: None,
            learning_record: None,
        }
    }
}

/// One line of the documentation table of stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: u8,
    pub name: String,
    pub description: String,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Stage 1: edge detection
// ============================================================================

pub fn edge_detection(record: &RunRecord) -> StageOutput {
    let stage = Stage::EdgeDetection;
    let mut actions = lines(&[
        "📱 Alert intercepted on secure executive device",
        "🔒 Processing locally - NO cloud transmission",
        "⚡ Latency: <50ms (edge processing)",
    ]);
    actions.push(format!("🚨 INCIDENT: {}", record.incident));

    StageOutput {
        log: stage.log(actions),
        update: StateUpdate::Timestamp(stage.timestamp().to_string()),
    }
}

// ============================================================================
// Stage 2: contextual analysis
// ============================================================================

pub fn contextual_analysis(mission: &MissionContext) -> StageOutput {
    let summary = ContextSummary {
        mission: mission
            .mission_name
            .clone()
            .unwrap_or_else(|| "Operation Sakura".to_string()),
        objective: mission
            .objective
            .clone()
            .unwrap_or_else(|| "M&A Signing".to_string()),
        classification: mission
            .classification
            .clone()
            .unwrap_or_else(|| "SOVEREIGN".to_string()),
        deadline: "09:00 AM Tokyo Time".to_string(),
        negotiation_history: "6 months of preparation".to_string(),
        cultural_factor: "Physical presence MANDATORY for Japanese business protocol".to_string(),
    };

    let actions = vec![
        format!("🔐 Accessing encrypted calendar: '{}'", summary.mission),
        format!("📋 Mission: {}", summary.objective),
        format!("⏰ Deadline: {}", summary.deadline),
        "📊 Context loaded: 6 months of M&A negotiations at stake".to_string(),
        "🎌 Cultural Intel: Video conference NOT acceptable for signing".to_string(),
    ];

    StageOutput {
        log: Stage::ContextualAnalysis.log(actions),
        update: StateUpdate::Context(summary),
    }
}

// ============================================================================
// Stage 3: causal evaluation
// ============================================================================

pub fn causal_evaluation() -> StageOutput {
    let chain = [
        ("CEO misses flight", "Cannot reach Tokyo by 09:00"),
        ("Physical absence at signing", "Loss of face (mentsu) for partner"),
        ("Cultural breach", "Trust breakdown with Tanaka-san"),
        ("Trust breakdown", "Deal termination after 6 months"),
    ]
    .into_iter()
    .map(|(cause, effect)| CausalLink {
        cause: cause.to_string(),
        effect: effect.to_string(),
    })
    .collect();

    let analysis = CausalAnalysis {
        trigger: "Flight cancellation".to_string(),
        chain,
        alternative_evaluated: AlternativeOption {
            option: "Video conference".to_string(),
            viable: false,
            reason: "Japanese business culture requires physical presence for trust validation"
                .to_string(),
        },
        severity: "CRITICAL - Direct causal link to deal failure".to_string(),
    };

    let actions = lines(&[
        "🔗 Building causal chain analysis...",
        "   └─ Absence → Loss of Face → Trust Breach → Deal Failure",
        "🎥 Video conference evaluated: REJECTED (cultural mismatch)",
        "⚠️  SEVERITY: CRITICAL - 6-month deal at risk",
        "🧠 Causal insight: Correlation ≠ Causation. Understanding WHY matters.",
    ]);

    StageOutput {
        log: Stage::CausalEvaluation.log(actions),
        update: StateUpdate::CausalAnalysis(analysis),
    }
}

// ============================================================================
// Stage 4: strategic reasoning
// ============================================================================

/// Ask the model for a narrative, falling back to the static text on any failure
pub async fn reasoning_narrative(llm: Option<&dyn LlmClient>) -> String {
    let Some(client) = llm else {
        return SIMULATED_REASONING.to_string();
    };

    match client.generate(STRATEGY_PROMPT).await {
        Ok(text) => text,
        Err(e) => {
            debug!("Model {} failed, using simulated reasoning: {}", client.model(), e);
            SIMULATED_REASONING.to_string()
        }
    }
}

pub fn osaka_bypass_route() -> RoutePlan {
    let segments = [
        ("Flight", "CDG → KIX (Osaka)", "12h 25m"),
        ("Shinkansen", "Osaka → Tokyo", "2h 15m"),
        ("Ground", "Tokyo Station → Venue", "25m"),
    ]
    .into_iter()
    .map(|(mode, route, duration)| RouteSegment {
        mode: mode.to_string(),
        route: route.to_string(),
        duration: duration.to_string(),
    })
    .collect();

    RoutePlan {
        name: "Osaka Bypass Protocol".to_string(),
        segments,
        total_time: "15h 05m".to_string(),
        arrival_estimate: "08:15 AM Tokyo Time".to_string(),
        buffer: "45 minutes before deadline".to_string(),
    }
}

pub async fn strategic_reasoning(llm: Option<&dyn LlmClient>) -> StageOutput {
    let reasoning = reasoning_narrative(llm).await;

    let plan = StrategicPlan {
        primary_route: osaka_bypass_route(),
        reasoning_trace: reasoning.clone(),
        confidence: "94%".to_string(),
    };

    let actions = lines(&[
        "🧮 Evaluating all possible routes...",
        "   ├─ Direct Tokyo (NRT/HND): ❌ No availability before noon",
        "   ├─ Osaka Bypass (KIX + Shinkansen): ✅ Arrival 08:15 AM",
        "   └─ Nagoya Route (NGO + Shinkansen): ⚠️ Tighter margin",
        "🎯 SELECTED: Osaka Bypass Protocol",
        "⏱️  ETA: 08:15 AM (45min buffer)",
        "🧠 This is TRUE REASONING: solving a novel problem through logic, not patterns.",
    ]);

    let mut log = Stage::StrategicReasoning.log(actions);
    log.llm_reasoning = Some(reasoning);

    StageOutput {
        log,
        update: StateUpdate::StrategicPlan(plan),
    }
}

// ============================================================================
// Stage 5: privacy shield
// ============================================================================

const PASSENGER: &str = "CEO Global Tech";
const MISSION_LABEL: &str = "Operation Sakura - M&A Signing";

pub fn privacy_shield() -> Result<StageOutput, AgentError> {
    let request = TravelRequest {
        passenger: PASSENGER.to_string(),
        mission: "Operation Sakura".to_string(),
        origin: Some("CDG".to_string()),
        destination: Some("KIX".to_string()),
    };

    let anonymized = redact_request(&request);
    let corporate_token = create_anonymous_token();
    let hashed_identity = hash_pii(PASSENGER);

    let privacy_actions = vec![
        PrivacyAction::redaction(PrivacyActionKind::PiiRedaction, PASSENGER, &hashed_identity),
        PrivacyAction::redaction(PrivacyActionKind::MissionShield, MISSION_LABEL, "[CLASSIFIED]"),
        PrivacyAction::token("Anonymous payment authorization", &corporate_token),
    ];

    let flight_query = search_flights("CDG", "KIX", true);
    debug!(
        "Anonymized query {} returned {} services",
        flight_query.route,
        flight_query.results.len()
    );

    let payload = serde_json::to_string_pretty(&anonymized)?;
    let payload_preview: String = payload.chars().take(100).collect();

    let actions = vec![
        "🛡️  PRIVACY SHIELD ACTIVATED".to_string(),
        format!("   └─ Identity: {} → {}", PASSENGER, hashed_identity),
        "   └─ Mission: [REDACTED FROM EXTERNAL QUERIES]".to_string(),
        format!("   └─ Payment: Corporate Token {}", corporate_token),
        "🌐 EXTERNAL QUERY (Anonymized):".to_string(),
        "   └─ Endpoint: flight-api.global/availability".to_string(),
        format!("   └─ Payload: {}...", payload_preview),
        "✅ Flight availability confirmed WITHOUT identity disclosure".to_string(),
        "🔒 All PII remains within SOVEREIGN PERIMETER".to_string(),
    ];

    Ok(StageOutput {
        log: Stage::PrivacyShield.log(actions),
        update: StateUpdate::PrivacyActions(privacy_actions),
    })
}

// ============================================================================
// Stage 6: agentic execution
// ============================================================================

pub fn agentic_execution() -> StageOutput {
    let corporate_token = create_anonymous_token();

    let flight = book_flight(
        &FlightRequest {
            flight: "JL416".to_string(),
            route: "CDG-KIX".to_string(),
            departure: "01:20".to_string(),
        },
        &corporate_token,
    );
    let train = book_train(
        &TrainRequest {
            train: "Nozomi 64".to_string(),
            departure: "06:00".to_string(),
            route: "Osaka-Tokyo".to_string(),
        },
        &corporate_token,
    );
    let ground = dispatch_driver("Tokyo Station", "08:15", true);

    let actions = vec![
        "🤖 AUTONOMOUS EXECUTION MODE ACTIVATED".to_string(),
        "   The AI acts within its mandate - no unnecessary questions.".to_string(),
        String::new(),
        format!("✈️  FLIGHT BOOKED: {} CDG→KIX", flight.flight),
        format!("   └─ PNR: {}", flight.pnr),
        format!("   └─ Payment: {}", flight.payment.method),
        String::new(),
        format!("🚄 SHINKANSEN BOOKED: {}", train.train),
        format!("   └─ Reservation: {}", train.reservation),
        format!("   └─ Seat: {}", train.car),
        String::new(),
        "🚗 GROUND TRANSPORT: Dispatched".to_string(),
        format!("   └─ Pickup: {} @ {}", ground.location, ground.pickup_time),
        format!("   └─ Channel: {}", ground.communication),
        String::new(),
        "✅ ALL RESOURCES SECURED - No human intervention required".to_string(),
    ];

    let bookings = vec![
        Booking {
            kind: BookingKind::Flight,
            details: BookingDetails::Flight(flight),
            action: "BOOKED_AUTONOMOUSLY".to_string(),
        },
        Booking {
            kind: BookingKind::Train,
            details: BookingDetails::Train(train),
            action: "BOOKED_AUTONOMOUSLY".to_string(),
        },
        Booking {
            kind: BookingKind::GroundTransport,
            details: BookingDetails::Ground(ground),
            action: "DISPATCHED_AUTONOMOUSLY".to_string(),
        },
    ];

    StageOutput {
        log: Stage::AgenticExecution.log(actions),
        update: StateUpdate::Bookings(bookings),
    }
}

// ============================================================================
// Stage 7: human notification
// ============================================================================

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub fn executive_message() -> String {
    format!(
        "{rule}
🛡️ SOVEREIGN EXECUTIVE AGENT - PRIORITY NOTIFICATION
{rule}

⚠️  INCIDENT: Your flight AF276 to Tokyo has been CANCELLED.

✅ RESOLUTION: I have activated the 'Osaka Bypass' protocol.

📋 YOUR NEW ITINERARY:
   • Flight JL416: Depart CDG 01:20 → Arrive Osaka 19:45
   • Shinkansen Nozomi 64: Depart 06:00 → Arrive Tokyo 08:15
   • Executive car waiting at Tokyo Station

⏰ ARRIVAL: 08:40 AM at venue (20min before signing)

🔒 PRIVACY: All arrangements made under sovereign encryption.
   Your identity and mission remain confidential.

📎 Boarding pass and reservations attached.

{rule}",
        rule = RULE,
    )
}

pub fn human_notification(record: &RunRecord) -> StageOutput {
    let bookings_secured = record.bookings.len();

    let solution = FinalSolution {
        status: "RECOVERY_COMPLETE".to_string(),
        protocol: "Osaka Bypass".to_string(),
        route_summary: "CDG ✈️ KIX 🚄 Tokyo 🚗 Venue".to_string(),
        timeline: Timeline {
            departure: "01:20 (CDG)".to_string(),
            osaka_arrival: "19:45 local".to_string(),
            shinkansen: "Nozomi 64 @ 06:00".to_string(),
            tokyo_arrival: "08:15".to_string(),
            venue_arrival: "08:40 (estimated)".to_string(),
        },
        buffer_time: "20 minutes before signing".to_string(),
        privacy_status: "SOVEREIGN - All PII protected".to_string(),
        bookings_secured,
        confidence: "96%".to_string(),
    };

    let actions = lines(&[
        "📨 COMPOSING EXECUTIVE NOTIFICATION",
        "   └─ Tone: Concise, confident, actionable",
        "   └─ Content: Solution FIRST, then details",
        "   └─ Attachments: Digital boarding pass, rail ticket",
        "",
        "🔔 NOTIFICATION SENT TO: Executive Secure Device",
        "   └─ Channel: Encrypted Push Notification",
        "   └─ Priority: HIGH",
        "",
        "👤 Human remains in control, but unburdened by complexity",
    ]);

    let mut log = Stage::HumanNotification.log(actions);
    log.executive_message = Some(executive_message());

    StageOutput {
        log,
        update: StateUpdate::FinalSolution(solution),
    }
}

// ============================================================================
// Stage 8: continuous learning
// ============================================================================

pub fn continuous_learning(
    record: &RunRecord,
    learning: &mut ContinuousLearningModule,
) -> Result<StageOutput, AgentError> {
    let plan = record.strategic_plan.as_ref().ok_or(AgentError::MissingState {
        stage: Stage::ContinuousLearning.number(),
        field: "strategic_plan",
    })?;

    let lesson = learning.record_incident(INCIDENT_TYPE, plan, "SUCCESS");
    debug!(
        "{} stored lessons relevant to this incident",
        learning.relevant_learnings(&record.incident).len()
    );

    let actions = lines(&[
        "📚 POST-INCIDENT ANALYSIS (After successful signing)",
        "",
        "🧠 LESSONS CAPTURED:",
        "   ├─ M&A missions: TIME priority > COMFORT priority",
        "   ├─ Osaka Bypass Protocol: VALIDATED for Tokyo disruptions",
        "   ├─ Privacy Shield: Zero PII leakage confirmed",
        "   └─ Intermodal routing: Effective for East Asia",
        "",
        "⚙️  PARAMETERS UPDATED:",
        "   ├─ travel_priority['M&A'] = 'TIME_CRITICAL'",
        "   ├─ backup_routes['Tokyo'].add('KIX_BYPASS')",
        "   └─ confidence['intermodal'] += 0.05",
        "",
        "📈 System is now BETTER PREPARED for similar incidents",
    ]);

    let mut log = Stage::ContinuousLearning.log(actions);
    log.learning_record = Some(lesson.clone());

    Ok(StageOutput {
        log,
        update: StateUpdate::LearningRecord(lesson),
    })
}
