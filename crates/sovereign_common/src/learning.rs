//! Post-incident learning capture.
//!
//! Lessons live in memory for the lifetime of the module; nothing is
//! persisted between runs.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::types::StrategicPlan;

/// Keywords that make past lessons relevant to a new situation
const RELEVANCE_KEYWORDS: &[&str] = &["merger", "m&a", "signing", "tokyo"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LearnedParameters {
    /// Lessons specific to M&A travel disruptions
    Targeted {
        priority_override: String,
        intermodal_viable: bool,
        osaka_bypass_success: bool,
        privacy_protocol: String,
    },
    General {
        general_learning: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub timestamp: String,
    pub incident_type: String,
    pub solution_applied: StrategicPlan,
    pub outcome: String,
    pub learned_parameters: LearnedParameters,
}

/// Derive lessons from a resolved incident.
///
/// Only M&A / merger incidents produce targeted parameters; anything else
/// gets the generic acknowledgement.
pub fn extract_learnings(incident_type: &str, outcome: &str) -> LearnedParameters {
    if incident_type.contains("M&A") || incident_type.to_lowercase().contains("merger") {
        LearnedParameters::Targeted {
            priority_override: "TIME > COMFORT".to_string(),
            intermodal_viable: true,
            osaka_bypass_success: outcome == "SUCCESS",
            privacy_protocol: "SOVEREIGN_VALIDATED".to_string(),
        }
    } else {
        LearnedParameters::General {
            general_learning: "Protocol executed successfully".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ContinuousLearningModule {
    lessons: Vec<LearningRecord>,
}

impl ContinuousLearningModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lesson and return a copy of it
    pub fn record_incident(
        &mut self,
        incident_type: &str,
        solution: &StrategicPlan,
        outcome: &str,
    ) -> LearningRecord {
        let lesson = LearningRecord {
            timestamp: Local::now().to_rfc3339(),
            incident_type: incident_type.to_string(),
            solution_applied: solution.clone(),
            outcome: outcome.to_string(),
            learned_parameters: extract_learnings(incident_type, outcome),
        };
        self.lessons.push(lesson.clone());
        lesson
    }

    /// All lessons, if the context mentions any relevance keyword
    pub fn relevant_learnings(&self, context: &str) -> Vec<&LearningRecord> {
        let context = context.to_lowercase();
        if RELEVANCE_KEYWORDS.iter().any(|k| context.contains(k)) {
            self.lessons.iter().collect()
        } else {
            Vec::new()
        }
    }

    pub fn lessons(&self) -> &[LearningRecord] {
        &self.lessons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoutePlan;

    fn plan() -> StrategicPlan {
        StrategicPlan {
            primary_route: RoutePlan {
                name: "Osaka Bypass Protocol".to_string(),
                segments: vec![],
                total_time: "15h 05m".to_string(),
                arrival_estimate: "08:15 AM Tokyo Time".to_string(),
                buffer: "45 minutes before deadline".to_string(),
            },
            reasoning_trace: "trace".to_string(),
            confidence: "94%".to_string(),
        }
    }

    #[test]
    fn test_mna_incident_yields_targeted_lessons() {
        match extract_learnings("M&A Travel Disruption", "SUCCESS") {
            LearnedParameters::Targeted { osaka_bypass_success, priority_override, .. } => {
                assert!(osaka_bypass_success);
                assert_eq!(priority_override, "TIME > COMFORT");
            }
            other => panic!("expected targeted lessons, got {:?}", other),
        }
    }

    #[test]
    fn test_merger_keyword_is_case_insensitive() {
        let params = extract_learnings("Cross-border MERGER delay", "FAILURE");
        assert!(matches!(
            params,
            LearnedParameters::Targeted { osaka_bypass_success: false, .. }
        ));
    }

    #[test]
    fn test_other_incidents_get_general_lesson() {
        assert_eq!(
            extract_learnings("Lost luggage", "SUCCESS"),
            LearnedParameters::General {
                general_learning: "Protocol executed successfully".to_string()
            }
        );
    }

    #[test]
    fn test_record_appends() {
        let mut module = ContinuousLearningModule::new();
        let record = module.record_incident("M&A Travel Disruption", &plan(), "SUCCESS");
        module.record_incident("Lost luggage", &plan(), "SUCCESS");

        assert_eq!(module.lessons().len(), 2);
        assert_eq!(module.lessons()[0], record);
        assert_eq!(record.solution_applied, plan());
    }

    #[test]
    fn test_relevant_learnings_by_keyword() {
        let mut module = ContinuousLearningModule::new();
        module.record_incident("M&A Travel Disruption", &plan(), "SUCCESS");

        assert_eq!(module.relevant_learnings("Flight to TOKYO cancelled").len(), 1);
        assert!(module.relevant_learnings("weekend in Lyon").is_empty());
    }

    #[test]
    fn test_parameters_serialize_flat() {
        let json = serde_json::to_value(extract_learnings("M&A", "SUCCESS")).unwrap();
        assert_eq!(json["privacy_protocol"], "SOVEREIGN_VALIDATED");
        assert_eq!(json["intermodal_viable"], true);
    }
}
