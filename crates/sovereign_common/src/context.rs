//! Mission context loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

use crate::error::AgentError;

/// The (encrypted, in the story) calendar entry behind the trip.
/// Unknown keys in the file are kept but unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionContext {
    pub mission_name: Option<String>,
    pub objective: Option<String>,
    pub classification: Option<String>,
    pub deadline: Option<String>,
    pub risk: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for MissionContext {
    fn default() -> Self {
        Self {
            mission_name: Some("Operation Sakura".to_string()),
            objective: Some("M&A Signing".to_string()),
            classification: None,
            deadline: Some("09:00 AM Tokyo Time".to_string()),
            risk: Some("CRITICAL".to_string()),
            extra: BTreeMap::new(),
        }
    }
}

impl MissionContext {
    /// Read the context file. A missing file yields the defaults; any other
    /// failure is returned.
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No mission context at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(AgentError::ContextIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let context = serde_json::from_str(&content).map_err(|source| AgentError::ContextParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded mission context from {}", path.display());
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let context = MissionContext::load(&dir.path().join("context.json")).unwrap();
        assert_eq!(context, MissionContext::default());
        assert_eq!(context.mission_name.as_deref(), Some("Operation Sakura"));
        assert_eq!(context.objective.as_deref(), Some("M&A Signing"));
    }

    #[test]
    fn test_partial_file_keeps_extra_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context.json");
        fs::write(
            &path,
            r#"{"mission_name": "Operation Fuji", "classification": "TOP SECRET", "venue": "Marunouchi"}"#,
        )
        .unwrap();

        let context = MissionContext::load(&path).unwrap();
        assert_eq!(context.mission_name.as_deref(), Some("Operation Fuji"));
        assert_eq!(context.classification.as_deref(), Some("TOP SECRET"));
        assert!(context.objective.is_none());
        assert_eq!(context.extra["venue"], "Marunouchi");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            MissionContext::load(&path),
            Err(AgentError::ContextParse { .. })
        ));
    }

    #[test]
    fn test_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MissionContext::load(dir.path()),
            Err(AgentError::ContextIo { .. })
        ));
    }
}
