//! Configuration: tracking settings from the environment and course
//! definitions from JSON.

use crate::error::CourseError;
use crate::trigger::TriggerAction;
use crate::types::{CompletionTrigger, CourseState, Element, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Tracking endpoint used when none is configured
pub const DEFAULT_TRACKING_ENDPOINT: &str = "https://lms/tracking";

/// Request timeout used when none is configured
pub const DEFAULT_TRACKING_TIMEOUT: Duration = Duration::from_millis(5000);

/// Tracking client settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Whether completion is reported at all
    pub enabled: bool,
    /// URL receiving the completion POST
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_TRACKING_ENDPOINT.to_string(),
            timeout: DEFAULT_TRACKING_TIMEOUT,
        }
    }
}

impl TrackingConfig {
    /// Load configuration from environment variables
    ///
    /// - `COURSE_TRACKING_ENABLED` (default `true`)
    /// - `COURSE_TRACKING_URL` (default [`DEFAULT_TRACKING_ENDPOINT`])
    /// - `COURSE_TRACKING_TIMEOUT_MS` (default `5000`)
    ///
    /// Values that fail to parse fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let enabled = lookup("COURSE_TRACKING_ENABLED")
            .and_then(|value| parse_flag(&value))
            .unwrap_or(defaults.enabled);

        let endpoint = lookup("COURSE_TRACKING_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.endpoint);

        let timeout = lookup("COURSE_TRACKING_TIMEOUT_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(defaults.timeout, Duration::from_millis);

        Self {
            enabled,
            endpoint,
            timeout,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            tracing::warn!(value = other, "Ignoring unrecognized boolean value");
            None
        },
    }
}

/// Elements and triggers a course store is built from
///
/// Parse with [`CourseDefinition::from_json`]; trigger action keys are
/// resolved against [`TriggerAction`] at that point, so an unknown key
/// fails before any store exists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDefinition {
    /// Course elements in display order
    pub elements: Vec<Element>,
    /// Completion triggers in application order
    pub element_completion_triggers: Vec<CompletionTrigger>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    element_completion_triggers: Vec<RawTrigger>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrigger {
    element_id: ElementId,
    action_key: String,
}

impl CourseDefinition {
    /// Create a definition from parts
    #[must_use]
    pub const fn new(elements: Vec<Element>, element_completion_triggers: Vec<CompletionTrigger>) -> Self {
        Self {
            elements,
            element_completion_triggers,
        }
    }

    /// Parse a JSON course definition
    ///
    /// # Errors
    ///
    /// - [`CourseError::InvalidDefinition`] for malformed JSON
    /// - [`CourseError::UnknownTriggerAction`] for an `actionKey` outside
    ///   the supported set
    pub fn from_json(json: &str) -> Result<Self, CourseError> {
        let raw: RawDefinition = serde_json::from_str(json)?;

        let element_completion_triggers = raw
            .element_completion_triggers
            .into_iter()
            .map(|trigger| {
                Ok(CompletionTrigger {
                    element_id: trigger.element_id,
                    action_key: trigger.action_key.parse()?,
                })
            })
            .collect::<Result<Vec<_>, CourseError>>()?;

        Ok(Self::new(raw.elements, element_completion_triggers))
    }

    /// Check the definition before a store is built from it
    ///
    /// Triggers naming an element that does not exist are accepted and
    /// logged; they can still fire through an unknown-id completion.
    ///
    /// # Errors
    ///
    /// Returns [`CourseError::DuplicateElementId`] for the first repeated id.
    pub fn validate(&self) -> Result<(), CourseError> {
        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(&element.id) {
                return Err(CourseError::DuplicateElementId(element.id.clone()));
            }
        }

        for trigger in &self.element_completion_triggers {
            if !seen.contains(&trigger.element_id) {
                tracing::warn!(
                    element_id = %trigger.element_id,
                    action = %trigger.action_key,
                    "Completion trigger references an unknown element"
                );
            }
        }

        Ok(())
    }

    /// Initial course state for this definition
    #[must_use]
    pub fn into_state(self) -> CourseState {
        CourseState::new(self.elements, self.element_completion_triggers)
    }

    /// Three-element course: "3" starts hidden, completing "1" completes the
    /// course and completing "2" reveals hidden elements
    #[must_use]
    pub fn sample() -> Self {
        Self::new(
            vec![Element::new("1"), Element::new("2"), Element::hidden("3")],
            vec![
                CompletionTrigger::new("1", TriggerAction::CompleteCourse),
                CompletionTrigger::new("2", TriggerAction::ShowHiddenElements),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn tracking_config_defaults() {
        let config = TrackingConfig::from_lookup(lookup(&[]));
        assert_eq!(config, TrackingConfig::default());
        assert!(config.enabled);
        assert_eq!(config.endpoint, "https://lms/tracking");
        assert_eq!(config.timeout, Duration::from_millis(5000));
    }

    #[test]
    fn tracking_config_reads_overrides() {
        let config = TrackingConfig::from_lookup(lookup(&[
            ("COURSE_TRACKING_ENABLED", "false"),
            ("COURSE_TRACKING_URL", "http://localhost:8080/track"),
            ("COURSE_TRACKING_TIMEOUT_MS", "250"),
        ]));

        assert!(!config.enabled);
        assert_eq!(config.endpoint, "http://localhost:8080/track");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn tracking_config_invalid_values_fall_back() {
        let config = TrackingConfig::from_lookup(lookup(&[
            ("COURSE_TRACKING_ENABLED", "maybe"),
            ("COURSE_TRACKING_URL", "  "),
            ("COURSE_TRACKING_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config, TrackingConfig::default());
    }

    #[test]
    fn parses_json_definition() -> Result<(), CourseError> {
        let definition = CourseDefinition::from_json(
            r#"{
                "elements": [
                    { "id": "1" },
                    { "id": "2", "isHidden": true }
                ],
                "elementCompletionTriggers": [
                    { "elementId": "1", "actionKey": "showHiddenElements" }
                ]
            }"#,
        )?;

        assert_eq!(definition.elements.len(), 2);
        assert!(definition.elements[1].is_hidden);
        assert_eq!(
            definition.element_completion_triggers,
            vec![CompletionTrigger::new("1", TriggerAction::ShowHiddenElements)]
        );
        Ok(())
    }

    #[test]
    fn missing_sections_default_to_empty() -> Result<(), CourseError> {
        let definition = CourseDefinition::from_json("{}")?;
        assert_eq!(definition, CourseDefinition::default());
        Ok(())
    }

    #[test]
    fn unknown_action_key_is_rejected() {
        let result = CourseDefinition::from_json(
            r#"{"elements":[{"id":"1"}],"elementCompletionTriggers":[{"elementId":"1","actionKey":"resetCourse"}]}"#,
        );
        assert!(matches!(
            result,
            Err(CourseError::UnknownTriggerAction(key)) if key == "resetCourse"
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = CourseDefinition::from_json(r#"{"elements": [{"id": 1}"#);
        assert!(matches!(result, Err(CourseError::InvalidDefinition(_))));
    }

    #[test]
    fn duplicate_ids_fail_validation() {
        let definition = CourseDefinition::new(
            vec![Element::new("1"), Element::new("2"), Element::new("1")],
            Vec::new(),
        );
        assert!(matches!(
            definition.validate(),
            Err(CourseError::DuplicateElementId(id)) if id.as_str() == "1"
        ));
    }

    #[test]
    fn dangling_trigger_passes_validation() {
        let definition = CourseDefinition::new(
            vec![Element::new("1")],
            vec![CompletionTrigger::new("ghost", TriggerAction::CompleteCourse)],
        );
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn definition_serializes_to_the_same_shape() -> Result<(), CourseError> {
        let json = serde_json::to_string(&CourseDefinition::sample())?;
        assert_eq!(CourseDefinition::from_json(&json)?, CourseDefinition::sample());
        Ok(())
    }

    #[test]
    fn sample_state_starts_incomplete() {
        let state = CourseDefinition::sample().into_state();
        assert!(!state.is_course_complete);
        assert!(!state.is_saving_tracking);
        assert_eq!(state.elements.len(), 3);
        assert_eq!(state.hidden_count(), 1);
        assert!(state.course_completed_at.is_none());
    }
}
