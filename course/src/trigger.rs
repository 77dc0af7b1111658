//! Trigger actions: pure transforms applied to the course state.

use crate::error::CourseError;
use crate::types::{CourseState, Element};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of actions a completion trigger can apply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerAction {
    /// Mark the course complete
    CompleteCourse,
    /// Reveal every hidden element
    ShowHiddenElements,
}

impl TriggerAction {
    /// Every trigger action
    pub const ALL: [Self; 2] = [Self::CompleteCourse, Self::ShowHiddenElements];

    /// Configuration key of this action
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CompleteCourse => "completeCourse",
            Self::ShowHiddenElements => "showHiddenElements",
        }
    }

    /// Every configuration key, comma separated
    #[must_use]
    pub fn expected_keys() -> String {
        Self::ALL.map(Self::key).join(", ")
    }

    /// Apply the action, returning the next state
    #[must_use]
    pub fn apply(self, state: CourseState) -> CourseState {
        match self {
            Self::CompleteCourse => CourseState {
                is_course_complete: true,
                ..state
            },
            Self::ShowHiddenElements => CourseState {
                elements: state
                    .elements
                    .into_iter()
                    .map(|element| Element {
                        is_hidden: false,
                        ..element
                    })
                    .collect(),
                ..state
            },
        }
    }
}

impl std::fmt::Display for TriggerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TriggerAction {
    type Err = CourseError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.key() == key)
            .ok_or_else(|| CourseError::UnknownTriggerAction(key.to_string()))
    }
}
