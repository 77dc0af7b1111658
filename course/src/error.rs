//! Error types for building a course store.

use crate::trigger::TriggerAction;
use crate::types::ElementId;
use thiserror::Error;

/// Errors raised while turning a course definition into a store
///
/// All of these are configuration errors: they surface when the store is
/// constructed, never from `set_element_as_complete`.
#[derive(Debug, Error)]
pub enum CourseError {
    /// A completion trigger names an action that does not exist
    #[error("Unknown trigger action `{0}`, expected one of {}", TriggerAction::expected_keys())]
    UnknownTriggerAction(String),

    /// Two elements share the same id
    #[error("Duplicate element id `{0}`")]
    DuplicateElementId(ElementId),

    /// The definition could not be parsed
    #[error("Invalid course definition: {0}")]
    InvalidDefinition(String),
}

impl From<serde_json::Error> for CourseError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidDefinition(error.to_string())
    }
}
