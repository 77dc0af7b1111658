//! Domain types for the course progress store.
//!
//! A course is an ordered list of elements. Completing elements can complete
//! the course, either by covering every element or through a completion
//! trigger configured for a specific element.

use crate::trigger::TriggerAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a course element
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Creates an `ElementId` from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single course element
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier within the course
    pub id: ElementId,
    /// Whether the learner completed this element
    #[serde(default)]
    pub is_complete: bool,
    /// Whether the element is hidden until a trigger reveals it
    #[serde(default)]
    pub is_hidden: bool,
}

impl Element {
    /// Creates a visible, incomplete element
    #[must_use]
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            is_complete: false,
            is_hidden: false,
        }
    }

    /// Creates a hidden, incomplete element
    #[must_use]
    pub fn hidden(id: impl Into<ElementId>) -> Self {
        Self {
            is_hidden: true,
            ..Self::new(id)
        }
    }

    /// Returns a copy marked as complete
    #[must_use]
    pub fn completed(self) -> Self {
        Self {
            is_complete: true,
            ..self
        }
    }
}

/// Applies `action_key` whenever the element `element_id` is completed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionTrigger {
    /// Element whose completion fires the trigger
    pub element_id: ElementId,
    /// Action applied to the course state
    pub action_key: TriggerAction,
}

impl CompletionTrigger {
    /// Creates a new trigger
    #[must_use]
    pub fn new(element_id: impl Into<ElementId>, action_key: TriggerAction) -> Self {
        Self {
            element_id: element_id.into(),
            action_key,
        }
    }
}

/// State of a single course
///
/// Replaced wholesale on every transition; see [`crate::transition`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseState {
    /// Whether the course is complete. Never reset once set.
    pub is_course_complete: bool,
    /// Whether a tracking notification is in flight
    pub is_saving_tracking: bool,
    /// Course elements in display order
    pub elements: Vec<Element>,
    /// Triggers applied when specific elements complete, in order
    pub element_completion_triggers: Vec<CompletionTrigger>,
    /// When the course became complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_completed_at: Option<DateTime<Utc>>,
}

impl CourseState {
    /// Creates an incomplete course from elements and triggers
    ///
    /// No validation happens here; use
    /// [`CourseDefinition`](crate::config::CourseDefinition) for checked input.
    #[must_use]
    pub const fn new(elements: Vec<Element>, element_completion_triggers: Vec<CompletionTrigger>) -> Self {
        Self {
            is_course_complete: false,
            is_saving_tracking: false,
            elements,
            element_completion_triggers,
            course_completed_at: None,
        }
    }

    /// Returns an element by id
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == *id)
    }

    /// Whether every element is complete (vacuously true with no elements)
    #[must_use]
    pub fn all_elements_complete(&self) -> bool {
        self.elements.iter().all(|element| element.is_complete)
    }

    /// Number of completed elements
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.elements.iter().filter(|element| element.is_complete).count()
    }

    /// Number of hidden elements
    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.elements.iter().filter(|element| element.is_hidden).count()
    }

    /// Trigger actions configured for an element, in configuration order
    pub fn triggers_for<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = TriggerAction> + 'a {
        self.element_completion_triggers
            .iter()
            .filter(move |trigger| trigger.element_id == *id)
            .map(|trigger| trigger.action_key)
    }
}

/// Actions for the course store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CourseAction {
    /// Command: mark an element complete and run its triggers
    SetElementAsComplete {
        /// Element to complete
        element_id: ElementId,
    },

    /// Command: complete the course directly
    SetCourseAsComplete,

    /// Feedback: the tracking endpoint accepted the completion
    TrackingSaved {
        /// Response body returned by the endpoint
        response: serde_json::Value,
    },

    /// Feedback: the tracking notification failed
    TrackingFailed {
        /// Error description
        error: String,
    },
}

impl CourseAction {
    /// Shorthand for [`CourseAction::SetElementAsComplete`]
    #[must_use]
    pub fn complete_element(element_id: impl Into<ElementId>) -> Self {
        Self::SetElementAsComplete {
            element_id: element_id.into(),
        }
    }

    /// Whether this action reports the outcome of a tracking notification
    #[must_use]
    pub const fn is_tracking_result(&self) -> bool {
        matches!(self, Self::TrackingSaved { .. } | Self::TrackingFailed { .. })
    }
}
