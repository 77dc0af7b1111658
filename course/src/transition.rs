//! Pure state transitions for the course store.
//!
//! Every function takes the current snapshot by value and returns the next
//! one. The reducer commits the result in a single step, so observers never
//! see the intermediate states built here.

use crate::trigger::TriggerAction;
use crate::types::{CourseState, Element, ElementId};

/// Mark `element_id` complete and apply everything that follows from it
///
/// 1. The matching element gets `is_complete = true`; order and every other
///    field are preserved. An unknown id leaves the elements unchanged.
/// 2. If every element is now complete, the course is completed.
/// 3. Triggers configured for `element_id` are applied in configuration
///    order, each one receiving the output of the previous.
///
/// Step 2 never feeds back into step 3.
#[must_use]
pub fn complete_element(state: CourseState, element_id: &ElementId) -> CourseState {
    let mut matched = false;
    let elements = state
        .elements
        .into_iter()
        .map(|element| {
            if element.id == *element_id {
                matched = true;
                Element {
                    is_complete: true,
                    ..element
                }
            } else {
                element
            }
        })
        .collect();
    let mut next = CourseState { elements, ..state };

    if !matched {
        tracing::debug!(element_id = %element_id, "Unknown element id, elements unchanged");
    }

    if next.all_elements_complete() {
        next = TriggerAction::CompleteCourse.apply(next);
    }

    let actions: Vec<TriggerAction> = next.triggers_for(element_id).collect();
    actions.into_iter().fold(next, |state, action| {
        tracing::trace!(element_id = %element_id, action = %action, "Applying completion trigger");
        action.apply(state)
    })
}

/// Complete the course without touching any element
#[must_use]
pub fn complete_course(state: CourseState) -> CourseState {
    TriggerAction::CompleteCourse.apply(state)
}
