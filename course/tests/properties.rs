//! Property tests for the pure course transitions.

use course_progress::transition::{complete_course, complete_element};
use course_progress::{CompletionTrigger, CourseState, Element, ElementId, TriggerAction};
use proptest::prelude::*;

fn element_strategy(index: usize) -> impl Strategy<Value = Element> {
    (any::<bool>(), any::<bool>()).prop_map(move |(is_complete, is_hidden)| Element {
        id: ElementId::new(format!("e{index}")),
        is_complete,
        is_hidden,
    })
}

fn trigger_strategy(max_id: usize) -> impl Strategy<Value = CompletionTrigger> {
    (
        0..=max_id,
        prop_oneof![
            Just(TriggerAction::CompleteCourse),
            Just(TriggerAction::ShowHiddenElements)
        ],
    )
        .prop_map(|(index, action)| CompletionTrigger::new(format!("e{index}"), action))
}

fn course_strategy() -> impl Strategy<Value = CourseState> {
    (0usize..8)
        .prop_flat_map(|len| {
            (
                (0..len).map(element_strategy).collect::<Vec<_>>(),
                prop::collection::vec(trigger_strategy(len + 1), 0..6),
            )
        })
        .prop_map(|(elements, triggers)| CourseState::new(elements, triggers))
}

/// Ids including a few that are not in any course
fn calls_strategy() -> impl Strategy<Value = Vec<ElementId>> {
    prop::collection::vec((0usize..10).prop_map(|i| ElementId::new(format!("e{i}"))), 0..20)
}

fn ids(state: &CourseState) -> Vec<ElementId> {
    state.elements.iter().map(|e| e.id.clone()).collect()
}

proptest! {
    #[test]
    fn element_order_is_preserved(state in course_strategy(), calls in calls_strategy()) {
        let original = ids(&state);
        let mut current = state;
        for id in &calls {
            current = complete_element(current, id);
            prop_assert_eq!(ids(&current), original.clone());
        }
    }

    #[test]
    fn completion_is_monotone(state in course_strategy(), calls in calls_strategy()) {
        let mut current = state;
        for id in &calls {
            let before = current.clone();
            current = complete_element(current, id);

            prop_assert!(!before.is_course_complete || current.is_course_complete);
            for (old, new) in before.elements.iter().zip(&current.elements) {
                prop_assert!(!old.is_complete || new.is_complete);
                prop_assert!(old.is_hidden || !new.is_hidden);
            }
        }
    }

    #[test]
    fn full_coverage_implies_completion(state in course_strategy(), calls in calls_strategy()) {
        let mut current = state;
        for id in &calls {
            current = complete_element(current, id);
        }
        if !calls.is_empty() && current.all_elements_complete() {
            prop_assert!(current.is_course_complete);
        }
    }

    #[test]
    fn only_the_target_element_changes_completion(state in course_strategy(), index in 0usize..10) {
        let id = ElementId::new(format!("e{index}"));
        let after = complete_element(state.clone(), &id);

        for (old, new) in state.elements.iter().zip(&after.elements) {
            if old.id == id {
                prop_assert!(new.is_complete);
            } else {
                prop_assert_eq!(old.is_complete, new.is_complete);
            }
        }
    }

    #[test]
    fn direct_completion_touches_nothing_else(state in course_strategy()) {
        let after = complete_course(state.clone());
        prop_assert!(after.is_course_complete);
        prop_assert_eq!(after.elements, state.elements);
        prop_assert_eq!(after.element_completion_triggers, state.element_completion_triggers);
        prop_assert_eq!(after.is_saving_tracking, state.is_saving_tracking);
    }
}
