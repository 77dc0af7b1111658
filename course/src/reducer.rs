//! Course reducer and its environment.

use crate::tracking::TrackingClient;
use crate::transition;
use crate::types::{CourseAction, CourseState};
use course_progress_core::effect::Effect;
use course_progress_core::environment::Clock;
use course_progress_core::reducer::Reducer;
use course_progress_core::{SmallVec, smallvec};
use std::sync::Arc;

/// Dependencies injected into [`CourseReducer`]
#[derive(Clone)]
pub struct CourseEnvironment {
    /// Clock used to stamp `course_completed_at`
    pub clock: Arc<dyn Clock>,
    /// Collaborator notified when the course completes
    pub tracker: Option<Arc<dyn TrackingClient>>,
}

impl CourseEnvironment {
    /// Environment without completion tracking
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            tracker: None,
        }
    }

    /// Report completion through `tracker`
    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<dyn TrackingClient>) -> Self {
        self.tracker = Some(tracker);
        self
    }
}

impl std::fmt::Debug for CourseEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseEnvironment")
            .field("has_tracker", &self.tracker.is_some())
            .finish_non_exhaustive()
    }
}

/// Reducer for [`CourseState`]
///
/// Commands run a pure transition from [`crate::transition`] and commit the
/// result. When `is_course_complete` flips from false to true the reducer
/// stamps the completion time and, if a tracker is configured, returns one
/// effect reporting the completion. The effect feeds back
/// [`CourseAction::TrackingSaved`] or [`CourseAction::TrackingFailed`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CourseReducer;

impl CourseReducer {
    /// Creates a new `CourseReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn on_completion_edge(
        state: &mut CourseState,
        was_complete: bool,
        env: &CourseEnvironment,
    ) -> SmallVec<[Effect<CourseAction>; 4]> {
        if was_complete || !state.is_course_complete {
            return SmallVec::new();
        }

        let completed_at = env.clock.now();
        state.course_completed_at = Some(completed_at);
        metrics::counter!("course.completed.total").increment(1);
        tracing::info!(%completed_at, "Course completed");

        let Some(tracker) = env.tracker.as_ref() else {
            tracing::debug!("No tracker configured, skipping completion tracking");
            return SmallVec::new();
        };

        state.is_saving_tracking = true;
        let tracker = Arc::clone(tracker);

        smallvec![Effect::future(async move {
            // A panicking tracker must still settle `is_saving_tracking`.
            let outcome = tokio::spawn(async move { tracker.send_tracking_data(true).await }).await;
            match outcome {
                Ok(Ok(response)) => Some(CourseAction::TrackingSaved { response }),
                Ok(Err(error)) => Some(CourseAction::TrackingFailed {
                    error: error.to_string(),
                }),
                Err(join_error) => Some(CourseAction::TrackingFailed {
                    error: join_error.to_string(),
                }),
            }
        })]
    }
}

/// Replace the state with the output of a pure transition in one step
fn commit(state: &mut CourseState, transition: impl FnOnce(CourseState) -> CourseState) {
    *state = transition(std::mem::take(state));
}

impl Reducer for CourseReducer {
    type State = CourseState;
    type Action = CourseAction;
    type Environment = CourseEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CourseAction::SetElementAsComplete { element_id } => {
                let was_complete = state.is_course_complete;
                commit(state, |current| transition::complete_element(current, &element_id));
                tracing::debug!(
                    element_id = %element_id,
                    completed = state.completed_count(),
                    total = state.elements.len(),
                    course_complete = state.is_course_complete,
                    "Element completion committed"
                );
                Self::on_completion_edge(state, was_complete, env)
            },

            CourseAction::SetCourseAsComplete => {
                let was_complete = state.is_course_complete;
                commit(state, transition::complete_course);
                tracing::debug!("Course completion committed");
                Self::on_completion_edge(state, was_complete, env)
            },

            CourseAction::TrackingSaved { response } => {
                state.is_saving_tracking = false;
                tracing::debug!(%response, "Completion tracking saved");
                SmallVec::new()
            },

            CourseAction::TrackingFailed { error } => {
                state.is_saving_tracking = false;
                metrics::counter!("course.tracking.failed.total").increment(1);
                tracing::warn!(%error, "Completion tracking failed");
                SmallVec::new()
            },
        }
    }
}
