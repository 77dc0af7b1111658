//! # Course Progress
//!
//! Reactive progress store for a course made of ordered elements.
//!
//! Completing an element can complete the course, either because every
//! element is now complete or because a completion trigger configured for
//! that element says so. Triggers can also reveal hidden elements. When the
//! course becomes complete, a tracking endpoint is notified in the
//! background.
//!
//! ## Layout
//!
//! - [`types`]: state, elements, triggers and actions
//! - [`trigger`]: the closed set of trigger actions and their transforms
//! - [`transition`]: pure `CourseState -> CourseState` transitions
//! - [`reducer`]: commits transitions and emits the tracking effect
//! - [`tracking`]: the tracking collaborator and its HTTP client
//! - [`config`]: tracking configuration and course definitions
//! - [`store`]: the [`CourseStore`] facade
//!
//! ## Example
//!
//! ```ignore
//! use course_progress::{CourseDefinition, CourseEnvironment, CourseStore};
//! use course_progress_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! let env = CourseEnvironment::new(Arc::new(SystemClock));
//! let store = CourseStore::new(CourseDefinition::sample(), env)?;
//!
//! store.set_element_as_complete("2").await?;
//! assert_eq!(store.state(|s| s.hidden_count()).await, 0);
//! ```

pub mod config;
pub mod error;
pub mod mocks;
pub mod reducer;
pub mod store;
pub mod tracking;
pub mod transition;
pub mod trigger;
pub mod types;

pub use config::{CourseDefinition, TrackingConfig};
pub use error::CourseError;
pub use reducer::{CourseEnvironment, CourseReducer};
pub use store::CourseStore;
pub use tracking::{HttpTrackingClient, TrackingClient, TrackingError};
pub use trigger::TriggerAction;
pub use types::{CompletionTrigger, CourseAction, CourseState, Element, ElementId};
