//! `CourseStore`: a course-specific facade over the generic runtime store.

use crate::config::CourseDefinition;
use crate::error::CourseError;
use crate::reducer::{CourseEnvironment, CourseReducer};
use crate::types::{CourseAction, CourseState, ElementId};
use course_progress_runtime::{EffectHandle, Store, StoreConfig, StoreError, Subscription};
use std::time::Duration;
use tokio::sync::mpsc;

type Inner = Store<CourseState, CourseAction, CourseEnvironment, CourseReducer>;

/// Store holding the progress of one course
///
/// Each call to [`CourseStore::new`] builds an independent store; clones
/// share state with the original.
///
/// # Example
///
/// ```ignore
/// let store = CourseStore::new(CourseDefinition::sample(), environment)?;
///
/// let _subscription = store
///     .subscribe(|s| s.is_course_complete, |complete| println!("complete: {complete}"))
///     .await;
///
/// store.set_element_as_complete("1").await?;
/// assert!(store.state(|s| s.is_course_complete).await);
/// ```
#[derive(Clone)]
pub struct CourseStore {
    store: Inner,
}

impl CourseStore {
    /// Build a store from a validated definition
    ///
    /// # Errors
    ///
    /// Returns [`CourseError::DuplicateElementId`] if two elements share an id.
    pub fn new(definition: CourseDefinition, environment: CourseEnvironment) -> Result<Self, CourseError> {
        Self::with_config(definition, environment, StoreConfig::default())
    }

    /// Build a store with custom runtime configuration
    ///
    /// # Errors
    ///
    /// Returns [`CourseError::DuplicateElementId`] if two elements share an id.
    pub fn with_config(
        definition: CourseDefinition,
        environment: CourseEnvironment,
        config: StoreConfig,
    ) -> Result<Self, CourseError> {
        definition.validate()?;

        tracing::debug!(
            elements = definition.elements.len(),
            triggers = definition.element_completion_triggers.len(),
            "Creating course store"
        );

        Ok(Self {
            store: Store::with_config(
                definition.into_state(),
                CourseReducer::new(),
                environment,
                config,
            ),
        })
    }

    /// Build a store from a JSON course definition
    ///
    /// # Errors
    ///
    /// Any error from [`CourseDefinition::from_json`] or [`CourseStore::new`].
    pub fn from_json(json: &str, environment: CourseEnvironment) -> Result<Self, CourseError> {
        Self::new(CourseDefinition::from_json(json)?, environment)
    }

    /// Mark an element complete, then apply auto-completion and triggers
    ///
    /// Unknown ids are accepted. The returned handle resolves once any
    /// tracking notification started by this call has been settled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn set_element_as_complete(
        &self,
        element_id: impl Into<ElementId>,
    ) -> Result<EffectHandle, StoreError> {
        self.store
            .send(CourseAction::SetElementAsComplete {
                element_id: element_id.into(),
            })
            .await
    }

    /// Complete the course directly, leaving elements untouched
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn set_course_as_complete(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(CourseAction::SetCourseAsComplete).await
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> CourseState {
        self.store.state(CourseState::clone).await
    }

    /// Read the current state through a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&CourseState) -> T,
    {
        self.store.state(f).await
    }

    /// Run `listener` whenever the slice chosen by `selector` changes
    ///
    /// See [`Store::subscribe`]. Listeners must not call back into the store.
    pub async fn subscribe<T, Sel, L>(&self, selector: Sel, listener: L) -> Subscription
    where
        Sel: Fn(&CourseState) -> T + Send + 'static,
        T: PartialEq + Send + 'static,
        L: FnMut(&T) + Send + 'static,
    {
        self.store.subscribe(selector, listener).await
    }

    /// Run `listener` after every commit
    pub async fn subscribe_all<L>(&self, listener: L) -> Subscription
    where
        L: FnMut(&CourseState) + Send + 'static,
    {
        self.store.subscribe_all(listener).await
    }

    /// Wait until no tracking notification is in flight
    ///
    /// Returns immediately when `is_saving_tracking` is already false.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] if tracking is still running after `timeout`
    /// - [`StoreError::ChannelClosed`] if the listener went away
    pub async fn wait_for_tracking(&self, timeout: Duration) -> Result<(), StoreError> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Register before reading the flag so a settle in between is not lost.
        let _subscription = self
            .store
            .subscribe(
                |s: &CourseState| s.is_saving_tracking,
                move |saving: &bool| {
                    let _ = tx.send(*saving);
                },
            )
            .await;

        if !self.state(|s| s.is_saving_tracking).await {
            return Ok(());
        }

        tokio::time::timeout(timeout, async {
            while let Some(saving) = rx.recv().await {
                if !saving {
                    return Ok(());
                }
            }
            Err(StoreError::ChannelClosed)
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Stop accepting actions and wait for in-flight tracking
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    /// The underlying runtime store
    #[must_use]
    pub const fn runtime(&self) -> &Inner {
        &self.store
    }
}

impl std::fmt::Debug for CourseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseStore")
            .field("pending_effects", &self.store.pending_effects())
            .field("subscribers", &self.store.subscriber_count())
            .finish_non_exhaustive()
    }
}
