//! Course progress demo binary
//!
//! Loads a course definition (the built-in sample when no path is given),
//! completes every element in order and prints what subscribers observe.
//!
//! ```text
//! course-demo [definition.json]
//! ```

use anyhow::Context;
use course_progress::{
    CourseDefinition, CourseEnvironment, CourseStore, HttpTrackingClient, TrackingConfig,
};
use course_progress_core::environment::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_progress=debug,course_progress_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let definition = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading course definition {path}"))?;
            CourseDefinition::from_json(&json)
                .with_context(|| format!("parsing course definition {path}"))?
        },
        None => CourseDefinition::sample(),
    };

    let tracking = TrackingConfig::from_env();
    let mut env = CourseEnvironment::new(Arc::new(SystemClock));
    if tracking.enabled {
        tracing::info!(endpoint = %tracking.endpoint, "Completion tracking enabled");
        env = env.with_tracker(Arc::new(HttpTrackingClient::from_config(&tracking)?));
    }

    let element_ids: Vec<_> = definition.elements.iter().map(|e| e.id.clone()).collect();
    let store = CourseStore::new(definition, env)?;

    println!("=== Course Progress Demo ===\n");

    let _progress = store
        .subscribe(
            |s| (s.completed_count(), s.elements.len()),
            |(done, total)| println!("  progress: {done}/{total}"),
        )
        .await;
    let _hidden = store
        .subscribe(
            |s| s.hidden_count(),
            |hidden| println!("  hidden elements: {hidden}"),
        )
        .await;
    let _complete = store
        .subscribe(
            |s| s.is_course_complete,
            |complete| println!("  course complete: {complete}"),
        )
        .await;
    let _tracking = store
        .subscribe(
            |s| s.is_saving_tracking,
            |saving| println!("  saving tracking: {saving}"),
        )
        .await;

    for id in element_ids {
        println!("\n>>> Completing element {id}");
        store.set_element_as_complete(id).await?;
    }

    if let Err(error) = store.wait_for_tracking(tracking.timeout).await {
        tracing::warn!(%error, "Tracking did not settle");
    }

    let snapshot = store.snapshot().await;
    println!("\nFinal state:\n{}", serde_json::to_string_pretty(&snapshot)?);

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
