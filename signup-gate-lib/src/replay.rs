//! Offline batch replay of recorded registration events.
//!
//! Purely a local debug collaborator: recorded events run through the same
//! pipeline as live traffic, sequentially, without touching the real
//! registration flow. Used by the `signup-gate-replay` tool.

use crate::Result;
use crate::event::RegistrationEvent;
use crate::handlers::PreSignupHandler;
use camino::Utf8Path;
use ohno::IntoAppError;
use std::fs;

/// The outcome of replaying one recorded event.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Position of the event in the recorded batch.
    pub index: usize,

    /// The deny reason or evaluation failure, when the pipeline rejected
    /// the event.
    pub error: Option<String>,

    /// The event as the pipeline returned it; unmodified when rejected.
    pub event: RegistrationEvent,
}

/// Load a recorded batch: a JSON array of registration events.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_events(path: &Utf8Path) -> Result<Vec<RegistrationEvent>> {
    let data =
        fs::read_to_string(path).into_app_err_with(|| format!("reading event file '{path}'"))?;
    serde_json::from_str(&data).into_app_err_with(|| format!("parsing event file '{path}'"))
}

/// Run each recorded event through the pipeline, in order.
pub async fn replay(handler: &PreSignupHandler, events: Vec<RegistrationEvent>) -> Vec<ReplayOutcome> {
    let mut outcomes = Vec::with_capacity(events.len());

    for (index, event) in events.into_iter().enumerate() {
        let original = event.clone();
        let outcome = match handler.handle(event).await {
            Ok(event) => ReplayOutcome {
                index,
                error: None,
                event,
            },
            Err(e) => ReplayOutcome {
                index,
                error: Some(e.to_string()),
                event: original,
            },
        };
        outcomes.push(outcome);
    }

    outcomes
}
