//! Per-event orchestration and decision mapping.
//!
//! # Implementation Model
//!
//! [`PreSignupHandler`] wires one invocation end to end: it decides whether
//! email verification applies (the conditional gate), assembles a
//! [`PolicyInput`], hands it to the policy evaluator, and maps the
//! resulting [`PolicyOutput`] onto the event.
//!
//! The handler holds only immutable state (configuration, the compiled
//! policy document, the verification provider), so the hosting runtime may
//! invoke it concurrently. Each run is independent and idempotent given
//! identical input and identical external responses.

mod presignup;

pub use presignup::PreSignupHandler;

use crate::event::{CallerContext, RegistrationEvent, RegistrationResponse};
use crate::verify::VerificationResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The structured document evaluated by the policy for one event.
///
/// Serialized once per request; never mutated after construction. The
/// `emailVerification` field is always present and `null` when
/// verification was skipped, so policies can test it without existence
/// checks.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyInput<'a> {
    pub trigger: &'a str,
    pub caller_context: &'a CallerContext,
    pub user_attributes: &'a HashMap<String, String>,
    pub client_metadata: &'a HashMap<String, String>,
    pub email_verification: Option<&'a VerificationResult>,
}

impl<'a> PolicyInput<'a> {
    /// Assemble the policy input from an event and an optional
    /// verification outcome. Pure; missing fields map to empty values.
    #[must_use]
    pub fn new(event: &'a RegistrationEvent, verification: Option<&'a VerificationResult>) -> Self {
        Self {
            trigger: &event.trigger_source,
            caller_context: &event.caller_context,
            user_attributes: &event.request.user_attributes,
            client_metadata: &event.request.client_metadata,
            email_verification: verification,
        }
    }
}

/// The decision a policy expresses for one event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyOutput {
    pub action: PolicyAction,

    /// Expected when the action is deny; becomes the error message seen by
    /// the hosting runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Spliced into the event's response section when the registration is
    /// allowed.
    #[serde(default)]
    pub response: RegistrationResponse,
}

/// Action tag carried in a policy decision. Anything other than `deny`
/// allows the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Deny,
    #[serde(other)]
    Other,
}
