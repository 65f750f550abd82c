//! Registration event model.
//!
//! These types mirror the Cognito user-pool pre-signup trigger payload.
//! Field names follow the wire format exactly; every field defaults so that
//! partial recordings and future payload additions deserialize cleanly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pre-signup registration event as delivered by the hosting runtime.
///
/// The pipeline reads the trigger source, caller context, and request
/// section; only the decision mapper writes, and only to [`Self::response`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationEvent {
    pub version: String,
    pub region: String,
    pub user_pool_id: String,
    pub user_name: String,
    pub caller_context: CallerContext,
    pub trigger_source: String,
    pub request: RegistrationRequest,
    pub response: RegistrationResponse,
}

/// Metadata about the client that triggered the event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallerContext {
    pub aws_sdk_version: String,
    pub client_id: String,
}

/// The read-only request section of a registration event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub user_attributes: HashMap<String, String>,
    pub validation_data: HashMap<String, String>,
    pub client_metadata: HashMap<String, String>,
}

/// The mutable response section filled in when a registration is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub auto_confirm_user: bool,
    pub auto_verify_email: bool,
    pub auto_verify_phone: bool,
}
