//! Pre-signup decision handler.

use super::{PolicyAction, PolicyInput, PolicyOutput};
use crate::Result;
use crate::config::Config;
use crate::event::RegistrationEvent;
use crate::policy::{self, PolicyDocument};
use crate::verify::{EmailVerifier, SendGridVerifier, VerificationResult};
use core::fmt;
use ohno::app_err;

/// Logical address of the pre-signup decision in the policy document.
const POLICY_QUERY: &str = "presignup.result";

/// User attribute holding the registrant's email address.
const EMAIL_ATTRIBUTE: &str = "email";

/// Orchestrates one pre-signup invocation: conditional verification,
/// policy evaluation, and decision mapping.
pub struct PreSignupHandler {
    config: Config,
    policy: PolicyDocument,
    verifier: Box<dyn EmailVerifier>,
}

impl PreSignupHandler {
    /// Create a handler with the production verification provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy document cannot be loaded or the
    /// provider cannot be constructed; both are startup-fatal.
    pub fn new(config: Config) -> Result<Self> {
        let verifier = SendGridVerifier::new(&config)?;
        Self::with_verifier(config, Box::new(verifier))
    }

    /// Create a handler with an explicit verification provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy document cannot be loaded.
    pub fn with_verifier(config: Config, verifier: Box<dyn EmailVerifier>) -> Result<Self> {
        if config.policy_path.as_str().is_empty() {
            return Err(app_err!("policy path is empty"));
        }
        let policy = PolicyDocument::load(&config.policy_path)?;

        Ok(Self {
            config,
            policy,
            verifier,
        })
    }

    /// Run one event through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error only for a policy-authored deny; the error message
    /// is the policy's stated reason. Infrastructure failures (verification
    /// service down, policy evaluation failure) never surface here.
    pub async fn handle(&self, event: RegistrationEvent) -> Result<RegistrationEvent> {
        if self.config.debug_enabled {
            match serde_json::to_string(&event) {
                Ok(json) => log::debug!("handling event: {json}"),
                Err(e) => log::warn!("failed to serialize triggered event: {e}"),
            }
        }

        let verification = self.verify_email(&event).await;
        let input = PolicyInput::new(&event, verification.as_ref());
        let outcome = policy::evaluate::<_, PolicyOutput>(&self.policy, POLICY_QUERY, &input);

        apply_decision(event, outcome)
    }

    /// The conditional verification gate.
    ///
    /// Every skip and failure condition resolves to `None`: the policy
    /// receives no verification signal and decides the final disposition.
    /// Only an explicit verdict carried in a successful result can lead to
    /// a deny, and only through the policy.
    async fn verify_email(&self, event: &RegistrationEvent) -> Option<VerificationResult> {
        if !self.config.email_verification_enabled {
            return None;
        }

        if !self
            .config
            .email_verification_trigger_sources
            .iter()
            .any(|source| *source == event.trigger_source)
        {
            return None;
        }

        let email = event
            .request
            .user_attributes
            .get(EMAIL_ATTRIBUTE)
            .map(String::as_str)
            .unwrap_or_default();
        if email.is_empty() {
            log::info!("skipping email verification because no email address was found");
            return None;
        }

        match self.verifier.verify_email(email).await {
            Ok(result) => Some(result),
            Err(e) => {
                log::warn!("email verification error: {e:#}");
                None
            }
        }
    }
}

impl fmt::Debug for PreSignupHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreSignupHandler")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Map the evaluation outcome onto the event.
///
/// An evaluation error is recovered as a fail-open allow: the event goes
/// back unmodified and the platform's default flow proceeds. A deny leaves
/// the event unmodified and carries the policy's reason as the error
/// message. Anything else splices the policy's response into the event.
fn apply_decision(
    mut event: RegistrationEvent,
    outcome: Result<PolicyOutput>,
) -> Result<RegistrationEvent> {
    let output = match outcome {
        Ok(output) => output,
        Err(e) => {
            log::error!("failed to evaluate policy: {e:#}");
            return Ok(event);
        }
    };

    if output.action == PolicyAction::Deny {
        let reason = output.reason.unwrap_or_default();
        return Err(app_err!("{reason}"));
    }

    event.response = output.response;
    Ok(event)
}
