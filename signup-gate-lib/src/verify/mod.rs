//! Email verification providers.
//!
//! A verification provider answers one question: how trustworthy is this
//! email address? The answer feeds the policy evaluation as an optional
//! signal; the provider itself never decides whether a registration
//! proceeds.
//!
//! # Implementation Model
//!
//! [`EmailVerifier`] is the capability the orchestrator depends on, kept
//! behind a trait object so tests and alternate backends can substitute an
//! implementation without touching the pipeline. The production
//! implementation is [`SendGridVerifier`], which composes two strategies
//! with priority:
//!
//! 1. **Allow-list**: when the address's domain is on the configured
//!    allow-list, return a canonical fully-valid result with no network
//!    call.
//! 2. **Networked**: a single request to the validation service; its
//!    verdict and score are mapped into a [`VerificationResult`] and the
//!    raw response body is preserved verbatim for audit.
//!
//! Transport and parse failures surface as errors to the caller; the
//! verification gate decides what a missing signal means.

mod result;
mod sendgrid;

pub use result::VerificationResult;
pub use sendgrid::SendGridVerifier;

use crate::Result;
use async_trait::async_trait;

/// Capability to assess the quality of an email address.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    /// Verify a single email address.
    ///
    /// # Errors
    ///
    /// Returns an error when the verification infrastructure itself fails
    /// (transport, service, or response-parsing problems). A deliverable
    /// but low-quality address is not an error; it is a result with
    /// `valid == false`.
    async fn verify_email(&self, email: &str) -> Result<VerificationResult>;
}
