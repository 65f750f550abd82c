//! SendGrid-backed email verification.
//!
//! Implements [`EmailVerifier`] against the SendGrid email validation API,
//! with an allow-list short-circuit that skips the network entirely for
//! trusted domains.

use super::{EmailVerifier, VerificationResult};
use crate::Result;
use crate::config::Config;
use async_trait::async_trait;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

/// Upper bound on a single validation request. The hosting runtime imposes
/// its own invocation deadline; this keeps a hung validation service from
/// consuming all of it.
const VALIDATION_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source tag sent with every validation request.
const VALIDATION_SOURCE: &str = "cognito";

#[derive(Debug, Serialize)]
struct ValidationRequest<'a> {
    email: &'a str,
    source: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    #[serde(default)]
    result: ValidationVerdict,
}

#[derive(Debug, Default, Deserialize)]
struct ValidationVerdict {
    #[serde(default)]
    verdict: String,
    #[serde(default)]
    score: f32,
}

/// Email verifier backed by the SendGrid validation API.
#[derive(Debug, Clone)]
pub struct SendGridVerifier {
    client: reqwest::Client,
    api_host: String,
    allowlist: Option<Vec<String>>,
}

impl SendGridVerifier {
    /// Create a verifier from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed, e.g. when
    /// the configured credential is not a valid header value.
    pub fn new(config: &Config) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.sendgrid_api_key))
            .into_app_err("invalid email validation credential")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent("signup-gate")
            .default_headers(headers)
            .timeout(VALIDATION_REQUEST_TIMEOUT)
            .build()
            .into_app_err("could not build email validation client")?;

        let allowlist = config
            .email_verification_allowlist
            .clone()
            .filter(|entries| !entries.is_empty());

        Ok(Self {
            client,
            api_host: config.sendgrid_api_host.clone(),
            allowlist,
        })
    }

    /// Check the address against the configured domain allow-list.
    ///
    /// Returns `None` when the bypass does not apply: allow-list disabled,
    /// address not parseable, or domain not a member. Not applicable is
    /// never an error; the caller falls through to the networked strategy.
    fn verify_via_allowlist(&self, email: &str) -> Option<VerificationResult> {
        let allowlist = self.allowlist.as_ref()?;
        let domain = email_domain(email)?.to_ascii_lowercase();

        if allowlist.iter().any(|entry| *entry == domain) {
            Some(VerificationResult::fully_valid())
        } else {
            None
        }
    }

    /// Issue a single validation request to the SendGrid API.
    async fn verify_via_api(&self, email: &str) -> Result<VerificationResult> {
        let url = format!("{}/v3/validations/email", self.api_host);
        let request = ValidationRequest {
            email,
            source: VALIDATION_SOURCE,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .into_app_err("email validation request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .into_app_err("could not read email validation response")?;

        if !status.is_success() {
            return Err(app_err!("email validation service returned {status}: {body}"));
        }

        let payload: ValidationResponse =
            serde_json::from_str(&body).into_app_err("could not parse email validation response")?;

        Ok(VerificationResult {
            score: payload.result.score,
            valid: payload.result.verdict != "Invalid",
            disposable: false,
            role: false,
            raw: body,
        })
    }
}

#[async_trait]
impl EmailVerifier for SendGridVerifier {
    async fn verify_email(&self, email: &str) -> Result<VerificationResult> {
        if let Some(result) = self.verify_via_allowlist(email) {
            log::debug!("email domain was on allow-list: {email}");
            return Ok(result);
        }
        self.verify_via_api(email).await
    }
}

/// Extract the domain segment of an email address.
///
/// Returns `None` for addresses without a usable `local@domain` shape;
/// such addresses are not an allow-list concern.
fn email_domain(email: &str) -> Option<&str> {
    let email = email.trim();
    if email.contains(char::is_whitespace) {
        return None;
    }

    let (local, domain) = email.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }

    Some(domain)
}
