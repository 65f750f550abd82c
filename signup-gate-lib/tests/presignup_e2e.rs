//! End-to-end pipeline tests: real policy documents on disk, a mock
//! verification provider, no network.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use signup_gate_lib::Result;
use signup_gate_lib::config::Config;
use signup_gate_lib::event::RegistrationEvent;
use signup_gate_lib::handlers::PreSignupHandler;
use signup_gate_lib::verify::{EmailVerifier, VerificationResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// Policy: allow when verification is absent or valid; deny when invalid.
const TEST_POLICY: &str = r#"
    {
        "presignup": {
            "result": input.emailVerification == null || input.emailVerification.valid
                ? {"action": "allow", "response": {"autoConfirmUser": true}}
                : {"action": "deny", "reason": "invalid"}
        }
    }
"#;

/// Implements the verification capability without any network.
#[derive(Clone)]
struct MockVerifier {
    valid: bool,
    calls: Arc<AtomicUsize>,
    last_email: Arc<Mutex<String>>,
}

impl MockVerifier {
    fn new(valid: bool) -> Self {
        Self {
            valid,
            calls: Arc::new(AtomicUsize::new(0)),
            last_email: Arc::new(Mutex::new(String::new())),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_email(&self) -> String {
        self.last_email.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailVerifier for MockVerifier {
    async fn verify_email(&self, email: &str) -> Result<VerificationResult> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_email.lock().unwrap() = email.to_string();
        Ok(VerificationResult {
            valid: self.valid,
            ..VerificationResult::fully_valid()
        })
    }
}

struct PolicyFile {
    _dir: tempfile::TempDir,
    path: Utf8PathBuf,
}

fn write_temp_policy(contents: &str) -> PolicyFile {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::try_from(dir.path().join("policy.cel")).unwrap();
    std::fs::write(&path, contents).unwrap();
    PolicyFile { _dir: dir, path }
}

fn test_config(policy_path: Utf8PathBuf) -> Config {
    Config {
        log_level: "debug".to_string(),
        policy_path,
        email_verification_enabled: true,
        email_verification_trigger_sources: vec!["PreSignUp_SignUp".to_string()],
        sendgrid_api_host: "https://api.sendgrid.com".to_string(),
        ..Config::default()
    }
}

fn signup_event(trigger: &str, email: &str) -> RegistrationEvent {
    let mut event = RegistrationEvent {
        trigger_source: trigger.to_string(),
        ..RegistrationEvent::default()
    };
    let _ = event
        .request
        .user_attributes
        .insert("email".to_string(), email.to_string());
    event
}

#[tokio::test]
async fn allow_when_verifier_valid() {
    let policy = write_temp_policy(TEST_POLICY);
    let verifier = MockVerifier::new(true);
    let handler =
        PreSignupHandler::with_verifier(test_config(policy.path.clone()), Box::new(verifier.clone()))
            .unwrap();

    let out = handler
        .handle(signup_event("PreSignUp_SignUp", "ok@example.com"))
        .await
        .unwrap();

    assert!(out.response.auto_confirm_user, "expected autoConfirmUser=true when allowed");
    assert_eq!(verifier.calls(), 1, "expected verifier to be called once");
    assert_eq!(verifier.last_email(), "ok@example.com");
}

#[tokio::test]
async fn deny_when_verifier_invalid() {
    let policy = write_temp_policy(TEST_POLICY);
    let verifier = MockVerifier::new(false);
    let handler =
        PreSignupHandler::with_verifier(test_config(policy.path.clone()), Box::new(verifier.clone()))
            .unwrap();

    let err = handler
        .handle(signup_event("PreSignUp_SignUp", "nope@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid");
    assert_eq!(verifier.calls(), 1, "expected verifier to be called once");
}

#[tokio::test]
async fn skip_verification_for_non_matching_trigger() {
    let policy = write_temp_policy(TEST_POLICY);
    let verifier = MockVerifier::new(true);
    let handler =
        PreSignupHandler::with_verifier(test_config(policy.path.clone()), Box::new(verifier.clone()))
            .unwrap();

    let out = handler
        .handle(signup_event("PreSignUp_ExternalProvider", "skip@federated.test"))
        .await
        .unwrap();

    assert!(out.response.auto_confirm_user, "expected allow on external provider");
    assert_eq!(verifier.calls(), 0, "expected verifier not to be called");
}

#[tokio::test]
async fn allowlist_bypasses_network() {
    let policy = write_temp_policy(TEST_POLICY);

    // Allow-list example.com; the production verifier short-circuits before
    // ever touching its (real) API host.
    let mut config = test_config(policy.path.clone());
    config.email_verification_allowlist = Some(vec!["example.com".to_string()]);

    let handler = PreSignupHandler::new(config).unwrap();

    let out = handler
        .handle(signup_event("PreSignUp_SignUp", "user@example.com"))
        .await
        .unwrap();

    assert!(out.response.auto_confirm_user, "expected allow for allow-listed domain");
}

#[tokio::test]
async fn startup_fails_without_policy() {
    let err = PreSignupHandler::with_verifier(
        test_config(Utf8PathBuf::from("/missing/policy.cel")),
        Box::new(MockVerifier::new(true)),
    )
    .unwrap_err();

    assert!(err.to_string().contains("reading policy document"));
}
