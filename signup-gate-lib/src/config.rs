//! Process-wide configuration sourced from environment variables.
//!
//! Configuration is read once at process start and treated as read-only for
//! the process lifetime; components receive it by value at construction time
//! rather than through a global. All variables live under the `APP_` prefix
//! so the deployment surface stays identical across entry points.

use camino::Utf8PathBuf;

/// The trigger source verified by default when none are configured.
pub const DEFAULT_TRIGGER_SOURCE: &str = "PreSignUp_SignUp";

/// Default host of the email validation service.
pub const DEFAULT_SENDGRID_API_HOST: &str = "https://api.sendgrid.com";

/// Immutable process configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Log filter level (`error`, `warn`, `info`, `debug`, `trace`); empty means `info`.
    pub log_level: String,

    /// Path to the policy document evaluated for every event.
    pub policy_path: Utf8PathBuf,

    /// When set, inbound events are dumped to the debug log and the log
    /// level is forced to `debug`.
    pub debug_enabled: bool,

    /// Path to the recorded-event fixture used by the replay tool.
    pub debug_data_path: Utf8PathBuf,

    /// Master switch for the email verification gate.
    pub email_verification_enabled: bool,

    /// Trigger sources for which verification applies. Matching is exact
    /// string equality, no wildcards.
    pub email_verification_trigger_sources: Vec<String>,

    /// Email domains trusted without a network call. `None` disables the
    /// allow-list bypass entirely; entries are stored lowercased.
    pub email_verification_allowlist: Option<Vec<String>>,

    /// Base URL of the email validation service.
    pub sendgrid_api_host: String,

    /// Credential for the email validation service.
    pub sendgrid_api_key: String,
}

impl Config {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Tests use this with a map instead of mutating the process
    /// environment.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();

        let mut config = Self {
            log_level: get("APP_LOG_LEVEL"),
            policy_path: Utf8PathBuf::from(get("APP_POLICY_PATH")),
            debug_enabled: get("APP_DEBUG_ENABLED") == "true",
            debug_data_path: Utf8PathBuf::from(get("APP_DEBUG_DATA_PATH")),
            email_verification_enabled: get("APP_EMAIL_VERIFICATION_ENABLED") == "true",
            email_verification_trigger_sources: Vec::new(),
            email_verification_allowlist: None,
            sendgrid_api_host: get("APP_SENDGRID_API_HOST"),
            sendgrid_api_key: get("APP_SENDGRID_EMAIL_VERIFICATION_API_KEY"),
        };

        let allowlist = get("APP_EMAIL_VERIFICATION_WHITELIST");
        let allowlist = allowlist.trim();
        if !allowlist.is_empty() {
            config.email_verification_allowlist = Some(
                allowlist
                    .split(',')
                    .map(|entry| entry.trim().to_ascii_lowercase())
                    .collect(),
            );
        }

        let triggers = get("APP_EMAIL_VERIFICATION_FOR_TRIGGER_SOURCES");
        let triggers = triggers.trim();
        let triggers = if triggers.is_empty() { DEFAULT_TRIGGER_SOURCE } else { triggers };
        config.email_verification_trigger_sources =
            triggers.split(',').map(|entry| entry.trim().to_string()).collect();

        if config.sendgrid_api_host.is_empty() {
            config.sendgrid_api_host = DEFAULT_SENDGRID_API_HOST.to_string();
        }

        if config.debug_enabled {
            config.log_level = "debug".to_string();
        }

        config
    }

    /// Whether the allow-list bypass is enabled.
    #[must_use]
    pub fn allowlist_enabled(&self) -> bool {
        self.email_verification_allowlist
            .as_ref()
            .is_some_and(|allowlist| !allowlist.is_empty())
    }
}
