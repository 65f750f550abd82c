use serde::{Deserialize, Serialize};

/// The outcome of an email-quality check.
///
/// Immutable once produced. Field names are the wire names used in the
/// policy input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Quality score reported by the verification backend, 0 to 100.
    pub score: f32,

    /// Whether the address is considered deliverable.
    pub valid: bool,

    /// Whether the address belongs to a disposable-mailbox provider.
    pub disposable: bool,

    /// Whether the address is role-based (`info@`, `admin@`, ...).
    pub role: bool,

    /// Verbatim backend response body, preserved for audit and debugging.
    pub raw: String,
}

impl VerificationResult {
    /// The canonical result for addresses trusted without a backend call.
    #[must_use]
    pub fn fully_valid() -> Self {
        Self {
            score: 100.0,
            valid: true,
            disposable: false,
            role: false,
            raw: "{}".to_string(),
        }
    }
}
