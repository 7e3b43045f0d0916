// Library error type
//
// Domain-level "errors" (a failed password check, an out-of-bounds Next) are UI
// states, not errors; this type only covers real integration failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    /// An accessor call referenced an element id the host never registered.
    /// Surfaced to the caller instead of being swallowed, so a mismatch between
    /// the wizard configuration and the host markup shows up immediately.
    #[error("no element registered with id '{0}'")]
    MissingElement(String),

    #[error("invalid wizard configuration: {0}")]
    InvalidConfig(String),
}
