//! Crate error type.
//!
//! Structural misuse (operating on a controller that has no widget, naming a
//! layout property outside the fixed set, a malformed key pattern) surfaces as
//! an [`UiError`] immediately. Lookup misses are not errors and return `None`.

use crate::controller::ControllerId;

/// Errors raised by controller, theme and backend operations.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("controller {0:?} has no widget")]
    NoWidget(ControllerId),
    #[error("unknown controller {0:?}")]
    UnknownController(ControllerId),
    #[error("controller {child:?} is an ancestor of {parent:?}")]
    Cycle { child: ControllerId, parent: ControllerId },
    #[error("unknown layout property: {0}")]
    UnknownProperty(String),
    #[error("invalid key pattern {pattern}: {source}")]
    InvalidKeyPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid theme (toml): {0}")]
    ThemeToml(#[from] toml::de::Error),
    #[error("invalid theme (json): {0}")]
    ThemeJson(#[from] serde_json::Error),
    #[error("terminal i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = UiError> = std::result::Result<T, E>;
