#![forbid(unsafe_code)]

//! Errors surfaced to integrators.
//!
//! Close requests against absent modals are not errors; they are dropped
//! inside the session. What remains are integration mistakes.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    /// A modal context was requested with no matching provider in scope.
    NotInitialized,
    /// A configuration document could not be read or parsed.
    Config(String),
}

impl fmt::Display for ModalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => {
                f.write_str("modal context used outside of an active ModalProvider")
            }
            Self::Config(msg) => write!(f, "modal config error: {msg}"),
        }
    }
}

impl std::error::Error for ModalError {}
