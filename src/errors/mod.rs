//! Internal failure taxonomy for the inference engine
//!
//! None of these ever escape the tracker's public query functions: every
//! failure degrades to the conservative "unknown" answer so dependent lint
//! rules avoid false positives rather than crash.

use std::fmt;

/// Why a single inference step could not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferError {
    /// An identifier has no traceable declaration.
    UnresolvableBinding { name: String },

    /// A node shape the engine does not cover.
    UnsupportedConstruct { detail: String },

    /// Malformed annotation text or another defensive failure.
    InternalInconsistency { message: String },

    /// A self-referential inference chain was cut. Handled structurally by
    /// the cache seeding scheme and never surfaced.
    CycleDetected,
}

impl InferError {
    pub fn unresolvable(name: impl Into<String>) -> Self {
        Self::UnresolvableBinding { name: name.into() }
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::UnsupportedConstruct { detail: detail.into() }
    }

    pub fn inconsistency(message: impl Into<String>) -> Self {
        Self::InternalInconsistency { message: message.into() }
    }
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvableBinding { name } => {
                write!(f, "no traceable declaration for '{}'", name)
            }
            Self::UnsupportedConstruct { detail } => {
                write!(f, "unsupported construct: {}", detail)
            }
            Self::InternalInconsistency { message } => {
                write!(f, "internal inconsistency: {}", message)
            }
            Self::CycleDetected => {
                write!(f, "cyclic inference chain")
            }
        }
    }
}

impl std::error::Error for InferError {}

pub type InferResult<T> = Result<T, InferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = InferError::unresolvable("x");
        assert_eq!(err.to_string(), "no traceable declaration for 'x'");

        let err = InferError::inconsistency("bad annotation");
        assert_eq!(err.to_string(), "internal inconsistency: bad annotation");
    }
}
