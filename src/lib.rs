//! typetrack: heuristic runtime-type inference for lint rules
//!
//! Infers the likely runtime type of arbitrary expressions in a
//! dynamically-typed source program, so lint rules can decide whether it is
//! safe to fire (is a `.replace` receiver certainly textual?). The engine
//! is deliberately conservative: whenever evidence runs out it answers
//! "unknown" rather than guessing, and nothing it does can fail into a
//! caller.

// Core modules
pub mod analysis;
pub mod ast;
pub mod core;
pub mod errors;
pub mod infrastructure;

// Re-export commonly used items
pub use crate::analysis::{
    AnnotationLookup, OracleType, ScopeIndex, TrackerConfig, TypeOracle, TypeTracker,
    TypeTrackerBuilder,
};
pub use crate::ast::{NodeId, NodeKind, SyntaxTree, TreeBuilder};
pub use crate::core::{GlobalObject, TypeClass, TypeInfo, TypeTag};
pub use crate::errors::{InferError, InferResult};
pub use crate::infrastructure::{init_logging, LogConfig, LogFormat};
