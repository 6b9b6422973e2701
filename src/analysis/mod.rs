//! Analysis passes and the public tracker facade
//!
//! Evidence extraction recurses through sub-expressions, consulting the
//! type model and, as a fallback, the flow-sensitive guard analyzer;
//! results are cached per node by the tracker.

pub mod annotations;
pub mod cfg;
pub mod guards;
pub mod infer;
pub mod oracle;
pub mod scope;
pub mod tracker;

pub use annotations::{parse_type_text, AnnotationLookup};
pub use cfg::{BranchTargets, ControlFlow, SegmentId};
pub use oracle::{OracleType, TypeOracle};
pub use scope::{Binding, BindingId, BindingKind, ScopeIndex};
pub use tracker::{TrackerConfig, TypeTracker, TypeTrackerBuilder};
