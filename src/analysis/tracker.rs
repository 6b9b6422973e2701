//! The memoized public query facade
//!
//! One `TypeTracker` is built per syntax tree and reused for every query
//! against it; a new tree needs a new tracker, which is what keeps the
//! per-node cache from leaking across trees. All queries route through the
//! single memoized inference entry point and never fail: the conservative
//! answer is always "unknown".

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::analysis::annotations::AnnotationLookup;
use crate::analysis::infer::InferCtx;
use crate::analysis::oracle::TypeOracle;
use crate::ast::{NodeId, SyntaxTree};
use crate::core::types::{TypeInfo, TypeTag};

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    64
}

/// Engine knobs. The defaults match lint-pass usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Consult author annotations.
    #[serde(default = "default_true")]
    pub use_annotations: bool,

    /// Consult flow-sensitive guard narrowing as last-resort evidence.
    #[serde(default = "default_true")]
    pub narrow_with_guards: bool,

    /// Recursion ceiling; inference past it degrades to unknown.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            use_annotations: true,
            narrow_with_guards: true,
            max_depth: default_max_depth(),
        }
    }
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(mut self, enabled: bool) -> Self {
        self.use_annotations = enabled;
        self
    }

    pub fn with_guard_narrowing(mut self, enabled: bool) -> Self {
        self.narrow_with_guards = enabled;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Pure type queries over one bound syntax tree.
pub struct TypeTracker {
    ctx: Rc<InferCtx>,
}

impl TypeTracker {
    pub fn new(tree: Rc<SyntaxTree>) -> Self {
        Self::builder(tree).build()
    }

    pub fn builder(tree: Rc<SyntaxTree>) -> TypeTrackerBuilder {
        TypeTrackerBuilder {
            tree,
            config: TrackerConfig::default(),
            oracle: None,
            annotations: None,
        }
    }

    /// Flattened union member names, sorted and deduplicated; `[]` when
    /// the type is unknown.
    #[instrument(skip(self), level = "debug")]
    pub fn get_types(&self, node: NodeId) -> Vec<String> {
        match self.ctx.type_of(node) {
            Some(ty) => ty.type_names(),
            None => Vec::new(),
        }
    }

    /// Whether the expression is certainly textual.
    pub fn is_string(&self, node: NodeId) -> bool {
        self.ctx
            .type_of(node)
            .is_some_and(|ty| ty.is_exactly(TypeTag::String))
    }

    /// Permissive mode: string, or nothing known to rule it out.
    pub fn maybe_string(&self, node: NodeId) -> bool {
        match self.ctx.type_of(node) {
            Some(ty) => ty.has(TypeTag::String),
            None => true,
        }
    }

    pub fn is_regexp(&self, node: NodeId) -> bool {
        self.ctx
            .type_of(node)
            .is_some_and(|ty| ty.is_exactly(TypeTag::RegExp))
    }

    /// The raw inference result, for consumers that need structural access.
    pub fn type_info(&self, node: NodeId) -> Option<TypeInfo> {
        self.ctx.type_of(node)
    }
}

pub struct TypeTrackerBuilder {
    tree: Rc<SyntaxTree>,
    config: TrackerConfig,
    oracle: Option<Rc<dyn TypeOracle>>,
    annotations: Option<Rc<dyn AnnotationLookup>>,
}

impl TypeTrackerBuilder {
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds an external, independently-authoritative type checker. It is
    /// consulted first, unconditionally, for every node.
    pub fn oracle(mut self, oracle: Rc<dyn TypeOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn annotations(mut self, annotations: Rc<dyn AnnotationLookup>) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn build(self) -> TypeTracker {
        TypeTracker {
            ctx: Rc::new(InferCtx::new(
                self.tree,
                self.config,
                self.oracle,
                self.annotations,
            )),
        }
    }
}
