//! Syntax tree representation
//!
//! An index-arena tree of expressions, statements, and patterns with parent
//! links. Parsing is out of scope: hosts hand the library an already-built
//! tree, either converted from their own parser output or assembled with
//! [`TreeBuilder`].

pub mod node;
pub mod tree;
pub mod walk;

pub use node::{
    Argument, ArrayElement, BinaryOp, DeclKind, LogicalOp, NodeId, NodeKind, ObjectProperty,
    PropertyKey, UnaryOp, UpdateOp,
};
pub use tree::{SyntaxTree, TreeBuilder};
pub use walk::children;
