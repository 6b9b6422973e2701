//! The structural type model
//!
//! Algebraic representation of inferred runtime types and the immutable
//! built-in member registries behind them.

pub mod builtins;
pub mod types;

pub use types::{
    ArrayType, CallContext, CallMeta, FunctionResolver, FunctionType, GlobalObject, IterableType,
    MapType, ObjectType, PropEntry, SetType, StaticResolver, TypeClass, TypeInfo, TypeTag,
    TypeThunk, UnionCollector, UnionType,
};
