//! External type oracle
//!
//! Collaborator contract for an independently-authoritative type checker.
//! When an oracle is bound it is consulted first, unconditionally, and its
//! vocabulary is translated into the internal one; heuristic evidence runs
//! only when it answers `None`. The two stages never interleave.

use std::rc::Rc;

use crate::ast::NodeId;
use crate::core::types::{TypeInfo, UnionCollector};

/// Structural classification in the oracle's own vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleType {
    String,
    Number,
    Boolean,
    BigInt,
    Null,
    Undefined,
    RegExp,
    Function,
    Object,
    Array(Option<Box<OracleType>>),
    Set(Option<Box<OracleType>>),
    Map(Option<Box<OracleType>>, Option<Box<OracleType>>),
    Iterable(Option<Box<OracleType>>),
    Union(Vec<OracleType>),
    /// The oracle ran but could not classify the expression.
    Unknown,
}

/// Expression node -> authoritative classification.
pub trait TypeOracle {
    fn classify(&self, node: NodeId) -> Option<OracleType>;
}

/// Translates an oracle answer into the internal vocabulary. `None` means
/// the answer carries no usable information.
pub fn translate(answer: &OracleType) -> Option<TypeInfo> {
    match answer {
        OracleType::String => Some(TypeInfo::string()),
        OracleType::Number => Some(TypeInfo::number()),
        OracleType::Boolean => Some(TypeInfo::boolean()),
        OracleType::BigInt => Some(TypeInfo::bigint()),
        OracleType::Null => Some(TypeInfo::Null),
        OracleType::Undefined => Some(TypeInfo::Undefined),
        OracleType::RegExp => Some(TypeInfo::regexp()),
        OracleType::Function => Some(TypeInfo::function_unknown()),
        OracleType::Object => Some(TypeInfo::object_opaque()),
        OracleType::Array(element) => {
            let element = element.as_deref().and_then(translate);
            Some(TypeInfo::array(
                Rc::new(move || vec![element.clone()]),
                false,
            ))
        }
        OracleType::Set(element) => {
            let element = element.as_deref().and_then(translate);
            Some(TypeInfo::set(Rc::new(move || vec![element.clone()])))
        }
        OracleType::Map(key, value) => {
            let key = key.as_deref().and_then(translate);
            let value = value.as_deref().and_then(translate);
            Some(TypeInfo::map(
                Rc::new(move || vec![key.clone()]),
                Rc::new(move || vec![value.clone()]),
            ))
        }
        OracleType::Iterable(element) => {
            let element = element.as_deref().and_then(translate);
            Some(TypeInfo::iterable(Rc::new(move || element.clone())))
        }
        OracleType::Union(members) => {
            let mut collector = UnionCollector::new();
            for member in members {
                collector.add(translate(member)?);
            }
            collector.build()
        }
        OracleType::Unknown => None,
    }
}
