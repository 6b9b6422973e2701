//! Author-written type annotations
//!
//! The lookup itself is a collaborator contract: hosts map declaration
//! nodes to free-form annotation text however they store it (doc comments,
//! side tables). This module parses that text into the internal type
//! vocabulary. Malformed text is an internal inconsistency and degrades to
//! unknown at the tracker boundary.

use std::collections::HashMap;
use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

use crate::ast::NodeId;
use crate::core::types::{TypeInfo, UnionCollector};
use crate::errors::{InferError, InferResult};

/// Declaration node -> annotation text, provided by the host.
pub trait AnnotationLookup {
    fn type_text(&self, decl: NodeId) -> Option<String>;
}

impl AnnotationLookup for HashMap<NodeId, String> {
    fn type_text(&self, decl: NodeId) -> Option<String> {
        self.get(&decl).cloned()
    }
}

/// Parses annotation text like `string`, `Array<number>`, `string[]`, or
/// `string | null`. `Ok(None)` means the text is well-formed but carries no
/// type information (`any`, `*`, `unknown`).
pub fn parse_type_text(text: &str) -> InferResult<Option<TypeInfo>> {
    let mut parser = Parser {
        chars: text.chars().peekable(),
        source: text,
    };
    let parsed = parser.union()?;
    parser.skip_ws();
    if parser.chars.peek().is_some() {
        return Err(InferError::inconsistency(format!(
            "trailing input in annotation '{}'",
            text
        )));
    }
    Ok(parsed)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    source: &'a str,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> InferResult<()> {
        self.skip_ws();
        if self.chars.next_if_eq(&expected).is_some() {
            Ok(())
        } else {
            Err(InferError::inconsistency(format!(
                "expected '{}' in annotation '{}'",
                expected, self.source
            )))
        }
    }

    fn peek_is(&mut self, expected: char) -> bool {
        self.skip_ws();
        self.chars.peek() == Some(&expected)
    }

    /// `union := term ('|' term)*`. A union with any unknowable member is
    /// itself unknowable.
    fn union(&mut self) -> InferResult<Option<TypeInfo>> {
        let mut members = vec![self.term()?];
        while self.peek_is('|') {
            self.chars.next();
            members.push(self.term()?);
        }
        let mut collector = UnionCollector::new();
        for member in members {
            match member {
                Some(member) => collector.add(member),
                None => return Ok(None),
            }
        }
        Ok(collector.build())
    }

    /// `term := base ('[' ']')*`
    fn term(&mut self) -> InferResult<Option<TypeInfo>> {
        let mut base = self.base()?;
        while self.peek_is('[') {
            self.chars.next();
            self.eat(']')?;
            base = Some(match base {
                Some(element) => TypeInfo::array_of(element),
                None => TypeInfo::array_unknown(),
            });
        }
        Ok(base)
    }

    fn base(&mut self) -> InferResult<Option<TypeInfo>> {
        self.skip_ws();
        if self.peek_is('(') {
            self.chars.next();
            let inner = self.union()?;
            self.eat(')')?;
            return Ok(inner);
        }
        if self.peek_is('*') {
            self.chars.next();
            return Ok(None);
        }
        let name = self.ident()?;
        match name.as_str() {
            "string" | "String" => Ok(Some(TypeInfo::string())),
            "number" | "Number" => Ok(Some(TypeInfo::number())),
            "boolean" | "Boolean" => Ok(Some(TypeInfo::boolean())),
            "bigint" | "BigInt" => Ok(Some(TypeInfo::bigint())),
            "null" => Ok(Some(TypeInfo::Null)),
            "undefined" | "void" => Ok(Some(TypeInfo::Undefined)),
            "RegExp" => Ok(Some(TypeInfo::regexp())),
            "Function" | "function" => Ok(Some(TypeInfo::function_unknown())),
            "Object" | "object" => Ok(Some(TypeInfo::object_opaque())),
            "Array" => {
                let args = self.type_args(1)?;
                Ok(Some(match args {
                    Some(mut args) => match args.remove(0) {
                        Some(element) => TypeInfo::array_of(element),
                        None => TypeInfo::array_unknown(),
                    },
                    None => TypeInfo::array_unknown(),
                }))
            }
            "Set" => {
                let args = self.type_args(1)?;
                Ok(Some(match args {
                    Some(mut args) => match args.remove(0) {
                        Some(element) => {
                            TypeInfo::set(Rc::new(move || vec![Some(element.clone())]))
                        }
                        None => TypeInfo::set_unknown(),
                    },
                    None => TypeInfo::set_unknown(),
                }))
            }
            "Map" => {
                let args = self.type_args(2)?;
                Ok(Some(match args {
                    Some(mut args) => {
                        let value = args.remove(1);
                        let key = args.remove(0);
                        TypeInfo::map(
                            Rc::new(move || vec![key.clone()]),
                            Rc::new(move || vec![value.clone()]),
                        )
                    }
                    None => TypeInfo::map_unknown(),
                }))
            }
            "Iterable" => {
                let args = self.type_args(1)?;
                Ok(Some(match args {
                    Some(mut args) => match args.remove(0) {
                        Some(element) => TypeInfo::iterable_of(element),
                        None => TypeInfo::iterable(Rc::new(|| None)),
                    },
                    None => TypeInfo::iterable(Rc::new(|| None)),
                }))
            }
            "any" | "unknown" => Ok(None),
            other => Err(InferError::inconsistency(format!(
                "unrecognized annotation name '{}'",
                other
            ))),
        }
    }

    /// Optional `<T, ...>` argument list with an expected arity.
    #[allow(clippy::type_complexity)]
    fn type_args(&mut self, arity: usize) -> InferResult<Option<Vec<Option<TypeInfo>>>> {
        if !self.peek_is('<') {
            return Ok(None);
        }
        self.chars.next();
        let mut args = vec![self.union()?];
        while self.peek_is(',') {
            self.chars.next();
            args.push(self.union()?);
        }
        self.eat('>')?;
        if args.len() != arity {
            return Err(InferError::inconsistency(format!(
                "expected {} type argument(s) in annotation '{}'",
                arity, self.source
            )));
        }
        Ok(Some(args))
    }

    fn ident(&mut self) -> InferResult<String> {
        self.skip_ws();
        let mut name = String::new();
        while self
            .chars
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        {
            name.push(self.chars.next().expect("peeked character exists"));
        }
        if name.is_empty() {
            Err(InferError::inconsistency(format!(
                "empty type name in annotation '{}'",
                self.source
            )))
        } else {
            Ok(name)
        }
    }
}
