//! Child enumeration for arena nodes.

use smallvec::SmallVec;

use super::node::{Argument, ArrayElement, NodeId, NodeKind, ObjectProperty, PropertyKey};

/// All direct children of a node, in source order. Used for parent-link
/// computation, scope analysis, and reference collection.
pub fn children(kind: &NodeKind) -> SmallVec<[NodeId; 4]> {
    let mut out = SmallVec::new();
    collect(kind, &mut out);
    out
}

fn push_key(key: &PropertyKey, out: &mut SmallVec<[NodeId; 4]>) {
    if let PropertyKey::Computed(id) = key {
        out.push(*id);
    }
}

fn collect(kind: &NodeKind, out: &mut SmallVec<[NodeId; 4]>) {
    use NodeKind::*;
    match kind {
        Program { body } | Block { body } => out.extend(body.iter().copied()),

        StringLit { .. } | NumberLit { .. } | BoolLit { .. } | BigIntLit { .. }
        | RegexLit { .. } | NullLit | Ident { .. } | Param { .. } | ClassExpr { .. }
        | ClassDecl { .. } | Break | Continue | Empty => {}

        TemplateLit { exprs, .. } | Sequence { exprs } => out.extend(exprs.iter().copied()),

        ArrayLit { elements } => {
            for el in elements {
                match el {
                    ArrayElement::Item(id) | ArrayElement::Spread(id) => out.push(*id),
                    ArrayElement::Hole => {}
                }
            }
        }
        ObjectLit { properties } => {
            for prop in properties {
                match prop {
                    ObjectProperty::Init { key, value } => {
                        push_key(key, out);
                        out.push(*value);
                    }
                    ObjectProperty::Spread(id) => out.push(*id),
                }
            }
        }

        Unary { operand, .. } | Update { operand, .. } => out.push(*operand),
        Binary { left, right, .. } | Logical { left, right, .. } => {
            out.push(*left);
            out.push(*right);
        }
        Assignment { target, value } => {
            out.push(*target);
            out.push(*value);
        }
        Conditional {
            test,
            consequent,
            alternate,
        } => {
            out.push(*test);
            out.push(*consequent);
            out.push(*alternate);
        }

        Member {
            object, property, ..
        } => {
            out.push(*object);
            push_key(property, out);
        }
        Call { callee, args, .. } | New { callee, args } => {
            out.push(*callee);
            for arg in args {
                match arg {
                    Argument::Plain(id) | Argument::Spread(id) => out.push(*id),
                }
            }
        }

        FunctionExpr { params, body, .. }
        | ArrowFunction { params, body }
        | FunctionDecl { params, body, .. } => {
            out.extend(params.iter().copied());
            out.push(*body);
        }

        VarDecl { declarators, .. } => out.extend(declarators.iter().copied()),
        Declarator { name, init } => {
            out.push(*name);
            if let Some(init) = init {
                out.push(*init);
            }
        }
        ExprStmt { expr } => out.push(*expr),
        If {
            test,
            consequent,
            alternate,
        } => {
            out.push(*test);
            out.push(*consequent);
            if let Some(alt) = alternate {
                out.push(*alt);
            }
        }
        Switch {
            discriminant,
            cases,
        } => {
            out.push(*discriminant);
            out.extend(cases.iter().copied());
        }
        SwitchCase { test, body } => {
            if let Some(test) = test {
                out.push(*test);
            }
            out.extend(body.iter().copied());
        }
        Return { argument } => {
            if let Some(arg) = argument {
                out.push(*arg);
            }
        }
        Throw { argument } => out.push(*argument),
        While { test, body } => {
            out.push(*test);
            out.push(*body);
        }
        ForOf { left, right, body } | ForIn { left, right, body } => {
            out.push(*left);
            out.push(*right);
            out.push(*body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::BinaryOp;

    #[test]
    fn test_binary_children_in_order() {
        let kind = NodeKind::Binary {
            op: BinaryOp::Add,
            left: NodeId(3),
            right: NodeId(7),
        };
        assert_eq!(children(&kind).as_slice(), &[NodeId(3), NodeId(7)]);
    }

    #[test]
    fn test_holes_skipped() {
        let kind = NodeKind::ArrayLit {
            elements: vec![
                ArrayElement::Hole,
                ArrayElement::Item(NodeId(1)),
                ArrayElement::Spread(NodeId(2)),
            ],
        };
        assert_eq!(children(&kind).as_slice(), &[NodeId(1), NodeId(2)]);
    }
}
