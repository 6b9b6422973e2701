//! Flow-sensitive type guard narrowing
//!
//! Last-resort evidence: refines an identifier or member path using the
//! conditionals that dominate its occurrence. Recognized guard shapes are
//! `typeof x === "T"`, `x instanceof C`, `x === literal`,
//! `Array.isArray(x)`, and `switch` over `x` or `typeof x`, optionally
//! wrapped in `!`, `Boolean(...)`, and `&&`/`||` combinators. The walk out
//! of a guard tracks a negation flag and two unknown-side flags; any
//! combination outside the fixed algebra bails to "no narrowing".
//!
//! Answering a query walks the occurrence's segment and its transitive
//! predecessors. Sibling paths on the same side must agree (their types
//! are intersected); the consequent and alternate results are unioned.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::trace;

use crate::analysis::cfg::{ControlFlow, SegmentId};
use crate::analysis::infer::{member_path, InferCtx};
use crate::ast::node::{Argument, PropertyKey};
use crate::ast::{BinaryOp, LogicalOp, NodeId, NodeKind, SyntaxTree, UnaryOp};
use crate::core::builtins;
use crate::core::types::{TypeInfo, UnionCollector};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Consequent,
    Alternate,
}

/// Relation between the current expression's truth and the guard's truth.
#[derive(Clone, Copy)]
struct Polarity {
    not: bool,
    /// Expression-true no longer pins the guard (set under `||`).
    cons_unknown: bool,
    /// Expression-false no longer pins the guard (set under `&&`).
    alt_unknown: bool,
}

impl Polarity {
    fn new(not: bool) -> Self {
        Self {
            not,
            cons_unknown: false,
            alt_unknown: false,
        }
    }

    fn negate(&mut self) {
        self.not = !self.not;
        std::mem::swap(&mut self.cons_unknown, &mut self.alt_unknown);
    }
}

/// What a set of sibling control-flow paths agreed on for one side.
#[derive(Clone)]
enum Gather {
    /// A back edge; contributes nothing either way.
    Cycle,
    NotSeen,
    Agreed(TypeInfo),
    Conflict,
}

pub(crate) fn narrow(ctx: &Rc<InferCtx>, node: NodeId) -> Option<TypeInfo> {
    let tree = Rc::clone(&ctx.tree);
    let (root, path) = member_path(&tree, node)?;
    let binding_id = ctx.scopes.resolve(root)?;
    let binding = ctx.scopes.binding(binding_id);
    // a reassigned binding may change between the guard and the occurrence
    if !binding.writes.is_empty() {
        return None;
    }
    let reads = binding.reads.clone();

    let cfg = ctx.cfg();
    let occurrence = cfg.segment_of(node)?;

    let mut analyzer = Analyzer {
        ctx,
        tree: &tree,
        cfg,
        attachments: HashMap::new(),
    };
    for read in reads {
        if let Some(expr) = cover_path(&tree, read, &path) {
            analyzer.collect_guards(expr);
        }
    }
    if analyzer.attachments.is_empty() {
        return None;
    }
    trace!(
        node = node.0,
        guarded_segments = analyzer.attachments.len(),
        "guard narrowing query"
    );

    let mut visited = HashSet::new();
    let (cons, alt) = analyzer.gather(occurrence, &mut visited);
    let mut collector = UnionCollector::new();
    if let Gather::Agreed(ty) = cons {
        collector.add(ty);
    }
    if let Gather::Agreed(ty) = alt {
        collector.add(ty);
    }
    collector.build()
}

/// Climbs from a read reference over `path` member links; yields the
/// covering expression when the static property names match exactly.
fn cover_path(tree: &SyntaxTree, read: NodeId, path: &[String]) -> Option<NodeId> {
    let mut current = read;
    for name in path {
        let parent = tree.parent(current)?;
        match tree.kind(parent) {
            NodeKind::Member {
                object,
                property: PropertyKey::Static(prop),
                ..
            } if *object == current && prop == name => current = parent,
            _ => return None,
        }
    }
    Some(current)
}

struct Analyzer<'a> {
    ctx: &'a Rc<InferCtx>,
    tree: &'a SyntaxTree,
    cfg: &'a ControlFlow,
    attachments: HashMap<SegmentId, Vec<(Side, TypeInfo)>>,
}

impl Analyzer<'_> {
    /// Finds the recognized guard shape `expr` participates in, if any,
    /// and attaches its type to the shape's branch segments.
    fn collect_guards(&mut self, expr: NodeId) {
        let Some(parent) = self.tree.parent(expr) else {
            return;
        };
        match self.tree.kind(parent) {
            NodeKind::Unary {
                op: UnaryOp::Typeof,
                ..
            } => {
                let Some(grandparent) = self.tree.parent(parent) else {
                    return;
                };
                match self.tree.kind(grandparent) {
                    NodeKind::Binary { op, left, right } if op.is_equality() => {
                        let other = if *left == parent { *right } else { *left };
                        let Some(ty) = self.typeof_name_type(other) else {
                            return;
                        };
                        self.attach_from(grandparent, ty, op.is_negated_equality());
                    }
                    NodeKind::Switch {
                        discriminant,
                        cases,
                    } if *discriminant == parent => {
                        self.attach_switch_cases(&cases.clone(), true);
                    }
                    _ => {}
                }
            }

            NodeKind::Binary { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                if op == BinaryOp::Instanceof && left == expr {
                    let Some(TypeInfo::Factory(global)) = self.ctx.type_of(right) else {
                        return;
                    };
                    let Some(ty) = builtins::instance_type(global) else {
                        return;
                    };
                    self.attach_from(parent, ty, false);
                } else if op.is_equality() {
                    let other = if left == expr { right } else { left };
                    let Some(ty) = self.literal_guard_type(other, op) else {
                        return;
                    };
                    self.attach_from(parent, ty, op.is_negated_equality());
                }
            }

            NodeKind::Call { callee, args, .. } => {
                if args.first() == Some(&Argument::Plain(expr))
                    && self.is_global_member(*callee, "Array", "isArray")
                {
                    self.attach_from(parent, TypeInfo::array_unknown(), false);
                }
            }

            NodeKind::Switch {
                discriminant,
                cases,
            } if *discriminant == expr => {
                self.attach_switch_cases(&cases.clone(), false);
            }

            _ => {}
        }
    }

    /// The instance type named by a `typeof` comparison operand.
    fn typeof_name_type(&self, operand: NodeId) -> Option<TypeInfo> {
        let NodeKind::StringLit { value } = self.tree.kind(operand) else {
            return None;
        };
        match value.as_str() {
            "string" => Some(TypeInfo::string()),
            "number" => Some(TypeInfo::number()),
            "boolean" => Some(TypeInfo::boolean()),
            "bigint" => Some(TypeInfo::bigint()),
            "function" => Some(TypeInfo::function_unknown()),
            "undefined" => Some(TypeInfo::Undefined),
            // "object" covers null, arrays, and everything else
            _ => None,
        }
    }

    /// The type pinned by comparison against a literal. Loose equality
    /// against null matches undefined as well.
    fn literal_guard_type(&self, operand: NodeId, op: BinaryOp) -> Option<TypeInfo> {
        let loose = matches!(op, BinaryOp::Eq | BinaryOp::NotEq);
        match self.tree.kind(operand) {
            NodeKind::StringLit { .. } | NodeKind::TemplateLit { .. } => Some(TypeInfo::string()),
            NodeKind::NumberLit { .. } => Some(TypeInfo::number()),
            NodeKind::BoolLit { .. } => Some(TypeInfo::boolean()),
            NodeKind::BigIntLit { .. } => Some(TypeInfo::bigint()),
            NodeKind::NullLit => {
                if loose {
                    TypeInfo::union_of(vec![TypeInfo::Null, TypeInfo::Undefined])
                } else {
                    Some(TypeInfo::Null)
                }
            }
            NodeKind::Ident { name }
                if name == "undefined" && self.ctx.scopes.resolve(operand).is_none() =>
            {
                if loose {
                    TypeInfo::union_of(vec![TypeInfo::Null, TypeInfo::Undefined])
                } else {
                    Some(TypeInfo::Undefined)
                }
            }
            _ => None,
        }
    }

    fn is_global_member(&self, callee: NodeId, object_name: &str, member: &str) -> bool {
        let NodeKind::Member {
            object,
            property: PropertyKey::Static(prop),
            ..
        } = self.tree.kind(callee)
        else {
            return false;
        };
        if prop != member {
            return false;
        }
        matches!(self.tree.kind(*object), NodeKind::Ident { name } if name == object_name)
            && self.ctx.scopes.resolve(*object).is_none()
    }

    fn attach_switch_cases(&mut self, cases: &[NodeId], is_typeof: bool) {
        for &case in cases {
            let NodeKind::SwitchCase {
                test: Some(test), ..
            } = self.tree.kind(case)
            else {
                continue;
            };
            let ty = if is_typeof {
                self.typeof_name_type(*test)
            } else {
                self.literal_guard_type(*test, BinaryOp::StrictEq)
            };
            let Some(ty) = ty else {
                continue;
            };
            let Some(targets) = self.cfg.branch_targets(case) else {
                continue;
            };
            let segments: Vec<SegmentId> = targets.consequent.to_vec();
            self.attach(&segments, Side::Consequent, &ty);
        }
    }

    /// Walks outward from a recognized guard shape through the wrapper
    /// algebra, attaching the guard's type to every branch construct whose
    /// control transfer it pins.
    fn attach_from(&mut self, shape: NodeId, ty: TypeInfo, negated: bool) {
        let mut pol = Polarity::new(negated);
        let mut child = shape;
        loop {
            let Some(parent) = self.tree.parent(child) else {
                return;
            };
            match self.tree.kind(parent) {
                NodeKind::Unary {
                    op: UnaryOp::Not, ..
                } => {
                    pol.negate();
                    child = parent;
                }

                // Boolean(guard) is a transparent wrapper
                NodeKind::Call { callee, args, .. }
                    if args.len() == 1
                        && args[0] == Argument::Plain(child)
                        && matches!(
                            self.tree.kind(*callee),
                            NodeKind::Ident { name } if name == "Boolean"
                        )
                        && self.ctx.scopes.resolve(*callee).is_none() =>
                {
                    child = parent;
                }

                NodeKind::Logical {
                    op: LogicalOp::And,
                    left,
                    ..
                } => {
                    if *left == child && !pol.not && !pol.cons_unknown {
                        // the right operand runs only when the guard held
                        if let Some(targets) = self.cfg.branch_targets(parent) {
                            let segments: Vec<SegmentId> = targets.consequent.to_vec();
                            self.attach(&segments, Side::Consequent, &ty);
                        }
                    }
                    // whole-expression false no longer pins the guard
                    pol.alt_unknown = true;
                    child = parent;
                }

                NodeKind::Logical {
                    op: LogicalOp::Or,
                    left,
                    ..
                } => {
                    if *left == child && pol.not && !pol.alt_unknown {
                        // the right operand runs only when the guard failed,
                        // which under negation is the informative side
                        if let Some(targets) = self.cfg.branch_targets(parent) {
                            let segments: Vec<SegmentId> = targets.alternate.to_vec();
                            self.attach(&segments, Side::Alternate, &ty);
                        }
                    }
                    pol.cons_unknown = true;
                    child = parent;
                }

                // ?? is not a boolean combinator; bail rather than guess
                NodeKind::Logical {
                    op: LogicalOp::Nullish,
                    ..
                } => return,

                NodeKind::If { test, .. }
                | NodeKind::Conditional { test, .. }
                | NodeKind::While { test, .. }
                    if *test == child =>
                {
                    let Some(targets) = self.cfg.branch_targets(parent) else {
                        return;
                    };
                    let consequent: Vec<SegmentId> = targets.consequent.to_vec();
                    let alternate: Vec<SegmentId> = targets.alternate.to_vec();
                    if !pol.not && !pol.cons_unknown {
                        self.attach(&consequent, Side::Consequent, &ty);
                    }
                    if pol.not && !pol.alt_unknown {
                        self.attach(&alternate, Side::Alternate, &ty);
                    }
                    return;
                }

                _ => return,
            }
        }
    }

    fn attach(&mut self, segments: &[SegmentId], side: Side, ty: &TypeInfo) {
        for &segment in segments {
            self.attachments
                .entry(segment)
                .or_default()
                .push((side, ty.clone()));
        }
    }

    /// Collects guard types over the occurrence's segment and its
    /// transitive predecessors. A segment with direct attachments answers
    /// for itself; otherwise sibling predecessors must agree per side.
    fn gather(&self, segment: SegmentId, visited: &mut HashSet<SegmentId>) -> (Gather, Gather) {
        if !visited.insert(segment) {
            return (Gather::Cycle, Gather::Cycle);
        }
        if let Some(attached) = self.attachments.get(&segment) {
            return (
                Self::combine_direct(attached, Side::Consequent),
                Self::combine_direct(attached, Side::Alternate),
            );
        }
        let mut preds: Vec<SegmentId> = self.cfg.predecessors(segment).collect();
        preds.sort_unstable();
        preds.dedup();
        if preds.is_empty() {
            return (Gather::NotSeen, Gather::NotSeen);
        }
        let results: Vec<(Gather, Gather)> = preds
            .into_iter()
            .map(|pred| self.gather(pred, visited))
            .collect();
        (
            Self::merge(results.iter().map(|r| &r.0)),
            Self::merge(results.iter().map(|r| &r.1)),
        )
    }

    fn combine_direct(attached: &[(Side, TypeInfo)], side: Side) -> Gather {
        let mut acc = Gather::NotSeen;
        for (entry_side, ty) in attached {
            if *entry_side != side {
                continue;
            }
            acc = match acc {
                Gather::NotSeen => Gather::Agreed(ty.clone()),
                Gather::Agreed(existing) if existing.equals(ty) => Gather::Agreed(existing),
                _ => return Gather::Conflict,
            };
        }
        acc
    }

    /// Sibling paths on one side must all agree; a path without the guard
    /// or with a different type drops the side.
    fn merge<'g>(results: impl Iterator<Item = &'g Gather>) -> Gather {
        let mut acc = Gather::Cycle;
        for gather in results {
            acc = match (acc, gather) {
                (Gather::Cycle, g) => g.clone(),
                (acc, Gather::Cycle) => acc,
                (Gather::Conflict, _) | (_, Gather::Conflict) => Gather::Conflict,
                (Gather::NotSeen, Gather::NotSeen) => Gather::NotSeen,
                (Gather::NotSeen, Gather::Agreed(_)) | (Gather::Agreed(_), Gather::NotSeen) => {
                    Gather::Conflict
                }
                (Gather::Agreed(a), Gather::Agreed(b)) => {
                    if a.equals(b) {
                        Gather::Agreed(a)
                    } else {
                        Gather::Conflict
                    }
                }
            };
        }
        acc
    }
}
