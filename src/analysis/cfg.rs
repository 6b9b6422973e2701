//! Control-flow graph construction
//!
//! One explicit segment/edge structure per tree, built before guard
//! analysis runs. A segment is a maximal straight-line run between branch
//! points. The builder records which segment every node lexically falls in
//! and, per branching construct, the branch segments entered immediately
//! after its test: if/ternary consequent and alternate, switch-case bodies,
//! and logical right-hand sides.
//!
//! Function bodies form disconnected regions with their own entry segments,
//! so narrowing never leaks across a function boundary. `break`/`continue`
//! terminate their segment without an edge, which loses some joins but only
//! in the conservative direction.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use smallvec::SmallVec;

use crate::ast::node::{Argument, ArrayElement, ObjectProperty, PropertyKey};
use crate::ast::{LogicalOp, NodeId, NodeKind, SyntaxTree};

pub type SegmentId = NodeIndex<u32>;

/// Branch segments entered when a construct's test is true/false.
#[derive(Debug, Clone, Default)]
pub struct BranchTargets {
    pub consequent: SmallVec<[SegmentId; 2]>,
    pub alternate: SmallVec<[SegmentId; 2]>,
}

/// The control-flow graph of one tree.
#[derive(Debug, Default)]
pub struct ControlFlow {
    graph: DiGraph<(), (), u32>,
    node_segment: HashMap<NodeId, SegmentId>,
    branches: HashMap<NodeId, BranchTargets>,
}

impl ControlFlow {
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut builder = Builder {
            tree,
            cfg: ControlFlow::default(),
            current: NodeIndex::new(0),
        };
        builder.current = builder.cfg.graph.add_node(());
        let root = tree.root();
        builder.cfg.node_segment.insert(root, builder.current);
        if let NodeKind::Program { body } = tree.kind(root) {
            builder.visit_stmts(body);
        }
        builder.cfg
    }

    /// The segment a node lexically falls in.
    pub fn segment_of(&self, node: NodeId) -> Option<SegmentId> {
        self.node_segment.get(&node).copied()
    }

    /// Branch targets of an `If`/`Conditional`/`Logical`/`While`/
    /// `SwitchCase` construct.
    pub fn branch_targets(&self, construct: NodeId) -> Option<&BranchTargets> {
        self.branches.get(&construct)
    }

    pub fn predecessors(&self, segment: SegmentId) -> impl Iterator<Item = SegmentId> + '_ {
        self.graph.neighbors_directed(segment, Direction::Incoming)
    }

    pub fn segment_count(&self) -> usize {
        self.graph.node_count()
    }
}

struct Builder<'t> {
    tree: &'t SyntaxTree,
    cfg: ControlFlow,
    current: SegmentId,
}

impl<'t> Builder<'t> {
    fn segment(&mut self) -> SegmentId {
        self.cfg.graph.add_node(())
    }

    fn segment_after(&mut self, pred: SegmentId) -> SegmentId {
        let seg = self.segment();
        self.cfg.graph.add_edge(pred, seg, ());
        seg
    }

    fn edge(&mut self, from: SegmentId, to: SegmentId) {
        self.cfg.graph.add_edge(from, to, ());
    }

    fn record(&mut self, node: NodeId) {
        self.cfg.node_segment.insert(node, self.current);
    }

    /// Visits a statement list; returns whether the end is reachable.
    fn visit_stmts(&mut self, body: &[NodeId]) -> bool {
        let mut reachable = true;
        for &stmt in body {
            if !reachable {
                // unreachable code still gets segments of its own
                self.current = self.segment();
            }
            let falls_through = self.visit_stmt(stmt);
            reachable = reachable && falls_through;
        }
        reachable
    }

    fn visit_stmt(&mut self, stmt: NodeId) -> bool {
        self.record(stmt);
        match self.tree.kind(stmt) {
            NodeKind::Block { body } => self.visit_stmts(body),

            NodeKind::ExprStmt { expr } => {
                self.visit_expr(*expr);
                true
            }

            NodeKind::VarDecl { declarators, .. } => {
                for &declarator in declarators {
                    self.record(declarator);
                    if let NodeKind::Declarator { name, init } = self.tree.kind(declarator) {
                        self.record(*name);
                        if let Some(init) = init {
                            self.visit_expr(*init);
                        }
                    }
                }
                true
            }

            NodeKind::FunctionDecl { params, body, .. } => {
                self.visit_function(params, *body);
                true
            }
            NodeKind::ClassDecl { .. } => true,

            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let (test, consequent, alternate) = (*test, *consequent, *alternate);
                self.visit_expr(test);
                let test_end = self.current;

                let cons_entry = self.segment_after(test_end);
                self.current = cons_entry;
                let cons_falls = self.visit_stmt(consequent);
                let cons_exit = self.current;

                let mut targets = BranchTargets::default();
                targets.consequent.push(cons_entry);

                let falls_through;
                match alternate {
                    Some(alternate) => {
                        let alt_entry = self.segment_after(test_end);
                        self.current = alt_entry;
                        let alt_falls = self.visit_stmt(alternate);
                        let alt_exit = self.current;
                        targets.alternate.push(alt_entry);

                        let join = self.segment();
                        if cons_falls {
                            self.edge(cons_exit, join);
                        }
                        if alt_falls {
                            self.edge(alt_exit, join);
                        }
                        self.current = join;
                        falls_through = cons_falls || alt_falls;
                    }
                    None => {
                        let join = self.segment_after(test_end);
                        if cons_falls {
                            self.edge(cons_exit, join);
                        } else {
                            // early-exit consequent: the rest of the block
                            // is the implicit else
                            targets.alternate.push(join);
                        }
                        self.current = join;
                        falls_through = true;
                    }
                }
                self.cfg.branches.insert(stmt, targets);
                falls_through
            }

            NodeKind::While { test, body } => {
                let (test, body) = (*test, *body);
                let head = self.segment_after(self.current);
                self.current = head;
                self.visit_expr(test);
                let test_end = self.current;

                let body_entry = self.segment_after(test_end);
                self.current = body_entry;
                if self.visit_stmt(body) {
                    let body_exit = self.current;
                    self.edge(body_exit, head);
                }

                let exit = self.segment_after(test_end);
                self.current = exit;
                self.cfg.branches.insert(
                    stmt,
                    BranchTargets {
                        consequent: SmallVec::from_slice(&[body_entry]),
                        alternate: SmallVec::from_slice(&[exit]),
                    },
                );
                true
            }

            NodeKind::ForOf { left, right, body } | NodeKind::ForIn { left, right, body } => {
                let (left, right, body) = (*left, *right, *body);
                self.visit_expr(right);
                let head = self.segment_after(self.current);

                let body_entry = self.segment_after(head);
                self.current = body_entry;
                self.record_pattern(left);
                if self.visit_stmt(body) {
                    let body_exit = self.current;
                    self.edge(body_exit, head);
                }

                let exit = self.segment_after(head);
                self.current = exit;
                true
            }

            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                let discriminant = *discriminant;
                let cases = cases.clone();
                self.visit_expr(discriminant);
                let test_end = self.current;

                let exit = self.segment();
                let mut previous_exit: Option<SegmentId> = None;
                let mut has_default = false;
                for &case in &cases {
                    let entry = self.segment_after(test_end);
                    if let Some(prev) = previous_exit {
                        // lexical fall-through from the previous case body
                        self.edge(prev, entry);
                    }
                    self.current = entry;
                    self.record(case);
                    let NodeKind::SwitchCase { test, body } = self.tree.kind(case).clone() else {
                        continue;
                    };
                    match test {
                        Some(test) => self.visit_expr(test),
                        None => has_default = true,
                    }
                    let falls = self.visit_stmts(&body);
                    previous_exit = falls.then_some(self.current);
                    self.cfg.branches.insert(
                        case,
                        BranchTargets {
                            consequent: SmallVec::from_slice(&[entry]),
                            alternate: SmallVec::new(),
                        },
                    );
                }
                if let Some(prev) = previous_exit {
                    self.edge(prev, exit);
                }
                if !has_default {
                    self.edge(test_end, exit);
                }
                self.current = exit;
                true
            }

            NodeKind::Return { argument } => {
                if let Some(argument) = *argument {
                    self.visit_expr(argument);
                }
                self.current = self.segment();
                false
            }
            NodeKind::Throw { argument } => {
                self.visit_expr(*argument);
                self.current = self.segment();
                false
            }
            NodeKind::Break | NodeKind::Continue => {
                self.current = self.segment();
                false
            }

            NodeKind::Empty => true,

            // expression in statement position
            _ => {
                self.visit_expr(stmt);
                true
            }
        }
    }

    fn visit_expr(&mut self, expr: NodeId) {
        self.record(expr);
        match self.tree.kind(expr).clone() {
            NodeKind::Logical { op, left, right } => {
                self.visit_expr(left);
                let left_end = self.current;

                let rhs_entry = self.segment_after(left_end);
                self.current = rhs_entry;
                self.visit_expr(right);
                let rhs_exit = self.current;

                let join = self.segment_after(left_end);
                self.edge(rhs_exit, join);
                self.current = join;

                let targets = match op {
                    LogicalOp::And => BranchTargets {
                        consequent: SmallVec::from_slice(&[rhs_entry]),
                        alternate: SmallVec::new(),
                    },
                    LogicalOp::Or => BranchTargets {
                        consequent: SmallVec::new(),
                        alternate: SmallVec::from_slice(&[rhs_entry]),
                    },
                    LogicalOp::Nullish => BranchTargets::default(),
                };
                self.cfg.branches.insert(expr, targets);
            }

            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test);
                let test_end = self.current;

                let cons_entry = self.segment_after(test_end);
                self.current = cons_entry;
                self.visit_expr(consequent);
                let cons_exit = self.current;

                let alt_entry = self.segment_after(test_end);
                self.current = alt_entry;
                self.visit_expr(alternate);
                let alt_exit = self.current;

                let join = self.segment();
                self.edge(cons_exit, join);
                self.edge(alt_exit, join);
                self.current = join;

                self.cfg.branches.insert(
                    expr,
                    BranchTargets {
                        consequent: SmallVec::from_slice(&[cons_entry]),
                        alternate: SmallVec::from_slice(&[alt_entry]),
                    },
                );
            }

            NodeKind::FunctionExpr { params, body, .. } | NodeKind::ArrowFunction { params, body } => {
                self.visit_function(&params, body);
            }

            NodeKind::Member {
                object, property, ..
            } => {
                self.visit_expr(object);
                if let PropertyKey::Computed(key) = property {
                    self.visit_expr(key);
                }
            }

            NodeKind::Call { callee, args, .. } | NodeKind::New { callee, args } => {
                self.visit_expr(callee);
                for arg in args {
                    match arg {
                        Argument::Plain(id) | Argument::Spread(id) => self.visit_expr(id),
                    }
                }
            }

            NodeKind::ArrayLit { elements } => {
                for element in elements {
                    match element {
                        ArrayElement::Item(id) | ArrayElement::Spread(id) => self.visit_expr(id),
                        ArrayElement::Hole => {}
                    }
                }
            }

            NodeKind::ObjectLit { properties } => {
                for property in properties {
                    match property {
                        ObjectProperty::Init { key, value } => {
                            if let PropertyKey::Computed(key) = key {
                                self.visit_expr(key);
                            }
                            self.visit_expr(value);
                        }
                        ObjectProperty::Spread(id) => self.visit_expr(id),
                    }
                }
            }

            kind => {
                for child in crate::ast::walk::children(&kind) {
                    self.visit_expr(child);
                }
            }
        }
    }

    /// A nested function body is a disconnected region with its own entry.
    fn visit_function(&mut self, params: &[NodeId], body: NodeId) {
        let outer = self.current;
        let entry = self.segment();
        self.current = entry;
        for &param in params {
            self.record(param);
        }
        self.visit_stmt(body);
        self.current = outer;
    }

    /// Record `for..of`/`for..in` binding nodes into the loop body segment.
    fn record_pattern(&mut self, left: NodeId) {
        self.record(left);
        match self.tree.kind(left) {
            NodeKind::VarDecl { declarators, .. } => {
                for &declarator in declarators.clone().iter() {
                    self.record(declarator);
                    if let NodeKind::Declarator { name, .. } = self.tree.kind(declarator) {
                        self.record(*name);
                    }
                }
            }
            NodeKind::Ident { .. } => {}
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, TreeBuilder, UnaryOp};

    #[test]
    fn test_if_branch_targets() {
        // if (x) { y } z
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let y = b.ident("y");
        let y_stmt = b.expr_stmt(y);
        let cons = b.block(vec![y_stmt]);
        let if_stmt = b.if_stmt(x, cons);
        let z = b.ident("z");
        let z_stmt = b.expr_stmt(z);
        let tree = b.program(vec![if_stmt, z_stmt]);

        let cfg = ControlFlow::build(&tree);
        let targets = cfg.branch_targets(if_stmt).unwrap();
        assert_eq!(targets.consequent.len(), 1);
        // consequent falls through, so no implicit else
        assert!(targets.alternate.is_empty());
        assert_eq!(cfg.segment_of(y), Some(targets.consequent[0]));

        // join has two predecessors: the test segment and the consequent
        let join = cfg.segment_of(z).unwrap();
        assert_eq!(cfg.predecessors(join).count(), 2);
    }

    #[test]
    fn test_early_return_marks_implicit_else() {
        // if (x) return; z
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let ret = b.return_stmt(None);
        let if_stmt = b.if_stmt(x, ret);
        let z = b.ident("z");
        let z_stmt = b.expr_stmt(z);
        let tree = b.program(vec![if_stmt, z_stmt]);

        let cfg = ControlFlow::build(&tree);
        let targets = cfg.branch_targets(if_stmt).unwrap();
        assert_eq!(targets.alternate.len(), 1);
        assert_eq!(cfg.segment_of(z), Some(targets.alternate[0]));
        // the rest of the block is reached only from the test segment
        let join = cfg.segment_of(z).unwrap();
        assert_eq!(cfg.predecessors(join).count(), 1);
    }

    #[test]
    fn test_logical_rhs_is_branch() {
        // a && b
        let mut b = TreeBuilder::new();
        let a = b.ident("a");
        let rhs = b.ident("b");
        let and = b.logical(crate::ast::LogicalOp::And, a, rhs);
        let stmt = b.expr_stmt(and);
        let tree = b.program(vec![stmt]);

        let cfg = ControlFlow::build(&tree);
        let targets = cfg.branch_targets(and).unwrap();
        assert_eq!(targets.consequent.len(), 1);
        assert_eq!(cfg.segment_of(rhs), Some(targets.consequent[0]));
        assert_ne!(cfg.segment_of(a), cfg.segment_of(rhs));
    }

    #[test]
    fn test_while_back_edge_terminates_walk() {
        // while (x) { y }
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let y = b.ident("y");
        let y_stmt = b.expr_stmt(y);
        let body = b.block(vec![y_stmt]);
        let while_stmt = b.while_stmt(x, body);
        let tree = b.program(vec![while_stmt]);

        let cfg = ControlFlow::build(&tree);
        let head = cfg.segment_of(x).unwrap();
        // head preds: program entry and the loop body's back edge
        assert_eq!(cfg.predecessors(head).count(), 2);
        let targets = cfg.branch_targets(while_stmt).unwrap();
        assert_eq!(cfg.segment_of(y), Some(targets.consequent[0]));
    }

    #[test]
    fn test_function_body_disconnected() {
        let mut b = TreeBuilder::new();
        let param = b.param("p");
        let p = b.ident("p");
        let stmt = b.expr_stmt(p);
        let body = b.block(vec![stmt]);
        let func = b.function_decl("f", vec![param], body);
        let tree = b.program(vec![func]);

        let cfg = ControlFlow::build(&tree);
        let inner = cfg.segment_of(p).unwrap();
        assert_eq!(cfg.predecessors(inner).count(), 0);
        assert_ne!(Some(inner), cfg.segment_of(func));
    }

    #[test]
    fn test_switch_case_entries() {
        // switch (x) { case 'a': y; }
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let lit = b.string("a");
        let y = b.ident("y");
        let y_stmt = b.expr_stmt(y);
        let case = b.case(lit, vec![y_stmt]);
        let switch = b.switch(x, vec![case]);
        let tree = b.program(vec![switch]);

        let cfg = ControlFlow::build(&tree);
        let targets = cfg.branch_targets(case).unwrap();
        assert_eq!(cfg.segment_of(y), Some(targets.consequent[0]));
    }

    #[test]
    fn test_typeof_guard_segments_distinct() {
        // if (typeof a === 'string') { hit } rest
        let mut b = TreeBuilder::new();
        let a = b.ident("a");
        let ty = b.unary(UnaryOp::Typeof, a);
        let lit = b.string("string");
        let test = b.binary(BinaryOp::StrictEq, ty, lit);
        let hit = b.ident("a");
        let hit_stmt = b.expr_stmt(hit);
        let cons = b.block(vec![hit_stmt]);
        let if_stmt = b.if_stmt(test, cons);
        let tree = b.program(vec![if_stmt]);

        let cfg = ControlFlow::build(&tree);
        assert_ne!(cfg.segment_of(test), cfg.segment_of(hit));
    }
}
