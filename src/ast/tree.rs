//! Arena storage and the fluent tree builder.

use serde::{Deserialize, Serialize};

use super::node::{
    Argument, ArrayElement, DeclKind, NodeId, NodeKind, ObjectProperty, PropertyKey,
};
use super::node::{BinaryOp, LogicalOp, UnaryOp};
use super::walk;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// An immutable program tree. Nodes live in one arena and refer to each
/// other by [`NodeId`]; parent links are derived once at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Walks from `id` towards the root, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&cur| self.parent(cur))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }
}

/// Builds a [`SyntaxTree`] bottom-up. Every method appends one node and
/// returns its id; [`TreeBuilder::program`] closes the tree.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, parent: None });
        id
    }

    // Literals

    pub fn string(&mut self, value: impl Into<String>) -> NodeId {
        self.push(NodeKind::StringLit {
            value: value.into(),
        })
    }

    pub fn number(&mut self, value: f64) -> NodeId {
        self.push(NodeKind::NumberLit { value })
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.push(NodeKind::BoolLit { value })
    }

    pub fn bigint(&mut self, digits: impl Into<String>) -> NodeId {
        self.push(NodeKind::BigIntLit {
            digits: digits.into(),
        })
    }

    pub fn regex(&mut self, pattern: impl Into<String>, flags: impl Into<String>) -> NodeId {
        self.push(NodeKind::RegexLit {
            pattern: pattern.into(),
            flags: flags.into(),
        })
    }

    pub fn null(&mut self) -> NodeId {
        self.push(NodeKind::NullLit)
    }

    pub fn template(&mut self, quasis: &[&str], exprs: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::TemplateLit {
            quasis: quasis.iter().map(|q| q.to_string()).collect(),
            exprs,
        })
    }

    pub fn ident(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Ident { name: name.into() })
    }

    // Expressions

    pub fn array(&mut self, elements: Vec<ArrayElement>) -> NodeId {
        self.push(NodeKind::ArrayLit { elements })
    }

    pub fn array_of(&mut self, items: Vec<NodeId>) -> NodeId {
        self.array(items.into_iter().map(ArrayElement::Item).collect())
    }

    pub fn object(&mut self, properties: Vec<ObjectProperty>) -> NodeId {
        self.push(NodeKind::ObjectLit { properties })
    }

    /// Plain `{ name: value, ... }` object with static keys.
    pub fn object_of(&mut self, props: Vec<(&str, NodeId)>) -> NodeId {
        let properties = props
            .into_iter()
            .map(|(name, value)| ObjectProperty::Init {
                key: PropertyKey::Static(name.to_string()),
                value,
            })
            .collect();
        self.object(properties)
    }

    pub fn prop(name: &str, value: NodeId) -> ObjectProperty {
        ObjectProperty::Init {
            key: PropertyKey::Static(name.to_string()),
            value,
        }
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.push(NodeKind::Unary { op, operand })
    }

    pub fn typeof_(&mut self, operand: NodeId) -> NodeId {
        self.unary(UnaryOp::Typeof, operand)
    }

    pub fn not(&mut self, operand: NodeId) -> NodeId {
        self.unary(UnaryOp::Not, operand)
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.push(NodeKind::Binary { op, left, right })
    }

    pub fn logical(&mut self, op: LogicalOp, left: NodeId, right: NodeId) -> NodeId {
        self.push(NodeKind::Logical { op, left, right })
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.push(NodeKind::Assignment { target, value })
    }

    pub fn conditional(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        self.push(NodeKind::Conditional {
            test,
            consequent,
            alternate,
        })
    }

    pub fn member(&mut self, object: NodeId, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Member {
            object,
            property: PropertyKey::Static(name.into()),
            optional: false,
        })
    }

    pub fn member_opt(&mut self, object: NodeId, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Member {
            object,
            property: PropertyKey::Static(name.into()),
            optional: true,
        })
    }

    pub fn index(&mut self, object: NodeId, key: NodeId) -> NodeId {
        self.push(NodeKind::Member {
            object,
            property: PropertyKey::Computed(key),
            optional: false,
        })
    }

    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::Call {
            callee,
            args: args.into_iter().map(Argument::Plain).collect(),
            optional: false,
        })
    }

    pub fn new_expr(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::New {
            callee,
            args: args.into_iter().map(Argument::Plain).collect(),
        })
    }

    pub fn param(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Param { name: name.into() })
    }

    pub fn arrow(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.push(NodeKind::ArrowFunction { params, body })
    }

    pub fn function_expr(
        &mut self,
        name: Option<&str>,
        params: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.push(NodeKind::FunctionExpr {
            name: name.map(str::to_string),
            params,
            body,
        })
    }

    pub fn class_expr(&mut self, name: Option<&str>) -> NodeId {
        self.push(NodeKind::ClassExpr {
            name: name.map(str::to_string),
        })
    }

    // Statements

    pub fn declarator(&mut self, name: impl Into<String>, init: Option<NodeId>) -> NodeId {
        let name = self.ident(name);
        self.push(NodeKind::Declarator { name, init })
    }

    pub fn var_decl(&mut self, kind: DeclKind, declarators: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::VarDecl { kind, declarators })
    }

    /// `const name = init;`
    pub fn const_decl(&mut self, name: impl Into<String>, init: NodeId) -> NodeId {
        let d = self.declarator(name, Some(init));
        self.var_decl(DeclKind::Const, vec![d])
    }

    /// `let name = init;`
    pub fn let_decl(&mut self, name: impl Into<String>, init: NodeId) -> NodeId {
        let d = self.declarator(name, Some(init));
        self.var_decl(DeclKind::Let, vec![d])
    }

    pub fn function_decl(
        &mut self,
        name: impl Into<String>,
        params: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.push(NodeKind::FunctionDecl {
            name: name.into(),
            params,
            body,
        })
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.push(NodeKind::ExprStmt { expr })
    }

    pub fn block(&mut self, body: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::Block { body })
    }

    pub fn if_stmt(&mut self, test: NodeId, consequent: NodeId) -> NodeId {
        self.push(NodeKind::If {
            test,
            consequent,
            alternate: None,
        })
    }

    pub fn if_else(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        self.push(NodeKind::If {
            test,
            consequent,
            alternate: Some(alternate),
        })
    }

    pub fn switch(&mut self, discriminant: NodeId, cases: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::Switch {
            discriminant,
            cases,
        })
    }

    pub fn case(&mut self, test: NodeId, body: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::SwitchCase {
            test: Some(test),
            body,
        })
    }

    pub fn default_case(&mut self, body: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::SwitchCase { test: None, body })
    }

    pub fn return_stmt(&mut self, argument: Option<NodeId>) -> NodeId {
        self.push(NodeKind::Return { argument })
    }

    pub fn throw_stmt(&mut self, argument: NodeId) -> NodeId {
        self.push(NodeKind::Throw { argument })
    }

    pub fn while_stmt(&mut self, test: NodeId, body: NodeId) -> NodeId {
        self.push(NodeKind::While { test, body })
    }

    /// `for (const name of right) body`
    pub fn for_of(&mut self, name: impl Into<String>, right: NodeId, body: NodeId) -> NodeId {
        let d = self.declarator(name, None);
        let left = self.var_decl(DeclKind::Const, vec![d]);
        self.push(NodeKind::ForOf { left, right, body })
    }

    /// `for (const name in right) body`
    pub fn for_in(&mut self, name: impl Into<String>, right: NodeId, body: NodeId) -> NodeId {
        let d = self.declarator(name, None);
        let left = self.var_decl(DeclKind::Const, vec![d]);
        self.push(NodeKind::ForIn { left, right, body })
    }

    /// Closes the tree: appends the program node, computes parent links, and
    /// returns the finished arena.
    pub fn program(mut self, body: Vec<NodeId>) -> SyntaxTree {
        let root = self.push(NodeKind::Program { body });
        let mut parents: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            for child in walk::children(&node.kind) {
                parents[child.index()] = Some(NodeId(index as u32));
            }
        }
        for (node, parent) in self.nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_links() {
        let mut b = TreeBuilder::new();
        let lit = b.string("x");
        let decl = b.const_decl("a", lit);
        let tree = b.program(vec![decl]);

        assert_eq!(tree.parent(decl), Some(tree.root()));
        // string literal's parent is the declarator
        let declarator = tree.parent(lit).unwrap();
        assert!(matches!(
            tree.kind(declarator),
            NodeKind::Declarator { .. }
        ));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_ancestors_reach_root() {
        let mut b = TreeBuilder::new();
        let inner = b.number(1.0);
        let neg = b.unary(UnaryOp::Minus, inner);
        let stmt = b.expr_stmt(neg);
        let tree = b.program(vec![stmt]);

        let chain: Vec<_> = tree.ancestors(inner).collect();
        assert_eq!(chain, vec![neg, stmt, tree.root()]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut b = TreeBuilder::new();
        let lit = b.number(42.0);
        let stmt = b.expr_stmt(lit);
        let tree = b.program(vec![stmt]);

        let json = serde_json::to_string(&tree).unwrap();
        let back: SyntaxTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), tree.len());
        assert_eq!(back.root(), tree.root());
    }
}
