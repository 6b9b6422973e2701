//! Scope and binding resolution
//!
//! Reference implementation of the binding collaborator contract: maps every
//! identifier occurrence to its declaration and records all read/write
//! references per binding. Hoisting follows the usual rules (`var` and
//! function declarations rise to the enclosing function scope, lexical
//! declarations stay in their block); temporal-dead-zone ordering is
//! deliberately ignored, which is the right trade-off for a lint-time
//! heuristic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::{DeclKind, NodeId, NodeKind, SyntaxTree};
use crate::ast::node::{Argument, ArrayElement, ObjectProperty, PropertyKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Param,
    ForOf,
    ForIn,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Declarator, Param, FunctionDecl, or ClassDecl node.
    pub decl: NodeId,
    /// Initializer expression; for `for..of`/`for..in` bindings, the
    /// iterated collection.
    pub init: Option<NodeId>,
    /// Identifier occurrences that read the binding.
    pub reads: Vec<NodeId>,
    /// Reassignment/update occurrences. The declaration itself is not a
    /// write.
    pub writes: Vec<NodeId>,
}

impl Binding {
    /// Exactly one immutable definition with a known initializer: `const`,
    /// or a never-reassigned `let`/`var`.
    pub fn is_effectively_const(&self) -> bool {
        match self.kind {
            BindingKind::Const => true,
            BindingKind::Let | BindingKind::Var => self.writes.is_empty(),
            _ => false,
        }
    }
}

/// Binding-resolution results for one tree.
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    bindings: Vec<Binding>,
    resolved: HashMap<NodeId, BindingId>,
}

impl ScopeIndex {
    pub fn analyze(tree: &SyntaxTree) -> Self {
        let mut analyzer = Analyzer {
            tree,
            scopes: Vec::new(),
            index: ScopeIndex::default(),
        };
        analyzer.run();
        analyzer.index
    }

    pub fn resolve(&self, ident: NodeId) -> Option<BindingId> {
        self.resolved.get(&ident).copied()
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0 as usize]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(index, binding)| (BindingId(index as u32), binding))
    }
}

struct Scope {
    names: HashMap<String, BindingId>,
}

struct Analyzer<'t> {
    tree: &'t SyntaxTree,
    scopes: Vec<Scope>,
    index: ScopeIndex,
}

impl<'t> Analyzer<'t> {
    fn run(&mut self) {
        let root = self.tree.root();
        let NodeKind::Program { body } = self.tree.kind(root) else {
            return;
        };
        self.scopes.push(Scope {
            names: HashMap::new(),
        });
        for &stmt in body {
            self.declare_lexical(stmt);
            self.hoist_vars(stmt);
        }
        for &stmt in body {
            self.visit(stmt);
        }
        self.scopes.pop();
    }

    fn declare(
        &mut self,
        name: &str,
        kind: BindingKind,
        decl: NodeId,
        init: Option<NodeId>,
        name_node: Option<NodeId>,
    ) -> BindingId {
        let id = BindingId(self.index.bindings.len() as u32);
        self.index.bindings.push(Binding {
            name: name.to_string(),
            kind,
            decl,
            init,
            reads: Vec::new(),
            writes: Vec::new(),
        });
        if let Some(node) = name_node {
            self.index.resolved.insert(node, id);
        }
        self.scopes
            .last_mut()
            .expect("scope stack is never empty during analysis")
            .names
            .insert(name.to_string(), id);
        id
    }

    fn lookup(&self, name: &str) -> Option<BindingId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.names.get(name).copied())
    }

    /// Declarations visible at this statement level: lexical kinds plus
    /// `var` (which [`Self::hoist_vars`] also surfaces from nested blocks).
    fn declare_lexical(&mut self, stmt: NodeId) {
        match self.tree.kind(stmt) {
            NodeKind::VarDecl { kind, declarators } => {
                let binding_kind = match kind {
                    DeclKind::Var => BindingKind::Var,
                    DeclKind::Let => BindingKind::Let,
                    DeclKind::Const => BindingKind::Const,
                };
                for &declarator in declarators {
                    self.declare_declarator(declarator, binding_kind);
                }
            }
            NodeKind::FunctionDecl { name, .. } => {
                let name = name.clone();
                self.declare(&name, BindingKind::Function, stmt, None, None);
            }
            NodeKind::ClassDecl { name } => {
                let name = name.clone();
                self.declare(&name, BindingKind::Class, stmt, None, None);
            }
            _ => {}
        }
    }

    fn declare_declarator(&mut self, declarator: NodeId, kind: BindingKind) {
        let NodeKind::Declarator { name, init } = self.tree.kind(declarator) else {
            return;
        };
        let (name, init) = (*name, *init);
        if let Some(ident) = self.tree.kind(name).ident_name().map(str::to_string) {
            self.declare(&ident, kind, declarator, init, Some(name));
        }
    }

    /// Hoist `var` declarations out of nested blocks into the current
    /// (function or program) scope. Does not descend into nested functions.
    fn hoist_vars(&mut self, stmt: NodeId) {
        match self.tree.kind(stmt) {
            NodeKind::Block { body } | NodeKind::SwitchCase { body, .. } => {
                for &inner in body.clone().iter() {
                    self.hoist_var_decl(inner);
                    self.hoist_vars(inner);
                }
            }
            NodeKind::If {
                consequent,
                alternate,
                ..
            } => {
                let (consequent, alternate) = (*consequent, *alternate);
                self.hoist_var_decl(consequent);
                self.hoist_vars(consequent);
                if let Some(alternate) = alternate {
                    self.hoist_var_decl(alternate);
                    self.hoist_vars(alternate);
                }
            }
            NodeKind::While { body, .. }
            | NodeKind::ForOf { body, .. }
            | NodeKind::ForIn { body, .. } => {
                let body = *body;
                self.hoist_var_decl(body);
                self.hoist_vars(body);
            }
            NodeKind::Switch { cases, .. } => {
                for &case in cases.clone().iter() {
                    self.hoist_vars(case);
                }
            }
            _ => {}
        }
    }

    fn hoist_var_decl(&mut self, stmt: NodeId) {
        if let NodeKind::VarDecl {
            kind: DeclKind::Var,
            declarators,
        } = self.tree.kind(stmt)
        {
            for &declarator in declarators.clone().iter() {
                self.declare_declarator(declarator, BindingKind::Var);
            }
        }
    }

    fn enter_function(&mut self, params: &[NodeId], body: NodeId) {
        self.scopes.push(Scope {
            names: HashMap::new(),
        });
        for &param in params {
            if let NodeKind::Param { name } = self.tree.kind(param) {
                let name = name.clone();
                self.declare(&name, BindingKind::Param, param, None, None);
            }
        }
        // the body block shares the function scope for var hoisting
        if let NodeKind::Block { body: stmts } = self.tree.kind(body) {
            for &stmt in stmts.clone().iter() {
                self.declare_lexical(stmt);
                self.hoist_vars(stmt);
            }
            for &stmt in stmts.clone().iter() {
                self.visit(stmt);
            }
        } else {
            // expression-bodied arrow
            self.visit(body);
        }
        self.scopes.pop();
    }

    fn visit_block(&mut self, body: &[NodeId]) {
        self.scopes.push(Scope {
            names: HashMap::new(),
        });
        for &stmt in body {
            if !matches!(
                self.tree.kind(stmt),
                NodeKind::VarDecl {
                    kind: DeclKind::Var,
                    ..
                }
            ) {
                self.declare_lexical(stmt);
            }
        }
        for &stmt in body {
            self.visit(stmt);
        }
        self.scopes.pop();
    }

    fn read(&mut self, ident: NodeId) {
        let NodeKind::Ident { name } = self.tree.kind(ident) else {
            return;
        };
        if let Some(id) = self.lookup(&name.clone()) {
            self.index.resolved.insert(ident, id);
            self.index.bindings[id.0 as usize].reads.push(ident);
        }
    }

    fn write(&mut self, ident: NodeId) {
        let NodeKind::Ident { name } = self.tree.kind(ident) else {
            return;
        };
        if let Some(id) = self.lookup(&name.clone()) {
            self.index.resolved.insert(ident, id);
            self.index.bindings[id.0 as usize].writes.push(ident);
        }
    }

    fn visit(&mut self, node: NodeId) {
        match self.tree.kind(node).clone() {
            NodeKind::Ident { .. } => self.read(node),

            NodeKind::Block { body } => self.visit_block(&body),

            NodeKind::VarDecl { declarators, .. } => {
                for declarator in declarators {
                    if let NodeKind::Declarator {
                        init: Some(init), ..
                    } = self.tree.kind(declarator)
                    {
                        self.visit(*init);
                    }
                }
            }

            NodeKind::FunctionDecl { params, body, .. }
            | NodeKind::FunctionExpr { params, body, .. }
            | NodeKind::ArrowFunction { params, body } => self.enter_function(&params, body),

            NodeKind::Assignment { target, value } => {
                if matches!(self.tree.kind(target), NodeKind::Ident { .. }) {
                    self.write(target);
                } else {
                    self.visit(target);
                }
                self.visit(value);
            }

            NodeKind::Update { operand, .. } => {
                if matches!(self.tree.kind(operand), NodeKind::Ident { .. }) {
                    self.write(operand);
                } else {
                    self.visit(operand);
                }
            }

            NodeKind::ForOf { left, right, body } | NodeKind::ForIn { left, right, body } => {
                self.visit(right);
                self.scopes.push(Scope {
                    names: HashMap::new(),
                });
                let for_kind = if matches!(self.tree.kind(node), NodeKind::ForOf { .. }) {
                    BindingKind::ForOf
                } else {
                    BindingKind::ForIn
                };
                match self.tree.kind(left).clone() {
                    NodeKind::VarDecl { declarators, .. } => {
                        for declarator in declarators {
                            let NodeKind::Declarator { name, .. } = self.tree.kind(declarator)
                            else {
                                continue;
                            };
                            let name = *name;
                            if let Some(ident) =
                                self.tree.kind(name).ident_name().map(str::to_string)
                            {
                                self.declare(
                                    &ident,
                                    for_kind,
                                    declarator,
                                    Some(right),
                                    Some(name),
                                );
                            }
                        }
                    }
                    NodeKind::Ident { .. } => self.write(left),
                    _ => {}
                }
                self.visit(body);
                self.scopes.pop();
            }

            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                self.visit(discriminant);
                self.scopes.push(Scope {
                    names: HashMap::new(),
                });
                for &case in &cases {
                    if let NodeKind::SwitchCase { body, .. } = self.tree.kind(case) {
                        for &stmt in body.clone().iter() {
                            self.declare_lexical(stmt);
                        }
                    }
                }
                for case in cases {
                    if let NodeKind::SwitchCase { test, body } = self.tree.kind(case).clone() {
                        if let Some(test) = test {
                            self.visit(test);
                        }
                        for stmt in body {
                            self.visit(stmt);
                        }
                    }
                }
                self.scopes.pop();
            }

            NodeKind::Member {
                object, property, ..
            } => {
                self.visit(object);
                if let PropertyKey::Computed(key) = property {
                    self.visit(key);
                }
            }

            NodeKind::ObjectLit { properties } => {
                for prop in properties {
                    match prop {
                        ObjectProperty::Init { key, value } => {
                            if let PropertyKey::Computed(key) = key {
                                self.visit(key);
                            }
                            self.visit(value);
                        }
                        ObjectProperty::Spread(value) => self.visit(value),
                    }
                }
            }

            NodeKind::ArrayLit { elements } => {
                for element in elements {
                    match element {
                        ArrayElement::Item(id) | ArrayElement::Spread(id) => self.visit(id),
                        ArrayElement::Hole => {}
                    }
                }
            }

            NodeKind::Call { callee, args, .. } | NodeKind::New { callee, args } => {
                self.visit(callee);
                for arg in args {
                    match arg {
                        Argument::Plain(id) | Argument::Spread(id) => self.visit(id),
                    }
                }
            }

            kind => {
                for child in crate::ast::walk::children(&kind) {
                    self.visit(child);
                }
            }
        }
    }
}
