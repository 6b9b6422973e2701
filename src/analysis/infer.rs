//! Evidence extraction
//!
//! The recursive `type_of` procedure at the center of the engine. Evidence
//! sources are consulted in a fixed order and the first conclusive one
//! wins: literal shape, the external oracle, author annotations, structural
//! literals, operator tables, identifier resolution, call/member
//! resolution, and finally flow-sensitive guard narrowing. Results are
//! memoized per node; a slot is pre-seeded "unknown" before recursing so
//! self-referential bindings terminate. Failures never escape: every
//! internal error degrades to unknown.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::analysis::annotations::{parse_type_text, AnnotationLookup};
use crate::analysis::cfg::ControlFlow;
use crate::analysis::guards;
use crate::analysis::oracle::{translate, TypeOracle};
use crate::analysis::scope::{BindingKind, ScopeIndex};
use crate::analysis::tracker::TrackerConfig;
use crate::ast::node::{Argument, ArrayElement, ObjectProperty, PropertyKey};
use crate::ast::{BinaryOp, NodeId, NodeKind, SyntaxTree, UnaryOp};
use crate::core::builtins;
use crate::core::types::{CallMeta, PropEntry, TypeClass, TypeInfo, TypeTag, TypeThunk};
use crate::errors::{InferError, InferResult};

#[derive(Clone)]
enum CacheSlot {
    /// Seeded before recursing into a node; breaks cycles.
    Pending,
    Unknown,
    Known(TypeInfo),
}

impl CacheSlot {
    fn to_option(&self) -> Option<TypeInfo> {
        match self {
            CacheSlot::Known(ty) => Some(ty.clone()),
            CacheSlot::Pending | CacheSlot::Unknown => None,
        }
    }
}

/// Shared inference state for one tree. Lives behind `Rc` so lazily
/// evaluated generators can re-enter the engine after a query returns.
pub(crate) struct InferCtx {
    pub tree: Rc<SyntaxTree>,
    pub scopes: ScopeIndex,
    pub config: TrackerConfig,
    pub oracle: Option<Rc<dyn TypeOracle>>,
    pub annotations: Option<Rc<dyn AnnotationLookup>>,
    cfg: OnceCell<ControlFlow>,
    cache: RefCell<HashMap<NodeId, CacheSlot>>,
    depth: Cell<usize>,
}

impl InferCtx {
    pub fn new(
        tree: Rc<SyntaxTree>,
        config: TrackerConfig,
        oracle: Option<Rc<dyn TypeOracle>>,
        annotations: Option<Rc<dyn AnnotationLookup>>,
    ) -> Self {
        let scopes = ScopeIndex::analyze(&tree);
        Self {
            tree,
            scopes,
            config,
            oracle,
            annotations,
            cfg: OnceCell::new(),
            cache: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
        }
    }

    /// The control-flow graph, built on first guard query.
    pub fn cfg(&self) -> &ControlFlow {
        self.cfg.get_or_init(|| ControlFlow::build(&self.tree))
    }

    /// Memoized inference entry point. `None` is "unknown".
    pub fn type_of(self: &Rc<Self>, node: NodeId) -> Option<TypeInfo> {
        if let Some(slot) = self.cache.borrow().get(&node) {
            return slot.to_option();
        }
        if self.depth.get() >= self.config.max_depth {
            debug!(node = node.0, "inference depth ceiling reached");
            return None;
        }

        self.cache.borrow_mut().insert(node, CacheSlot::Pending);
        self.depth.set(self.depth.get() + 1);
        let result = match self.infer_node(node) {
            Ok(result) => result,
            Err(error) => {
                debug!(node = node.0, %error, "inference failure degraded to unknown");
                None
            }
        };
        self.depth.set(self.depth.get() - 1);

        let slot = match &result {
            Some(ty) => CacheSlot::Known(ty.clone()),
            None => CacheSlot::Unknown,
        };
        self.cache.borrow_mut().insert(node, slot);
        result
    }

    fn infer_node(self: &Rc<Self>, node: NodeId) -> InferResult<Option<TypeInfo>> {
        // 1. literal shape always short-circuits
        if let Some(ty) = self.literal_type(node) {
            return Ok(Some(ty));
        }

        // 2. a bound oracle supersedes the per-node heuristics (3-6)
        let mut oracle_answered = false;
        if let Some(oracle) = &self.oracle {
            if let Some(answer) = oracle.classify(node) {
                if let Some(ty) = translate(&answer) {
                    return Ok(Some(ty));
                }
                oracle_answered = true;
            }
        }

        if !oracle_answered {
            // 3. author annotations on the nearest enclosing declaration
            if let Some(ty) = self.annotation_type(node)? {
                return Ok(Some(ty));
            }
            // 4. structural literals
            if let Some(ty) = self.structural_type(node) {
                return Ok(Some(ty));
            }
            // 5. fixed operator tables
            if let Some(ty) = self.operator_type(node) {
                return Ok(Some(ty));
            }
            // 6. identifier resolution
            if let Some(ty) = self.identifier_type(node)? {
                return Ok(Some(ty));
            }
        }

        // 7. call/member/new resolution
        if let Some(ty) = self.member_call_type(node) {
            return Ok(Some(ty));
        }

        // 8. flow-sensitive narrowing, as a last resort
        if self.config.narrow_with_guards {
            if let Some(ty) = guards::narrow(self, node) {
                return Ok(Some(ty));
            }
        }

        if !self.is_expression(node) {
            return Err(InferError::unsupported("non-expression query node"));
        }
        Ok(None)
    }

    /// Statement and pattern kinds carry no value; querying one is an
    /// unsupported construct rather than ordinary missing evidence.
    fn is_expression(&self, node: NodeId) -> bool {
        !matches!(
            self.tree.kind(node),
            NodeKind::Program { .. }
                | NodeKind::Block { .. }
                | NodeKind::VarDecl { .. }
                | NodeKind::Declarator { .. }
                | NodeKind::FunctionDecl { .. }
                | NodeKind::ClassDecl { .. }
                | NodeKind::ExprStmt { .. }
                | NodeKind::If { .. }
                | NodeKind::Switch { .. }
                | NodeKind::SwitchCase { .. }
                | NodeKind::Return { .. }
                | NodeKind::Throw { .. }
                | NodeKind::While { .. }
                | NodeKind::ForOf { .. }
                | NodeKind::ForIn { .. }
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Empty
                | NodeKind::Param { .. }
        )
    }

    fn literal_type(&self, node: NodeId) -> Option<TypeInfo> {
        match self.tree.kind(node) {
            NodeKind::StringLit { .. } | NodeKind::TemplateLit { .. } => Some(TypeInfo::string()),
            NodeKind::NumberLit { .. } => Some(TypeInfo::number()),
            NodeKind::BoolLit { .. } => Some(TypeInfo::boolean()),
            NodeKind::BigIntLit { .. } => Some(TypeInfo::bigint()),
            NodeKind::RegexLit { .. } => Some(TypeInfo::regexp()),
            NodeKind::NullLit => Some(TypeInfo::Null),
            _ => None,
        }
    }

    /// The declaration whose annotation covers `node`: the resolved
    /// binding's declaration for identifiers, or the enclosing declarator
    /// when `node` is its initializer.
    fn annotation_decl(&self, node: NodeId) -> Option<NodeId> {
        match self.tree.kind(node) {
            NodeKind::Ident { .. } => self
                .scopes
                .resolve(node)
                .map(|id| self.scopes.binding(id).decl),
            _ => {
                let parent = self.tree.parent(node)?;
                match self.tree.kind(parent) {
                    NodeKind::Declarator { init, .. } if *init == Some(node) => Some(parent),
                    _ => None,
                }
            }
        }
    }

    fn annotation_type(&self, node: NodeId) -> InferResult<Option<TypeInfo>> {
        if !self.config.use_annotations {
            return Ok(None);
        }
        let Some(provider) = &self.annotations else {
            return Ok(None);
        };
        let Some(decl) = self.annotation_decl(node) else {
            return Ok(None);
        };
        let Some(text) = provider.type_text(decl) else {
            return Ok(None);
        };
        parse_type_text(&text)
    }

    fn structural_type(self: &Rc<Self>, node: NodeId) -> Option<TypeInfo> {
        match self.tree.kind(node) {
            NodeKind::ArrayLit { elements } => {
                let maybe_tuple = elements
                    .iter()
                    .all(|element| matches!(element, ArrayElement::Item(_)));
                let elements = elements.clone();
                let ctx = Rc::clone(self);
                Some(TypeInfo::array(
                    Rc::new(move || {
                        elements
                            .iter()
                            .map(|element| match element {
                                ArrayElement::Item(id) => ctx.type_of(*id),
                                ArrayElement::Spread(id) => {
                                    ctx.type_of(*id).and_then(|ty| ty.iterate_type())
                                }
                                ArrayElement::Hole => None,
                            })
                            .collect()
                    }),
                    maybe_tuple,
                ))
            }

            NodeKind::ObjectLit { properties } => {
                let properties = properties.clone();
                let ctx = Rc::clone(self);
                // reverse declaration order: the first match during a scan
                // is the last write
                Some(TypeInfo::object(Rc::new(move || {
                    let mut entries = Vec::new();
                    for property in properties.iter().rev() {
                        match property {
                            ObjectProperty::Init {
                                key: PropertyKey::Static(name),
                                value,
                            } => {
                                entries.push(PropEntry::Known(
                                    name.clone(),
                                    ctx.thunk_of(*value),
                                ));
                            }
                            // a computed key may overwrite anything
                            // declared before it
                            ObjectProperty::Init {
                                key: PropertyKey::Computed(_),
                                ..
                            } => entries.push(PropEntry::Opaque),
                            ObjectProperty::Spread(source) => {
                                match ctx.type_of(*source) {
                                    Some(TypeInfo::Class(TypeClass::Object(object))) => {
                                        // splice the source's own generator
                                        // in place, already reversed
                                        entries.extend(object.entries());
                                    }
                                    _ => entries.push(PropEntry::Opaque),
                                }
                            }
                        }
                    }
                    entries
                })))
            }

            NodeKind::FunctionExpr { .. } | NodeKind::ArrowFunction { .. } => {
                Some(TypeInfo::function_unknown())
            }

            _ => None,
        }
    }

    fn operator_type(self: &Rc<Self>, node: NodeId) -> Option<TypeInfo> {
        match self.tree.kind(node) {
            NodeKind::Binary { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                if op.is_boolean() {
                    return Some(TypeInfo::boolean());
                }
                if op.is_numeric() {
                    return Some(self.numeric_result(left, right));
                }
                if op == BinaryOp::Add {
                    return self.addition_result(left, right);
                }
                None
            }

            NodeKind::Unary { op, operand } => {
                let (op, operand) = (*op, *operand);
                match op {
                    UnaryOp::Not | UnaryOp::Delete => Some(TypeInfo::boolean()),
                    UnaryOp::Void => Some(TypeInfo::Undefined),
                    UnaryOp::Typeof => Some(TypeInfo::string()),
                    UnaryOp::Plus => Some(TypeInfo::number()),
                    UnaryOp::Minus | UnaryOp::BitNot => {
                        if self.is_exactly(operand, TypeTag::BigInt) {
                            Some(TypeInfo::bigint())
                        } else {
                            Some(TypeInfo::number())
                        }
                    }
                }
            }

            NodeKind::Update { operand, .. } => {
                if self.is_exactly(*operand, TypeTag::BigInt) {
                    Some(TypeInfo::bigint())
                } else {
                    Some(TypeInfo::number())
                }
            }

            NodeKind::Assignment { value, .. } => self.type_of(*value),

            NodeKind::Sequence { exprs } => exprs.last().and_then(|&last| self.type_of(last)),

            NodeKind::Conditional {
                consequent,
                alternate,
                ..
            } => {
                let left = self.type_of(*consequent)?;
                let right = self.type_of(*alternate)?;
                TypeInfo::union_of(vec![left, right])
            }

            // value-typing of short-circuit expressions: one of the two
            // operands, so the union when both are known
            NodeKind::Logical { left, right, .. } => {
                let left = self.type_of(*left)?;
                let right = self.type_of(*right)?;
                TypeInfo::union_of(vec![left, right])
            }

            _ => None,
        }
    }

    fn is_exactly(self: &Rc<Self>, node: NodeId, tag: TypeTag) -> bool {
        self.type_of(node).is_some_and(|ty| ty.is_exactly(tag))
    }

    /// Number, upgraded to BigInt only when both operands certainly are.
    fn numeric_result(self: &Rc<Self>, left: NodeId, right: NodeId) -> TypeInfo {
        if self.is_exactly(left, TypeTag::BigInt) && self.is_exactly(right, TypeTag::BigInt) {
            TypeInfo::bigint()
        } else {
            TypeInfo::number()
        }
    }

    /// `+`: String if either side certainly is, else the numeric rule, else
    /// unknown (an unresolved operand could still concatenate).
    fn addition_result(self: &Rc<Self>, left: NodeId, right: NodeId) -> Option<TypeInfo> {
        let left_ty = self.type_of(left);
        let right_ty = self.type_of(right);
        let exactly = |ty: &Option<TypeInfo>, tag: TypeTag| {
            ty.as_ref().is_some_and(|t| t.is_exactly(tag))
        };
        if exactly(&left_ty, TypeTag::String) || exactly(&right_ty, TypeTag::String) {
            return Some(TypeInfo::string());
        }
        if exactly(&left_ty, TypeTag::BigInt) && exactly(&right_ty, TypeTag::BigInt) {
            return Some(TypeInfo::bigint());
        }
        if exactly(&left_ty, TypeTag::Number) && exactly(&right_ty, TypeTag::Number) {
            return Some(TypeInfo::number());
        }
        None
    }

    fn identifier_type(self: &Rc<Self>, node: NodeId) -> InferResult<Option<TypeInfo>> {
        let NodeKind::Ident { name } = self.tree.kind(node) else {
            return Ok(None);
        };
        let Some(binding_id) = self.scopes.resolve(node) else {
            // unresolved: consult the fixed global-bindings table
            return Ok(builtins::global_binding(name));
        };
        let binding = self.scopes.binding(binding_id);
        match binding.kind {
            BindingKind::ForOf => {
                let Some(collection) = binding.init else {
                    return Ok(None);
                };
                Ok(self
                    .type_of(collection)
                    .and_then(|ty| ty.iterate_type()))
            }
            BindingKind::ForIn => Ok(Some(TypeInfo::string())),
            BindingKind::Function => Ok(Some(TypeInfo::function_unknown())),
            BindingKind::Class => Ok(None),
            // annotated parameters resolve at step 3; the rest falls
            // through to guard narrowing
            BindingKind::Param => Ok(None),
            BindingKind::Const | BindingKind::Let | BindingKind::Var => {
                if binding.is_effectively_const() {
                    match binding.init {
                        Some(init) => Ok(self.type_of(init)),
                        None => Ok(None),
                    }
                } else {
                    Ok(None)
                }
            }
        }
    }

    pub(crate) fn thunk_of(self: &Rc<Self>, node: NodeId) -> TypeThunk {
        let ctx = Rc::clone(self);
        Rc::new(move || ctx.type_of(node))
    }

    fn argument_thunks(self: &Rc<Self>, args: &[Argument]) -> Vec<TypeThunk> {
        args.iter()
            .map(|arg| match arg {
                Argument::Plain(id) => self.thunk_of(*id),
                Argument::Spread(id) => {
                    let ctx = Rc::clone(self);
                    let id = *id;
                    Rc::new(move || ctx.type_of(id).and_then(|ty| ty.iterate_type())) as TypeThunk
                }
            })
            .collect()
    }

    fn member_call_type(self: &Rc<Self>, node: NodeId) -> Option<TypeInfo> {
        match self.tree.kind(node) {
            NodeKind::Member {
                object, property, ..
            } => {
                let object = *object;
                match property {
                    PropertyKey::Static(name) => self.static_member_type(object, name),
                    PropertyKey::Computed(key) => self.computed_member_type(object, *key),
                }
            }

            NodeKind::Call { callee, args, .. } => {
                let callee = *callee;
                let arg_thunks = self.argument_thunks(args);
                let this_thunk = self.callee_receiver(callee);
                let callee_ty = self.type_of(callee)?;
                callee_ty.return_type(
                    this_thunk.as_ref(),
                    &arg_thunks,
                    CallMeta {
                        is_construct: false,
                    },
                )
            }

            NodeKind::New { callee, args } => {
                let callee = *callee;
                let arg_thunks = self.argument_thunks(args);
                let callee_ty = self.type_of(callee)?;
                callee_ty.return_type(None, &arg_thunks, CallMeta { is_construct: true })
            }

            _ => None,
        }
    }

    /// The receiver thunk for a member-call callee.
    fn callee_receiver(self: &Rc<Self>, callee: NodeId) -> Option<TypeThunk> {
        match self.tree.kind(callee) {
            NodeKind::Member { object, .. } => Some(self.thunk_of(*object)),
            _ => None,
        }
    }

    fn static_member_type(self: &Rc<Self>, object: NodeId, name: &str) -> Option<TypeInfo> {
        // universal fast path: stringification is available on everything
        if name == "toString" || name == "toLocaleString" {
            return builtins::object_proto(name);
        }
        let object_ty = self.type_of(object)?;
        object_ty.property_type(name)
    }

    fn computed_member_type(self: &Rc<Self>, object: NodeId, key: NodeId) -> Option<TypeInfo> {
        match self.tree.kind(key) {
            NodeKind::StringLit { value } => {
                let name = value.clone();
                self.static_member_type(object, &name)
            }
            NodeKind::NumberLit { value } if value.fract() == 0.0 && *value >= 0.0 => {
                let index = *value as usize;
                match self.type_of(object)? {
                    TypeInfo::Class(TypeClass::Array(array)) => array.at(index),
                    TypeInfo::Class(TypeClass::String) => Some(TypeInfo::string()),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Resolves `node` as an identifier or a static member path rooted at one:
/// `x` yields `(x, [])`, `x.a.b` yields `(x, ["a", "b"])`. Optional
/// chaining is tolerated; computed keys are not.
pub(crate) fn member_path(tree: &SyntaxTree, node: NodeId) -> Option<(NodeId, Vec<String>)> {
    let mut path = Vec::new();
    let mut current = node;
    loop {
        match tree.kind(current) {
            NodeKind::Ident { .. } => {
                path.reverse();
                return Some((current, path));
            }
            NodeKind::Member {
                object,
                property: PropertyKey::Static(name),
                ..
            } => {
                path.push(name.clone());
                current = *object;
            }
            _ => return None,
        }
    }
}

