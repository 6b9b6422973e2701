//! Inferred-type values and their structural operations.
//!
//! `TypeInfo` is the result of inference: a primitive sentinel, a marker for
//! a built-in constructor value, or a structural `TypeClass`. Parameterized
//! classes carry re-invokable generators: `Rc` closures that may be called
//! any number of times and re-yield the same sequence, since `has`,
//! `type_names`, and `equals` each re-scan them. Every operation is pure and
//! deterministic for fixed inputs; memoization and union deduplication
//! depend on it.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::builtins;

/// A lazily computed type. Safe to invoke repeatedly.
pub type TypeThunk = Rc<dyn Fn() -> Option<TypeInfo>>;

/// Re-invokable element producer for arrays, map keys/values, and sets.
/// `None` entries are elements whose type could not be determined.
pub type ElementGen = Rc<dyn Fn() -> Vec<Option<TypeInfo>>>;

/// Re-invokable property producer. Yields entries in *reverse declaration
/// order* so that the first name match is the last write.
pub type PropertyGen = Rc<dyn Fn() -> Vec<PropEntry>>;

/// Re-invokable union-member producer.
pub type MemberGen = Rc<dyn Fn() -> Vec<TypeInfo>>;

/// One entry of an object property scan.
#[derive(Clone)]
pub enum PropEntry {
    Known(String, TypeThunk),
    /// A spread whose source type is unknown: any property declared before
    /// it may have been overwritten, so scans stop here.
    Opaque,
}

/// Discriminant for [`TypeClass`] shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeTag {
    Array,
    BigInt,
    Boolean,
    Function,
    Iterable,
    Map,
    Number,
    Object,
    RegExp,
    Set,
    String,
    Union,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            Self::Array => "Array",
            Self::BigInt => "BigInt",
            Self::Boolean => "Boolean",
            Self::Function => "Function",
            Self::Iterable => "Iterable",
            Self::Map => "Map",
            Self::Number => "Number",
            Self::Object => "Object",
            Self::RegExp => "RegExp",
            Self::Set => "Set",
            Self::String => "String",
            Self::Union => "Union",
        }
    }
}

/// A built-in constructor or namespace value. Distinct from the instance
/// type it produces: `String` the value is a function, `'x'` is a String.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalObject {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    RegExp,
    Array,
    Object,
    Map,
    Set,
    Function,
    Math,
    Json,
}

impl GlobalObject {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::BigInt => "BigInt",
            Self::Symbol => "Symbol",
            Self::RegExp => "RegExp",
            Self::Array => "Array",
            Self::Object => "Object",
            Self::Map => "Map",
            Self::Set => "Set",
            Self::Function => "Function",
            Self::Math => "Math",
            Self::Json => "JSON",
        }
    }
}

/// The result of inference.
#[derive(Clone)]
pub enum TypeInfo {
    Null,
    Undefined,
    /// A reference to the built-in constructor value itself.
    Factory(GlobalObject),
    Class(TypeClass),
}

/// A structural type description.
#[derive(Clone)]
pub enum TypeClass {
    String,
    Number,
    Boolean,
    BigInt,
    RegExp,
    Array(ArrayType),
    Object(ObjectType),
    Map(MapType),
    Set(SetType),
    Function(FunctionType),
    Iterable(IterableType),
    Union(UnionType),
}

#[derive(Clone)]
pub struct ArrayType {
    elements: ElementGen,
    maybe_tuple: bool,
}

#[derive(Clone)]
pub struct ObjectType {
    properties: PropertyGen,
}

#[derive(Clone)]
pub struct MapType {
    keys: ElementGen,
    values: ElementGen,
}

#[derive(Clone)]
pub struct SetType {
    elements: ElementGen,
}

#[derive(Clone)]
pub struct IterableType {
    element: TypeThunk,
}

#[derive(Clone)]
pub struct UnionType {
    members: MemberGen,
}

/// Per-call-site context handed to function resolvers. Thunks keep unused
/// operands uncomputed and bound the recursion depth.
pub struct CallContext<'a> {
    pub this: Option<&'a TypeThunk>,
    pub args: &'a [TypeThunk],
    pub meta: CallMeta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallMeta {
    pub is_construct: bool,
}

impl CallContext<'_> {
    pub fn this_type(&self) -> Option<TypeInfo> {
        self.this.and_then(|thunk| thunk())
    }

    pub fn arg_type(&self, index: usize) -> Option<TypeInfo> {
        self.args.get(index).and_then(|thunk| thunk())
    }
}

/// A resolver from the static built-in tables.
pub type StaticResolver = fn(&CallContext<'_>) -> Option<TypeInfo>;

/// How a function value answers `return_type`. A single function can answer
/// differently per call site by inspecting the context.
#[derive(Clone)]
pub enum FunctionResolver {
    Static(StaticResolver),
    Dynamic(Rc<dyn Fn(&CallContext<'_>) -> Option<TypeInfo>>),
}

#[derive(Clone)]
pub struct FunctionType {
    resolver: FunctionResolver,
}

// ---------------------------------------------------------------------------
// Constructors

impl TypeInfo {
    pub fn string() -> Self {
        Self::Class(TypeClass::String)
    }

    pub fn number() -> Self {
        Self::Class(TypeClass::Number)
    }

    pub fn boolean() -> Self {
        Self::Class(TypeClass::Boolean)
    }

    pub fn bigint() -> Self {
        Self::Class(TypeClass::BigInt)
    }

    pub fn regexp() -> Self {
        Self::Class(TypeClass::RegExp)
    }

    pub fn array(elements: ElementGen, maybe_tuple: bool) -> Self {
        Self::Class(TypeClass::Array(ArrayType::new(elements, maybe_tuple)))
    }

    /// Array whose single known element type is `element`.
    pub fn array_of(element: TypeInfo) -> Self {
        Self::array(Rc::new(move || vec![Some(element.clone())]), false)
    }

    /// Array with no recoverable element information.
    pub fn array_unknown() -> Self {
        Self::array(Rc::new(|| Vec::new()), false)
    }

    pub fn object(properties: PropertyGen) -> Self {
        Self::Class(TypeClass::Object(ObjectType::new(properties)))
    }

    pub fn object_empty() -> Self {
        Self::object(Rc::new(|| Vec::new()))
    }

    /// Object whose property set cannot be enumerated.
    pub fn object_opaque() -> Self {
        Self::object(Rc::new(|| vec![PropEntry::Opaque]))
    }

    pub fn map(keys: ElementGen, values: ElementGen) -> Self {
        Self::Class(TypeClass::Map(MapType { keys, values }))
    }

    pub fn map_unknown() -> Self {
        Self::map(Rc::new(|| Vec::new()), Rc::new(|| Vec::new()))
    }

    pub fn set(elements: ElementGen) -> Self {
        Self::Class(TypeClass::Set(SetType { elements }))
    }

    pub fn set_unknown() -> Self {
        Self::set(Rc::new(|| Vec::new()))
    }

    pub fn iterable(element: TypeThunk) -> Self {
        Self::Class(TypeClass::Iterable(IterableType { element }))
    }

    pub fn iterable_of(element: TypeInfo) -> Self {
        Self::iterable(Rc::new(move || Some(element.clone())))
    }

    pub fn function_static(resolver: StaticResolver) -> Self {
        Self::Class(TypeClass::Function(FunctionType {
            resolver: FunctionResolver::Static(resolver),
        }))
    }

    pub fn function_dynamic(resolver: Rc<dyn Fn(&CallContext<'_>) -> Option<TypeInfo>>) -> Self {
        Self::Class(TypeClass::Function(FunctionType {
            resolver: FunctionResolver::Dynamic(resolver),
        }))
    }

    /// Function about which nothing is known beyond being callable.
    pub fn function_unknown() -> Self {
        fn unknown(_: &CallContext<'_>) -> Option<TypeInfo> {
            None
        }
        Self::function_static(unknown)
    }

    /// Normalized union over `members`: flattened, deduplicated, collapsed
    /// when fewer than two distinct members remain.
    pub fn union_of(members: Vec<TypeInfo>) -> Option<TypeInfo> {
        let mut collector = UnionCollector::new();
        for member in members {
            collector.add(member);
        }
        collector.build()
    }

    /// A thunk that always yields this type.
    pub fn into_thunk(self) -> TypeThunk {
        Rc::new(move || Some(self.clone()))
    }
}

/// A thunk that yields "unknown".
pub fn unknown_thunk() -> TypeThunk {
    Rc::new(|| None)
}

// ---------------------------------------------------------------------------
// Operations

impl TypeInfo {
    pub fn has(&self, tag: TypeTag) -> bool {
        match self {
            Self::Class(class) => class.has(tag),
            _ => false,
        }
    }

    /// Sorted, deduplicated display names of the possible runtime types.
    pub fn type_names(&self) -> Vec<String> {
        let mut names = match self {
            Self::Null => vec!["null".to_string()],
            Self::Undefined => vec!["undefined".to_string()],
            Self::Factory(_) => vec!["Function".to_string()],
            Self::Class(class) => class.type_names(),
        };
        names.sort();
        names.dedup();
        names
    }

    /// Whether the only possible runtime type is `tag`.
    pub fn is_exactly(&self, tag: TypeTag) -> bool {
        self.type_names() == [tag.name()]
    }

    pub fn property_type(&self, name: &str) -> Option<TypeInfo> {
        match self {
            Self::Class(class) => class.property_type(name),
            Self::Factory(global) => builtins::factory_member(*global, name),
            Self::Null | Self::Undefined => None,
        }
    }

    pub fn iterate_type(&self) -> Option<TypeInfo> {
        match self {
            Self::Class(class) => class.iterate_type(),
            _ => None,
        }
    }

    pub fn return_type(
        &self,
        this: Option<&TypeThunk>,
        args: &[TypeThunk],
        meta: CallMeta,
    ) -> Option<TypeInfo> {
        let ctx = CallContext { this, args, meta };
        match self {
            Self::Class(class) => class.return_type(&ctx),
            Self::Factory(global) => builtins::factory_call(*global, &ctx),
            Self::Null | Self::Undefined => None,
        }
    }

    pub fn equals(&self, other: &TypeInfo) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Factory(a), Self::Factory(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a.equals(b),
            _ => false,
        }
    }
}

impl TypeClass {
    /// The shape discriminant. `has` on a union consults its members
    /// instead of this tag.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::String => TypeTag::String,
            Self::Number => TypeTag::Number,
            Self::Boolean => TypeTag::Boolean,
            Self::BigInt => TypeTag::BigInt,
            Self::RegExp => TypeTag::RegExp,
            Self::Array(_) => TypeTag::Array,
            Self::Object(_) => TypeTag::Object,
            Self::Map(_) => TypeTag::Map,
            Self::Set(_) => TypeTag::Set,
            Self::Function(_) => TypeTag::Function,
            Self::Iterable(_) => TypeTag::Iterable,
            Self::Union(_) => TypeTag::Union,
        }
    }

    pub fn has(&self, tag: TypeTag) -> bool {
        match self {
            Self::Union(union) => union.collect().iter().any(|member| member.has(tag)),
            _ => self.tag() == tag,
        }
    }

    pub fn type_names(&self) -> Vec<String> {
        match self {
            Self::Union(union) => {
                let mut names: Vec<String> = union
                    .collect()
                    .iter()
                    .flat_map(|member| member.type_names())
                    .collect();
                names.sort();
                names.dedup();
                names
            }
            _ => vec![self.tag().name().to_string()],
        }
    }

    pub fn property_type(&self, name: &str) -> Option<TypeInfo> {
        match self {
            Self::String => builtins::string_proto(name),
            Self::Number => builtins::number_proto(name),
            Self::Boolean => builtins::boolean_proto(name),
            Self::BigInt => builtins::bigint_proto(name),
            Self::RegExp => builtins::regexp_proto(name),
            Self::Array(_) => builtins::array_proto(name),
            Self::Object(object) => match object.own_property(name) {
                Some(found) => found,
                None => builtins::object_proto(name),
            },
            Self::Map(_) => builtins::map_proto(name),
            Self::Set(_) => builtins::set_proto(name),
            Self::Function(_) => builtins::function_proto(name),
            Self::Iterable(_) => None,
            Self::Union(union) => {
                TypeInfo::union_of(
                    union
                        .collect()
                        .iter()
                        .filter_map(|member| member.property_type(name))
                        .collect(),
                )
            }
        }
    }

    /// Type parameter at `index`: element type for arrays/sets/iterables,
    /// key/value for maps.
    pub fn param_type(&self, index: usize) -> Option<TypeInfo> {
        match self {
            Self::Array(array) if index == 0 => array.element_union(),
            Self::Map(map) if index == 0 => union_of_elements(&(map.keys)()),
            Self::Map(map) if index == 1 => union_of_elements(&(map.values)()),
            Self::Set(set) if index == 0 => union_of_elements(&(set.elements)()),
            Self::Iterable(iterable) if index == 0 => (iterable.element)(),
            Self::Union(union) => TypeInfo::union_of(
                union
                    .collect()
                    .iter()
                    .filter_map(|member| match member {
                        TypeInfo::Class(class) => class.param_type(index),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Element type produced by `for..of`/spread iteration.
    pub fn iterate_type(&self) -> Option<TypeInfo> {
        match self {
            Self::String => Some(TypeInfo::string()),
            Self::Array(array) => array.element_union(),
            Self::Set(set) => union_of_elements(&(set.elements)()),
            Self::Map(map) => Some(map.entry_tuple()),
            Self::Iterable(iterable) => (iterable.element)(),
            Self::Union(union) => TypeInfo::union_of(
                union
                    .collect()
                    .iter()
                    .filter_map(|member| member.iterate_type())
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn return_type(&self, ctx: &CallContext<'_>) -> Option<TypeInfo> {
        match self {
            Self::Function(function) => function.resolve(ctx),
            Self::Union(union) => TypeInfo::union_of(
                union
                    .collect()
                    .iter()
                    .filter_map(|member| match member {
                        TypeInfo::Class(class) => class.return_type(ctx),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn equals(&self, other: &TypeClass) -> bool {
        match (self, other) {
            (Self::String, Self::String)
            | (Self::Number, Self::Number)
            | (Self::Boolean, Self::Boolean)
            | (Self::BigInt, Self::BigInt)
            | (Self::RegExp, Self::RegExp) => true,
            (Self::Array(a), Self::Array(b)) => a.equals(b),
            (Self::Object(a), Self::Object(b)) => a.equals(b),
            (Self::Map(a), Self::Map(b)) => {
                option_equals(&union_of_elements(&(a.keys)()), &union_of_elements(&(b.keys)()))
                    && option_equals(
                        &union_of_elements(&(a.values)()),
                        &union_of_elements(&(b.values)()),
                    )
            }
            (Self::Set(a), Self::Set(b)) => option_equals(
                &union_of_elements(&(a.elements)()),
                &union_of_elements(&(b.elements)()),
            ),
            (Self::Function(a), Self::Function(b)) => a.same_resolver(b),
            (Self::Iterable(a), Self::Iterable(b)) => option_equals(&(a.element)(), &(b.element)()),
            (Self::Union(a), Self::Union(b)) => {
                let left = a.collect();
                let right = b.collect();
                left.len() == right.len()
                    && left
                        .iter()
                        .all(|member| right.iter().any(|other| member.equals(other)))
            }
            _ => false,
        }
    }
}

impl ArrayType {
    pub fn new(elements: ElementGen, maybe_tuple: bool) -> Self {
        Self {
            elements,
            maybe_tuple,
        }
    }

    pub fn maybe_tuple(&self) -> bool {
        self.maybe_tuple
    }

    /// The single element type when the generator yields one distinct type,
    /// else the union of all yielded types.
    pub fn element_union(&self) -> Option<TypeInfo> {
        union_of_elements(&(self.elements)())
    }

    /// Positional access. Tuple-positional only when `maybe_tuple` is set;
    /// otherwise every index degrades to the element union.
    pub fn at(&self, index: usize) -> Option<TypeInfo> {
        if self.maybe_tuple {
            (self.elements)().get(index).cloned().flatten()
        } else {
            self.element_union()
        }
    }

    fn equals(&self, other: &ArrayType) -> bool {
        if self.maybe_tuple != other.maybe_tuple {
            return false;
        }
        if self.maybe_tuple {
            let left = (self.elements)();
            let right = (other.elements)();
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(a, b)| option_equals(a, b))
        } else {
            option_equals(&self.element_union(), &other.element_union())
        }
    }
}

impl ObjectType {
    pub fn new(properties: PropertyGen) -> Self {
        Self { properties }
    }

    /// Object from properties in *declaration order*; the generator yields
    /// them reversed so the first match is the last write.
    pub fn from_declarations(pairs: Vec<(String, TypeInfo)>) -> Self {
        Self::new(Rc::new(move || {
            pairs
                .iter()
                .rev()
                .map(|(name, ty)| PropEntry::Known(name.clone(), ty.clone().into_thunk()))
                .collect()
        }))
    }

    /// First-match scan. Outer `None` = property not declared (prototype
    /// lookup may proceed); `Some(None)` = declared but unknowable.
    pub fn own_property(&self, name: &str) -> Option<Option<TypeInfo>> {
        for entry in (self.properties)() {
            match entry {
                PropEntry::Known(prop, thunk) => {
                    if prop == name {
                        return Some(thunk());
                    }
                }
                PropEntry::Opaque => return Some(None),
            }
        }
        None
    }

    pub fn entries(&self) -> Vec<PropEntry> {
        (self.properties)()
    }

    /// Effective property map: name -> type of the last write, stopping at
    /// the first opaque spread.
    fn effective(&self) -> (BTreeMap<String, Option<TypeInfo>>, bool) {
        let mut map = BTreeMap::new();
        for entry in (self.properties)() {
            match entry {
                PropEntry::Known(name, thunk) => {
                    map.entry(name).or_insert_with(|| thunk());
                }
                PropEntry::Opaque => return (map, true),
            }
        }
        (map, false)
    }

    fn equals(&self, other: &ObjectType) -> bool {
        let (left, left_opaque) = self.effective();
        let (right, right_opaque) = other.effective();
        if left_opaque != right_opaque || left.len() != right.len() {
            return false;
        }
        left.iter().all(|(name, ty)| {
            right
                .get(name)
                .is_some_and(|other_ty| option_equals(ty, other_ty))
        })
    }
}

impl MapType {
    pub fn key_union(&self) -> Option<TypeInfo> {
        union_of_elements(&(self.keys)())
    }

    pub fn value_union(&self) -> Option<TypeInfo> {
        union_of_elements(&(self.values)())
    }

    /// The `[key, value]` pair produced by map iteration.
    fn entry_tuple(&self) -> TypeInfo {
        let key = self.key_union();
        let value = self.value_union();
        TypeInfo::array(Rc::new(move || vec![key.clone(), value.clone()]), true)
    }
}

impl SetType {
    pub fn element_union(&self) -> Option<TypeInfo> {
        union_of_elements(&(self.elements)())
    }
}

impl IterableType {
    pub fn element_type(&self) -> Option<TypeInfo> {
        (self.element)()
    }
}

impl FunctionType {
    pub fn resolve(&self, ctx: &CallContext<'_>) -> Option<TypeInfo> {
        match &self.resolver {
            FunctionResolver::Static(resolver) => resolver(ctx),
            FunctionResolver::Dynamic(resolver) => resolver(ctx),
        }
    }

    /// Resolver identity. Structural comparison of behavior is undecidable,
    /// so functions are equal only when they share the same resolver.
    fn same_resolver(&self, other: &FunctionType) -> bool {
        match (&self.resolver, &other.resolver) {
            (FunctionResolver::Static(a), FunctionResolver::Static(b)) => {
                std::ptr::eq(*a as *const (), *b as *const ())
            }
            (FunctionResolver::Dynamic(a), FunctionResolver::Dynamic(b)) => {
                Rc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl UnionType {
    pub fn new(members: MemberGen) -> Self {
        Self { members }
    }

    /// Flattened, deduplicated members. Re-runs the generator each call.
    pub fn collect(&self) -> Vec<TypeInfo> {
        let mut out: Vec<TypeInfo> = Vec::new();
        let mut pending = (self.members)();
        pending.reverse();
        while let Some(member) = pending.pop() {
            if let TypeInfo::Class(TypeClass::Union(inner)) = &member {
                let mut inner_members = (inner.members)();
                inner_members.reverse();
                pending.extend(inner_members);
                continue;
            }
            if !out.iter().any(|existing| existing.equals(&member)) {
                out.push(member);
            }
        }
        out
    }
}

/// Accumulates union members with flattening and deduplication.
#[derive(Default)]
pub struct UnionCollector {
    members: Vec<TypeInfo>,
}

impl UnionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, member: TypeInfo) {
        if let TypeInfo::Class(TypeClass::Union(union)) = &member {
            for inner in union.collect() {
                self.add(inner);
            }
            return;
        }
        if !self.members.iter().any(|existing| existing.equals(&member)) {
            self.members.push(member);
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn build(self) -> Option<TypeInfo> {
        match self.members.len() {
            0 => None,
            1 => self.members.into_iter().next(),
            _ => {
                let members = self.members;
                Some(TypeInfo::Class(TypeClass::Union(UnionType::new(Rc::new(
                    move || members.clone(),
                )))))
            }
        }
    }
}

fn union_of_elements(elements: &[Option<TypeInfo>]) -> Option<TypeInfo> {
    TypeInfo::union_of(elements.iter().flatten().cloned().collect())
}

fn option_equals(a: &Option<TypeInfo>, b: &Option<TypeInfo>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.equals(b),
        (None, None) => true,
        _ => false,
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.type_names().join(" | "))
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_names().join(" | "))
    }
}

impl fmt::Debug for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeClass({})", self.type_names().join(" | "))
    }
}
