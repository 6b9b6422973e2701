//! Immutable registries for built-in prototype members, factory statics,
//! and unresolved-global bindings.
//!
//! Tables are lazily initialized once per process and never mutated
//! afterwards. Entries are plain type constructors or `fn`-pointer
//! resolvers, so the tables stay `Sync` while instantiated types stay
//! single-threaded.

use std::collections::HashMap;
use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::core::types::{
    CallContext, GlobalObject, StaticResolver, TypeClass, TypeInfo, TypeThunk,
};

/// One member of a built-in table: a data property or a method.
#[derive(Clone, Copy)]
enum Member {
    Prop(fn() -> TypeInfo),
    Method(StaticResolver),
}

type Table = HashMap<&'static str, Member>;

fn instantiate(member: &Member) -> TypeInfo {
    match member {
        Member::Prop(make) => make(),
        Member::Method(resolver) => TypeInfo::function_static(*resolver),
    }
}

fn lookup(table: &Table, name: &str) -> Option<TypeInfo> {
    table.get(name).map(instantiate)
}

// ---------------------------------------------------------------------------
// Resolver building blocks

fn ret_string(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::string())
}

fn ret_number(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::number())
}

fn ret_boolean(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::boolean())
}

fn ret_bigint(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::bigint())
}

fn ret_undefined(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::Undefined)
}

fn ret_unknown(_: &CallContext<'_>) -> Option<TypeInfo> {
    None
}

fn ret_string_array(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::array_of(TypeInfo::string()))
}

fn ret_array_unknown(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::array_unknown())
}

/// The receiver itself (`fill`, `sort`, `Map.set`, `Set.add`, ...).
fn ret_receiver(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    ctx.this_type()
}

fn receiver_class(ctx: &CallContext<'_>) -> Option<TypeClass> {
    match ctx.this_type() {
        Some(TypeInfo::Class(class)) => Some(class),
        _ => None,
    }
}

/// Element type of the receiver collection (`pop`, `find`, `at`, ...).
fn ret_receiver_element(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    receiver_class(ctx)?.param_type(0)
}

/// Fresh array over the receiver's element type (`slice`, `filter`,
/// `reverse`, `concat`). Positional information does not survive, so the
/// result is never a tuple.
fn ret_receiver_element_array(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    let element = receiver_class(ctx)?.param_type(0);
    Some(TypeInfo::array(
        Rc::new(move || vec![element.clone()]),
        false,
    ))
}

fn ret_receiver_element_iterable(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    let element = receiver_class(ctx)?.param_type(0);
    Some(TypeInfo::iterable(Rc::new(move || element.clone())))
}

fn ret_number_iterable(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::iterable_of(TypeInfo::number()))
}

/// `Map.prototype.get`: the receiver map's value union.
fn ret_map_value(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    match receiver_class(ctx)? {
        TypeClass::Map(map) => map.value_union(),
        _ => None,
    }
}

fn ret_map_key_iterable(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    match receiver_class(ctx)? {
        TypeClass::Map(map) => {
            let key = map.key_union();
            Some(TypeInfo::iterable(Rc::new(move || key.clone())))
        }
        _ => None,
    }
}

fn ret_map_value_iterable(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    match receiver_class(ctx)? {
        TypeClass::Map(map) => {
            let value = map.value_union();
            Some(TypeInfo::iterable(Rc::new(move || value.clone())))
        }
        _ => None,
    }
}

/// Iteration entries of the receiver (`Map.entries`, `Set.entries`).
fn ret_receiver_entry_iterable(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    let entry = receiver_class(ctx)?.iterate_type();
    Some(TypeInfo::iterable(Rc::new(move || entry.clone())))
}

/// `Array.from(iterable)`: array of the argument's iteration type.
fn ret_array_from_arg(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    let element = ctx.arg_type(0).and_then(|ty| ty.iterate_type());
    Some(TypeInfo::array(
        Rc::new(move || vec![element.clone()]),
        false,
    ))
}

/// `Array.of(...)`: tuple of the argument types.
fn ret_array_of_args(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    let thunks: Vec<TypeThunk> = ctx.args.to_vec();
    Some(TypeInfo::array(
        Rc::new(move || thunks.iter().map(|thunk| thunk()).collect()),
        true,
    ))
}

/// Identity passthrough of the first argument (`Object.freeze`).
fn ret_arg0(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    ctx.arg_type(0)
}

fn ret_object_opaque(_: &CallContext<'_>) -> Option<TypeInfo> {
    Some(TypeInfo::object_opaque())
}

/// `Function.prototype.call`: the receiver function invoked with the
/// argument list shifted past the explicit `this`.
fn ret_fn_call(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    match receiver_class(ctx)? {
        TypeClass::Function(_) => {
            let inner = ctx.this_type()?;
            let shifted_this = ctx.args.first().cloned();
            let rest: Vec<TypeThunk> = ctx.args.iter().skip(1).cloned().collect();
            inner.return_type(shifted_this.as_ref(), &rest, ctx.meta)
        }
        _ => None,
    }
}

/// `Function.prototype.apply`: argument types are packed in an array the
/// engine does not unpack, so only the shifted receiver survives.
fn ret_fn_apply(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    match receiver_class(ctx)? {
        TypeClass::Function(_) => {
            let inner = ctx.this_type()?;
            let shifted_this = ctx.args.first().cloned();
            inner.return_type(shifted_this.as_ref(), &[], ctx.meta)
        }
        _ => None,
    }
}

/// `Function.prototype.bind`: a function forwarding to the receiver with
/// the bound `this`.
fn ret_fn_bind(ctx: &CallContext<'_>) -> Option<TypeInfo> {
    let inner = ctx.this_type()?;
    if !matches!(inner, TypeInfo::Class(TypeClass::Function(_))) {
        return None;
    }
    let bound_this: Option<TypeThunk> = ctx.args.first().cloned();
    Some(TypeInfo::function_dynamic(Rc::new(
        move |call: &CallContext<'_>| {
            inner.return_type(bound_this.as_ref(), call.args, call.meta)
        },
    )))
}

// ---------------------------------------------------------------------------
// Prototype tables

fn string_members() -> Table {
    let mut t = Table::new();
    t.insert("length", Member::Prop(TypeInfo::number));
    for name in [
        "at",
        "charAt",
        "concat",
        "normalize",
        "padEnd",
        "padStart",
        "repeat",
        "replace",
        "replaceAll",
        "slice",
        "substr",
        "substring",
        "toLocaleLowerCase",
        "toLocaleUpperCase",
        "toLowerCase",
        "toString",
        "toUpperCase",
        "trim",
        "trimEnd",
        "trimStart",
        "valueOf",
    ] {
        t.insert(name, Member::Method(ret_string));
    }
    for name in [
        "charCodeAt",
        "codePointAt",
        "indexOf",
        "lastIndexOf",
        "localeCompare",
        "search",
    ] {
        t.insert(name, Member::Method(ret_number));
    }
    for name in ["endsWith", "includes", "startsWith"] {
        t.insert(name, Member::Method(ret_boolean));
    }
    t.insert("split", Member::Method(ret_string_array));
    // match/matchAll answers depend on the pattern; left unknown.
    t.insert("match", Member::Method(ret_unknown));
    t.insert("matchAll", Member::Method(ret_unknown));
    t
}

fn number_members() -> Table {
    let mut t = Table::new();
    for name in [
        "toExponential",
        "toFixed",
        "toLocaleString",
        "toPrecision",
        "toString",
    ] {
        t.insert(name, Member::Method(ret_string));
    }
    t.insert("valueOf", Member::Method(ret_number));
    t
}

fn boolean_members() -> Table {
    let mut t = Table::new();
    t.insert("toString", Member::Method(ret_string));
    t.insert("valueOf", Member::Method(ret_boolean));
    t
}

fn bigint_members() -> Table {
    let mut t = Table::new();
    t.insert("toLocaleString", Member::Method(ret_string));
    t.insert("toString", Member::Method(ret_string));
    t.insert("valueOf", Member::Method(ret_bigint));
    t
}

fn regexp_members() -> Table {
    let mut t = Table::new();
    t.insert("flags", Member::Prop(TypeInfo::string));
    t.insert("source", Member::Prop(TypeInfo::string));
    t.insert("lastIndex", Member::Prop(TypeInfo::number));
    for name in [
        "dotAll",
        "global",
        "hasIndices",
        "ignoreCase",
        "multiline",
        "sticky",
        "unicode",
        "unicodeSets",
    ] {
        t.insert(name, Member::Prop(TypeInfo::boolean));
    }
    t.insert("test", Member::Method(ret_boolean));
    // exec yields an array or null; too lossy to commit to either.
    t.insert("exec", Member::Method(ret_unknown));
    t.insert("toString", Member::Method(ret_string));
    t
}

fn array_members() -> Table {
    let mut t = Table::new();
    t.insert("length", Member::Prop(TypeInfo::number));
    for name in ["join", "toString", "toLocaleString"] {
        t.insert(name, Member::Method(ret_string));
    }
    for name in ["indexOf", "lastIndexOf", "findIndex", "findLastIndex", "push", "unshift"] {
        t.insert(name, Member::Method(ret_number));
    }
    for name in ["every", "includes", "some"] {
        t.insert(name, Member::Method(ret_boolean));
    }
    for name in [
        "concat",
        "filter",
        "reverse",
        "slice",
        "sort",
        "splice",
        "toReversed",
        "toSorted",
    ] {
        t.insert(name, Member::Method(ret_receiver_element_array));
    }
    for name in ["at", "find", "findLast", "pop", "shift"] {
        t.insert(name, Member::Method(ret_receiver_element));
    }
    for name in ["copyWithin", "fill"] {
        t.insert(name, Member::Method(ret_receiver));
    }
    t.insert("values", Member::Method(ret_receiver_element_iterable));
    t.insert("keys", Member::Method(ret_number_iterable));
    t.insert("entries", Member::Method(ret_receiver_entry_iterable));
    t.insert("forEach", Member::Method(ret_undefined));
    // callback-shaped results the engine does not model
    for name in ["flat", "flatMap", "map"] {
        t.insert(name, Member::Method(ret_array_unknown));
    }
    for name in ["reduce", "reduceRight"] {
        t.insert(name, Member::Method(ret_unknown));
    }
    t
}

fn object_members() -> Table {
    let mut t = Table::new();
    t.insert("toString", Member::Method(ret_string));
    t.insert("toLocaleString", Member::Method(ret_string));
    t.insert("hasOwnProperty", Member::Method(ret_boolean));
    t.insert("isPrototypeOf", Member::Method(ret_boolean));
    t.insert("propertyIsEnumerable", Member::Method(ret_boolean));
    t.insert("valueOf", Member::Method(ret_unknown));
    t
}

fn map_members() -> Table {
    let mut t = Table::new();
    t.insert("size", Member::Prop(TypeInfo::number));
    t.insert("get", Member::Method(ret_map_value));
    t.insert("has", Member::Method(ret_boolean));
    t.insert("delete", Member::Method(ret_boolean));
    t.insert("set", Member::Method(ret_receiver));
    t.insert("clear", Member::Method(ret_undefined));
    t.insert("forEach", Member::Method(ret_undefined));
    t.insert("keys", Member::Method(ret_map_key_iterable));
    t.insert("values", Member::Method(ret_map_value_iterable));
    t.insert("entries", Member::Method(ret_receiver_entry_iterable));
    t
}

fn set_members() -> Table {
    let mut t = Table::new();
    t.insert("size", Member::Prop(TypeInfo::number));
    t.insert("add", Member::Method(ret_receiver));
    t.insert("has", Member::Method(ret_boolean));
    t.insert("delete", Member::Method(ret_boolean));
    t.insert("clear", Member::Method(ret_undefined));
    t.insert("forEach", Member::Method(ret_undefined));
    t.insert("keys", Member::Method(ret_receiver_element_iterable));
    t.insert("values", Member::Method(ret_receiver_element_iterable));
    t.insert("entries", Member::Method(ret_receiver_entry_iterable));
    t
}

fn function_members() -> Table {
    let mut t = Table::new();
    t.insert("name", Member::Prop(TypeInfo::string));
    t.insert("length", Member::Prop(TypeInfo::number));
    t.insert("toString", Member::Method(ret_string));
    t.insert("call", Member::Method(ret_fn_call));
    t.insert("apply", Member::Method(ret_fn_apply));
    t.insert("bind", Member::Method(ret_fn_bind));
    t
}

static STRING_PROTO: Lazy<Table> = Lazy::new(string_members);
static NUMBER_PROTO: Lazy<Table> = Lazy::new(number_members);
static BOOLEAN_PROTO: Lazy<Table> = Lazy::new(boolean_members);
static BIGINT_PROTO: Lazy<Table> = Lazy::new(bigint_members);
static REGEXP_PROTO: Lazy<Table> = Lazy::new(regexp_members);
static ARRAY_PROTO: Lazy<Table> = Lazy::new(array_members);
static OBJECT_PROTO: Lazy<Table> = Lazy::new(object_members);
static MAP_PROTO: Lazy<Table> = Lazy::new(map_members);
static SET_PROTO: Lazy<Table> = Lazy::new(set_members);
static FUNCTION_PROTO: Lazy<Table> = Lazy::new(function_members);

pub fn string_proto(name: &str) -> Option<TypeInfo> {
    lookup(&STRING_PROTO, name)
}

pub fn number_proto(name: &str) -> Option<TypeInfo> {
    lookup(&NUMBER_PROTO, name)
}

pub fn boolean_proto(name: &str) -> Option<TypeInfo> {
    lookup(&BOOLEAN_PROTO, name)
}

pub fn bigint_proto(name: &str) -> Option<TypeInfo> {
    lookup(&BIGINT_PROTO, name)
}

pub fn regexp_proto(name: &str) -> Option<TypeInfo> {
    lookup(&REGEXP_PROTO, name).or_else(|| lookup(&OBJECT_PROTO, name))
}

pub fn array_proto(name: &str) -> Option<TypeInfo> {
    lookup(&ARRAY_PROTO, name)
}

pub fn object_proto(name: &str) -> Option<TypeInfo> {
    lookup(&OBJECT_PROTO, name)
}

pub fn map_proto(name: &str) -> Option<TypeInfo> {
    lookup(&MAP_PROTO, name).or_else(|| lookup(&OBJECT_PROTO, name))
}

pub fn set_proto(name: &str) -> Option<TypeInfo> {
    lookup(&SET_PROTO, name).or_else(|| lookup(&OBJECT_PROTO, name))
}

pub fn function_proto(name: &str) -> Option<TypeInfo> {
    lookup(&FUNCTION_PROTO, name).or_else(|| lookup(&OBJECT_PROTO, name))
}

// ---------------------------------------------------------------------------
// Factory statics

fn string_statics() -> Table {
    let mut t = Table::new();
    for name in ["fromCharCode", "fromCodePoint", "raw"] {
        t.insert(name, Member::Method(ret_string));
    }
    t
}

fn number_statics() -> Table {
    let mut t = Table::new();
    for name in ["isFinite", "isInteger", "isNaN", "isSafeInteger"] {
        t.insert(name, Member::Method(ret_boolean));
    }
    for name in ["parseFloat", "parseInt"] {
        t.insert(name, Member::Method(ret_number));
    }
    for name in [
        "EPSILON",
        "MAX_SAFE_INTEGER",
        "MAX_VALUE",
        "MIN_SAFE_INTEGER",
        "MIN_VALUE",
        "NaN",
        "NEGATIVE_INFINITY",
        "POSITIVE_INFINITY",
    ] {
        t.insert(name, Member::Prop(TypeInfo::number));
    }
    t
}

fn bigint_statics() -> Table {
    let mut t = Table::new();
    t.insert("asIntN", Member::Method(ret_bigint));
    t.insert("asUintN", Member::Method(ret_bigint));
    t
}

fn array_statics() -> Table {
    let mut t = Table::new();
    t.insert("isArray", Member::Method(ret_boolean));
    t.insert("from", Member::Method(ret_array_from_arg));
    t.insert("of", Member::Method(ret_array_of_args));
    t
}

fn object_statics() -> Table {
    let mut t = Table::new();
    t.insert("keys", Member::Method(ret_string_array));
    t.insert("getOwnPropertyNames", Member::Method(ret_string_array));
    t.insert("values", Member::Method(ret_array_unknown));
    t.insert("entries", Member::Method(ret_array_unknown));
    t.insert("assign", Member::Method(ret_object_opaque));
    t.insert("create", Member::Method(ret_object_opaque));
    t.insert("fromEntries", Member::Method(ret_object_opaque));
    t.insert("freeze", Member::Method(ret_arg0));
    t
}

fn math_members() -> Table {
    let mut t = Table::new();
    for name in ["E", "LN10", "LN2", "LOG10E", "LOG2E", "PI", "SQRT1_2", "SQRT2"] {
        t.insert(name, Member::Prop(TypeInfo::number));
    }
    for name in [
        "abs", "acos", "acosh", "asin", "asinh", "atan", "atan2", "atanh", "cbrt", "ceil",
        "clz32", "cos", "cosh", "exp", "expm1", "floor", "fround", "hypot", "imul", "log",
        "log10", "log1p", "log2", "max", "min", "pow", "random", "round", "sign", "sin",
        "sinh", "sqrt", "tan", "tanh", "trunc",
    ] {
        t.insert(name, Member::Method(ret_number));
    }
    t
}

fn json_members() -> Table {
    let mut t = Table::new();
    t.insert("parse", Member::Method(ret_unknown));
    t.insert("stringify", Member::Method(ret_string));
    t
}

static STRING_STATICS: Lazy<Table> = Lazy::new(string_statics);
static NUMBER_STATICS: Lazy<Table> = Lazy::new(number_statics);
static BIGINT_STATICS: Lazy<Table> = Lazy::new(bigint_statics);
static ARRAY_STATICS: Lazy<Table> = Lazy::new(array_statics);
static OBJECT_STATICS: Lazy<Table> = Lazy::new(object_statics);
static MATH_MEMBERS: Lazy<Table> = Lazy::new(math_members);
static JSON_MEMBERS: Lazy<Table> = Lazy::new(json_members);

/// Static member of a built-in constructor/namespace value.
pub fn factory_member(global: GlobalObject, name: &str) -> Option<TypeInfo> {
    let table = match global {
        GlobalObject::String => &STRING_STATICS,
        GlobalObject::Number => &NUMBER_STATICS,
        GlobalObject::BigInt => &BIGINT_STATICS,
        GlobalObject::Array => &ARRAY_STATICS,
        GlobalObject::Object => &OBJECT_STATICS,
        GlobalObject::Math => &MATH_MEMBERS,
        GlobalObject::Json => &JSON_MEMBERS,
        GlobalObject::Boolean
        | GlobalObject::Symbol
        | GlobalObject::RegExp
        | GlobalObject::Map
        | GlobalObject::Set
        | GlobalObject::Function => return function_proto(name),
    };
    lookup(table, name).or_else(|| function_proto(name))
}

/// Result of invoking a built-in constructor, with or without `new`.
pub fn factory_call(global: GlobalObject, ctx: &CallContext<'_>) -> Option<TypeInfo> {
    match global {
        GlobalObject::String => Some(TypeInfo::string()),
        GlobalObject::Number => Some(TypeInfo::number()),
        GlobalObject::Boolean => Some(TypeInfo::boolean()),
        GlobalObject::BigInt => Some(TypeInfo::bigint()),
        GlobalObject::RegExp => Some(TypeInfo::regexp()),
        // Array(3) preallocates while Array('a') wraps; the distinction is
        // not worth modeling, so elements stay unknown.
        GlobalObject::Array => Some(TypeInfo::array_unknown()),
        GlobalObject::Object => {
            if ctx.args.is_empty() {
                Some(TypeInfo::object_empty())
            } else {
                Some(TypeInfo::object_opaque())
            }
        }
        GlobalObject::Map => Some(TypeInfo::map_unknown()),
        GlobalObject::Set => Some(TypeInfo::set_unknown()),
        GlobalObject::Function => Some(TypeInfo::function_unknown()),
        GlobalObject::Symbol | GlobalObject::Math | GlobalObject::Json => None,
    }
}

// ---------------------------------------------------------------------------
// Globals

fn globals() -> Table {
    fn factory(global: GlobalObject) -> fn() -> TypeInfo {
        // monomorphized per constant through a tiny dispatch table
        match global {
            GlobalObject::String => || TypeInfo::Factory(GlobalObject::String),
            GlobalObject::Number => || TypeInfo::Factory(GlobalObject::Number),
            GlobalObject::Boolean => || TypeInfo::Factory(GlobalObject::Boolean),
            GlobalObject::BigInt => || TypeInfo::Factory(GlobalObject::BigInt),
            GlobalObject::Symbol => || TypeInfo::Factory(GlobalObject::Symbol),
            GlobalObject::RegExp => || TypeInfo::Factory(GlobalObject::RegExp),
            GlobalObject::Array => || TypeInfo::Factory(GlobalObject::Array),
            GlobalObject::Object => || TypeInfo::Factory(GlobalObject::Object),
            GlobalObject::Map => || TypeInfo::Factory(GlobalObject::Map),
            GlobalObject::Set => || TypeInfo::Factory(GlobalObject::Set),
            GlobalObject::Function => || TypeInfo::Factory(GlobalObject::Function),
            GlobalObject::Math => || TypeInfo::Factory(GlobalObject::Math),
            GlobalObject::Json => || TypeInfo::Factory(GlobalObject::Json),
        }
    }

    let mut t = Table::new();
    t.insert("undefined", Member::Prop(|| TypeInfo::Undefined));
    t.insert("NaN", Member::Prop(TypeInfo::number));
    t.insert("Infinity", Member::Prop(TypeInfo::number));
    t.insert("isNaN", Member::Method(ret_boolean));
    t.insert("isFinite", Member::Method(ret_boolean));
    t.insert("parseInt", Member::Method(ret_number));
    t.insert("parseFloat", Member::Method(ret_number));
    for name in ["decodeURI", "decodeURIComponent", "encodeURI", "encodeURIComponent"] {
        t.insert(name, Member::Method(ret_string));
    }
    for global in [
        GlobalObject::String,
        GlobalObject::Number,
        GlobalObject::Boolean,
        GlobalObject::BigInt,
        GlobalObject::Symbol,
        GlobalObject::RegExp,
        GlobalObject::Array,
        GlobalObject::Object,
        GlobalObject::Map,
        GlobalObject::Set,
        GlobalObject::Function,
        GlobalObject::Math,
        GlobalObject::Json,
    ] {
        t.insert(global.name(), Member::Prop(factory(global)));
    }
    t
}

static GLOBALS: Lazy<Table> = Lazy::new(globals);

/// Fixed binding table for identifiers that resolve to no declaration.
pub fn global_binding(name: &str) -> Option<TypeInfo> {
    lookup(&GLOBALS, name)
}

/// Instance type produced by `x instanceof C` when `C` is a tracked global.
pub fn instance_type(global: GlobalObject) -> Option<TypeInfo> {
    match global {
        GlobalObject::String => Some(TypeInfo::string()),
        GlobalObject::Number => Some(TypeInfo::number()),
        GlobalObject::Boolean => Some(TypeInfo::boolean()),
        GlobalObject::BigInt => Some(TypeInfo::bigint()),
        GlobalObject::RegExp => Some(TypeInfo::regexp()),
        GlobalObject::Array => Some(TypeInfo::array_unknown()),
        GlobalObject::Object => Some(TypeInfo::object_opaque()),
        GlobalObject::Map => Some(TypeInfo::map_unknown()),
        GlobalObject::Set => Some(TypeInfo::set_unknown()),
        GlobalObject::Function => Some(TypeInfo::function_unknown()),
        GlobalObject::Symbol | GlobalObject::Math | GlobalObject::Json => None,
    }
}
