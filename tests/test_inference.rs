use std::collections::HashMap;
use std::rc::Rc;

use typetrack::analysis::oracle::OracleType;
use typetrack::ast::node::DeclKind;
use typetrack::ast::{BinaryOp, NodeId, TreeBuilder};
use typetrack::{TypeOracle, TypeTracker};

fn tracker(tree: typetrack::SyntaxTree) -> TypeTracker {
    TypeTracker::new(Rc::new(tree))
}

#[test]
fn test_literal_soundness() {
    let mut b = TreeBuilder::new();
    let s = b.string("abc");
    let n = b.bigint("123");
    let r = b.regex("x", "");
    let null = b.null();
    let num = b.number(1.5);
    let bool_lit = b.boolean(true);
    let stmts: Vec<NodeId> = [s, n, r, null, num, bool_lit]
        .iter()
        .map(|&e| b.expr_stmt(e))
        .collect();
    let t = tracker(b.program(stmts));

    assert_eq!(t.get_types(s), ["String"]);
    assert_eq!(t.get_types(n), ["BigInt"]);
    assert_eq!(t.get_types(r), ["RegExp"]);
    assert_eq!(t.get_types(null), ["null"]);
    assert_eq!(t.get_types(num), ["Number"]);
    assert_eq!(t.get_types(bool_lit), ["Boolean"]);
    assert!(t.is_string(s));
    assert!(t.is_regexp(r));
}

#[test]
fn test_template_literal_is_string() {
    let mut b = TreeBuilder::new();
    let x = b.ident("x");
    let template = b.template(&["a", "b"], vec![x]);
    let stmt = b.expr_stmt(template);
    let t = tracker(b.program(vec![stmt]));

    assert!(t.is_string(template));
}

#[test]
fn test_repeated_queries_idempotent() {
    let mut b = TreeBuilder::new();
    let lit = b.string("x");
    let decl = b.const_decl("a", lit);
    let a = b.ident("a");
    let stmt = b.expr_stmt(a);
    let t = tracker(b.program(vec![decl, stmt]));

    let first = t.get_types(a);
    let second = t.get_types(a);
    let third = t.get_types(a);
    assert_eq!(first, ["String"]);
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_query_order_independence() {
    let build = || {
        let mut b = TreeBuilder::new();
        let lit = b.string("x");
        let decl = b.const_decl("a", lit);
        let a = b.ident("a");
        let len = b.member(a, "length");
        let stmt = b.expr_stmt(len);
        let n = b.number(1.0);
        let neg = b.unary(typetrack::ast::UnaryOp::Minus, n);
        let stmt2 = b.expr_stmt(neg);
        (b.program(vec![decl, stmt, stmt2]), a, len, neg)
    };

    let (tree, a, len, neg) = build();
    let t1 = tracker(tree);
    let forward = (t1.get_types(a), t1.get_types(len), t1.get_types(neg));

    let (tree, a, len, neg) = build();
    let t2 = tracker(tree);
    let reverse = (t2.get_types(neg), t2.get_types(len), t2.get_types(a));

    assert_eq!(forward.0, reverse.2);
    assert_eq!(forward.1, reverse.1);
    assert_eq!(forward.2, reverse.0);
}

#[test]
fn test_const_string_member_length() {
    // const a = 'x'; a.length
    let mut b = TreeBuilder::new();
    let lit = b.string("x");
    let decl = b.const_decl("a", lit);
    let a = b.ident("a");
    let len = b.member(a, "length");
    let stmt = b.expr_stmt(len);
    let t = tracker(b.program(vec![decl, stmt]));

    assert_eq!(t.get_types(len), ["Number"]);
}

#[test]
fn test_new_regexp_test_is_boolean() {
    // new RegExp('a').test(x)
    let mut b = TreeBuilder::new();
    let regexp = b.ident("RegExp");
    let pattern = b.string("a");
    let instance = b.new_expr(regexp, vec![pattern]);
    let test_fn = b.member(instance, "test");
    let x = b.ident("x");
    let call = b.call(test_fn, vec![x]);
    let stmt = b.expr_stmt(call);
    let t = tracker(b.program(vec![stmt]));

    assert_eq!(t.get_types(instance), ["RegExp"]);
    assert_eq!(t.get_types(call), ["Boolean"]);
}

#[test]
fn test_branch_merge_union_sorted_either_order() {
    // cond ? 'a' : 1  and  cond ? 1 : 'a'
    let mut b = TreeBuilder::new();
    let cond1 = b.ident("cond");
    let s1 = b.string("a");
    let n1 = b.number(1.0);
    let first = b.conditional(cond1, s1, n1);
    let stmt1 = b.expr_stmt(first);

    let cond2 = b.ident("cond");
    let n2 = b.number(1.0);
    let s2 = b.string("a");
    let second = b.conditional(cond2, n2, s2);
    let stmt2 = b.expr_stmt(second);

    let t = tracker(b.program(vec![stmt1, stmt2]));
    assert_eq!(t.get_types(first), ["Number", "String"]);
    assert_eq!(t.get_types(second), ["Number", "String"]);
}

#[test]
fn test_unknown_propagation() {
    let mut b = TreeBuilder::new();
    // unresolved identifier
    let unresolved = b.ident("mystery");
    let stmt1 = b.expr_stmt(unresolved);
    // call to an unresolved function
    let callee = b.ident("Unknown");
    let call = b.call(callee, vec![]);
    let stmt2 = b.expr_stmt(call);
    // class expression value
    let class = b.class_expr(Some("C"));
    let stmt3 = b.expr_stmt(class);

    let t = tracker(b.program(vec![stmt1, stmt2, stmt3]));
    assert_eq!(t.get_types(unresolved), Vec::<String>::new());
    assert_eq!(t.get_types(call), Vec::<String>::new());
    assert_eq!(t.get_types(class), Vec::<String>::new());
    assert!(t.maybe_string(call));
    assert!(!t.is_string(call));
}

#[test]
fn test_spread_last_write_wins() {
    // const o = { a: 1 }; const o2 = { ...o, a: 's' }; o2.a
    let mut b = TreeBuilder::new();
    let one = b.number(1.0);
    let o_lit = b.object_of(vec![("a", one)]);
    let o_decl = b.const_decl("o", o_lit);

    let o_ref = b.ident("o");
    let s = b.string("s");
    let o2_lit = b.object(vec![
        typetrack::ast::ObjectProperty::Spread(o_ref),
        TreeBuilder::prop("a", s),
    ]);
    let o2_decl = b.const_decl("o2", o2_lit);

    let o2_ref = b.ident("o2");
    let access = b.member(o2_ref, "a");
    let stmt = b.expr_stmt(access);
    let t = tracker(b.program(vec![o_decl, o2_decl, stmt]));

    assert_eq!(t.get_types(access), ["String"]);
}

#[test]
fn test_spread_does_not_override_later_write() {
    // const o = { a: 1 }; const o3 = { a: 's', ...o }; o3.a
    let mut b = TreeBuilder::new();
    let one = b.number(1.0);
    let o_lit = b.object_of(vec![("a", one)]);
    let o_decl = b.const_decl("o", o_lit);

    let s = b.string("s");
    let o_ref = b.ident("o");
    let o3_lit = b.object(vec![
        TreeBuilder::prop("a", s),
        typetrack::ast::ObjectProperty::Spread(o_ref),
    ]);
    let o3_decl = b.const_decl("o3", o3_lit);

    let o3_ref = b.ident("o3");
    let access = b.member(o3_ref, "a");
    let stmt = b.expr_stmt(access);
    let t = tracker(b.program(vec![o_decl, o3_decl, stmt]));

    // the spread re-declares `a`, so the last write is the spread's value
    assert_eq!(t.get_types(access), ["Number"]);
}

#[test]
fn test_operator_tables() {
    let mut b = TreeBuilder::new();
    let a1 = b.string("a");
    let n1 = b.number(1.0);
    let concat = b.binary(BinaryOp::Add, a1, n1);
    let s1 = b.expr_stmt(concat);

    let n2 = b.number(1.0);
    let n3 = b.number(2.0);
    let sum = b.binary(BinaryOp::Add, n2, n3);
    let s2 = b.expr_stmt(sum);

    let big1 = b.bigint("1");
    let big2 = b.bigint("2");
    let big_sum = b.binary(BinaryOp::Add, big1, big2);
    let s3 = b.expr_stmt(big_sum);

    let x1 = b.ident("x");
    let y1 = b.ident("y");
    let cmp = b.binary(BinaryOp::Lt, x1, y1);
    let s4 = b.expr_stmt(cmp);

    let x2 = b.ident("x");
    let y2 = b.ident("y");
    let diff = b.binary(BinaryOp::Sub, x2, y2);
    let s5 = b.expr_stmt(diff);

    let x3 = b.ident("x");
    let unknown_add = {
        let y3 = b.ident("y");
        b.binary(BinaryOp::Add, x3, y3)
    };
    let s6 = b.expr_stmt(unknown_add);

    let x4 = b.ident("x");
    let type_of = b.typeof_(x4);
    let s7 = b.expr_stmt(type_of);

    let t = tracker(b.program(vec![s1, s2, s3, s4, s5, s6, s7]));
    assert_eq!(t.get_types(concat), ["String"]);
    assert_eq!(t.get_types(sum), ["Number"]);
    assert_eq!(t.get_types(big_sum), ["BigInt"]);
    assert_eq!(t.get_types(cmp), ["Boolean"]);
    assert_eq!(t.get_types(diff), ["Number"]);
    // + over unknowns could concatenate; stays unknown
    assert_eq!(t.get_types(unknown_add), Vec::<String>::new());
    assert_eq!(t.get_types(type_of), ["String"]);
}

#[test]
fn test_for_of_and_for_in_bindings() {
    // const xs = ['a']; for (const x of xs) { x } for (const k in o) { k }
    let mut b = TreeBuilder::new();
    let lit = b.string("a");
    let arr = b.array_of(vec![lit]);
    let xs_decl = b.const_decl("xs", arr);

    let x_use = b.ident("x");
    let x_stmt = b.expr_stmt(x_use);
    let of_body = b.block(vec![x_stmt]);
    let xs_ref = b.ident("xs");
    let for_of = b.for_of("x", xs_ref, of_body);

    let k_use = b.ident("k");
    let k_stmt = b.expr_stmt(k_use);
    let in_body = b.block(vec![k_stmt]);
    let obj = b.ident("someObject");
    let for_in = b.for_in("k", obj, in_body);

    let t = tracker(b.program(vec![xs_decl, for_of, for_in]));
    assert_eq!(t.get_types(x_use), ["String"]);
    assert_eq!(t.get_types(k_use), ["String"]);
}

#[test]
fn test_global_factories_and_statics() {
    let mut b = TreeBuilder::new();
    let math = b.ident("Math");
    let floor = b.member(math, "floor");
    let n = b.number(1.5);
    let floor_call = b.call(floor, vec![n]);
    let s1 = b.expr_stmt(floor_call);

    let string_factory = b.ident("String");
    let from = b.member(string_factory, "fromCharCode");
    let code = b.number(65.0);
    let from_call = b.call(from, vec![code]);
    let s2 = b.expr_stmt(from_call);

    let json = b.ident("JSON");
    let stringify = b.member(json, "stringify");
    let arg = b.ident("x");
    let json_call = b.call(stringify, vec![arg]);
    let s3 = b.expr_stmt(json_call);

    let string_factory2 = b.ident("String");
    let n2 = b.number(3.0);
    let coerce = b.call(string_factory2, vec![n2]);
    let s4 = b.expr_stmt(coerce);

    let t = tracker(b.program(vec![s1, s2, s3, s4]));
    assert_eq!(t.get_types(floor_call), ["Number"]);
    assert_eq!(t.get_types(from_call), ["String"]);
    assert_eq!(t.get_types(json_call), ["String"]);
    assert_eq!(t.get_types(coerce), ["String"]);
    // the factory value itself is a function, not an instance
    assert_eq!(t.get_types(string_factory), ["Function"]);
}

#[test]
fn test_array_literals_and_methods() {
    // const xs = [1, 2]; xs[0]; xs.join(''); xs.slice()
    let mut b = TreeBuilder::new();
    let n1 = b.number(1.0);
    let n2 = b.number(2.0);
    let arr = b.array_of(vec![n1, n2]);
    let decl = b.const_decl("xs", arr);

    let xs1 = b.ident("xs");
    let zero = b.number(0.0);
    let at0 = b.index(xs1, zero);
    let s1 = b.expr_stmt(at0);

    let xs2 = b.ident("xs");
    let join_fn = b.member(xs2, "join");
    let sep = b.string("");
    let join = b.call(join_fn, vec![sep]);
    let s2 = b.expr_stmt(join);

    let xs3 = b.ident("xs");
    let slice_fn = b.member(xs3, "slice");
    let slice = b.call(slice_fn, vec![]);
    let s3 = b.expr_stmt(slice);

    let t = tracker(b.program(vec![decl, s1, s2, s3]));
    assert_eq!(t.get_types(at0), ["Number"]);
    assert_eq!(t.get_types(join), ["String"]);
    assert_eq!(t.get_types(slice), ["Array"]);
}

#[test]
fn test_let_reassigned_stays_unknown() {
    // let a = 'x'; a = compute(); a
    let mut b = TreeBuilder::new();
    let lit = b.string("x");
    let decl = b.let_decl("a", lit);
    let target = b.ident("a");
    let callee = b.ident("compute");
    let call = b.call(callee, vec![]);
    let assign = b.assign(target, call);
    let assign_stmt = b.expr_stmt(assign);
    let a = b.ident("a");
    let stmt = b.expr_stmt(a);
    let t = tracker(b.program(vec![decl, assign_stmt, stmt]));

    assert_eq!(t.get_types(a), Vec::<String>::new());
}

#[test]
fn test_never_reassigned_let_behaves_like_const() {
    let mut b = TreeBuilder::new();
    let lit = b.string("x");
    let decl = b.let_decl("a", lit);
    let a = b.ident("a");
    let stmt = b.expr_stmt(a);
    let t = tracker(b.program(vec![decl, stmt]));

    assert!(t.is_string(a));
}

#[test]
fn test_cyclic_binding_terminates_unknown() {
    // const a = [a]; a
    let mut b = TreeBuilder::new();
    let inner = b.ident("a");
    let arr = b.array_of(vec![inner]);
    let decl = b.const_decl("a", arr);
    let a = b.ident("a");
    let stmt = b.expr_stmt(a);
    let t = tracker(b.program(vec![decl, stmt]));

    // the outer query resolves to Array; the self-referential element
    // degrades to unknown instead of looping
    assert_eq!(t.get_types(a), ["Array"]);
}

#[test]
fn test_annotations_resolve_params() {
    // function f(s) { s } with `s: string` annotated on the parameter
    let mut b = TreeBuilder::new();
    let param = b.param("s");
    let s_use = b.ident("s");
    let stmt = b.expr_stmt(s_use);
    let body = b.block(vec![stmt]);
    let func = b.function_decl("f", vec![param], body);
    let tree = b.program(vec![func]);

    let mut annotations: HashMap<NodeId, String> = HashMap::new();
    annotations.insert(param, "string".to_string());
    let t = TypeTracker::builder(Rc::new(tree))
        .annotations(Rc::new(annotations))
        .build();

    assert!(t.is_string(s_use));
}

#[test]
fn test_malformed_annotation_degrades_to_unknown() {
    let mut b = TreeBuilder::new();
    let param = b.param("s");
    let s_use = b.ident("s");
    let stmt = b.expr_stmt(s_use);
    let body = b.block(vec![stmt]);
    let func = b.function_decl("f", vec![param], body);
    let tree = b.program(vec![func]);

    let mut annotations: HashMap<NodeId, String> = HashMap::new();
    annotations.insert(param, "definitely not a type!!".to_string());
    let t = TypeTracker::builder(Rc::new(tree))
        .annotations(Rc::new(annotations))
        .build();

    assert_eq!(t.get_types(s_use), Vec::<String>::new());
}

struct FixedOracle {
    answers: HashMap<NodeId, OracleType>,
}

impl TypeOracle for FixedOracle {
    fn classify(&self, node: NodeId) -> Option<OracleType> {
        self.answers.get(&node).cloned()
    }
}

#[test]
fn test_oracle_supersedes_annotations() {
    // the oracle says Number; an annotation says string; oracle wins
    let mut b = TreeBuilder::new();
    let param = b.param("v");
    let v_use = b.ident("v");
    let stmt = b.expr_stmt(v_use);
    let body = b.block(vec![stmt]);
    let func = b.function_decl("f", vec![param], body);
    let tree = b.program(vec![func]);

    let mut annotations: HashMap<NodeId, String> = HashMap::new();
    annotations.insert(param, "string".to_string());
    let mut answers = HashMap::new();
    answers.insert(v_use, OracleType::Number);

    let t = TypeTracker::builder(Rc::new(tree))
        .annotations(Rc::new(annotations))
        .oracle(Rc::new(FixedOracle { answers }))
        .build();

    assert_eq!(t.get_types(v_use), ["Number"]);
    assert!(!t.is_string(v_use));
}

#[test]
fn test_oracle_classifies_otherwise_unknown_node() {
    let mut b = TreeBuilder::new();
    let mystery = b.ident("mystery");
    let stmt = b.expr_stmt(mystery);
    let tree = b.program(vec![stmt]);

    let mut answers = HashMap::new();
    answers.insert(
        mystery,
        OracleType::Union(vec![OracleType::String, OracleType::Null]),
    );
    let t = TypeTracker::builder(Rc::new(tree))
        .oracle(Rc::new(FixedOracle { answers }))
        .build();

    assert_eq!(t.get_types(mystery), ["String", "null"]);
    assert!(t.maybe_string(mystery));
    assert!(!t.is_string(mystery));
}

#[test]
fn test_var_decl_kinds_roundtrip() {
    // a var that is never written behaves like const for inference
    let mut b = TreeBuilder::new();
    let lit = b.regex("ab", "g");
    let d = b.declarator("re", Some(lit));
    let decl = b.var_decl(DeclKind::Var, vec![d]);
    let re = b.ident("re");
    let stmt = b.expr_stmt(re);
    let t = tracker(b.program(vec![decl, stmt]));

    assert!(t.is_regexp(re));
}

#[test]
fn test_logical_value_union() {
    // const v = flag ?? 'x';  -- with flag unknown the value is unknown;
    // 'a' || 'b' unions to String
    let mut b = TreeBuilder::new();
    let a = b.string("a");
    let one = b.number(1.0);
    let or = b.logical(typetrack::ast::LogicalOp::Or, a, one);
    let stmt = b.expr_stmt(or);
    let t = tracker(b.program(vec![stmt]));

    assert_eq!(t.get_types(or), ["Number", "String"]);
}

#[test]
fn test_tostring_fast_path() {
    // anything.toString() is a string, even with an unknown receiver
    let mut b = TreeBuilder::new();
    let mystery = b.ident("mystery");
    let to_string = b.member(mystery, "toString");
    let call = b.call(to_string, vec![]);
    let stmt = b.expr_stmt(call);
    let t = tracker(b.program(vec![stmt]));

    assert_eq!(t.get_types(call), ["String"]);
}
