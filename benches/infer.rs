use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use typetrack::ast::{BinaryOp, NodeId, TreeBuilder};
use typetrack::{SyntaxTree, TypeTracker};

/// `const s0 = 'x'; const s1 = s0 + s0; ...` with a member access on the
/// final link, exercising binding resolution and memoization depth.
fn const_chain(links: usize) -> (SyntaxTree, NodeId) {
    let mut b = TreeBuilder::new();
    let mut body = Vec::new();
    let seed = b.string("x");
    body.push(b.const_decl("s0", seed));
    for i in 1..links {
        let left = b.ident(format!("s{}", i - 1));
        let right = b.ident(format!("s{}", i - 1));
        let concat = b.binary(BinaryOp::Add, left, right);
        body.push(b.const_decl(format!("s{}", i), concat));
    }
    let last = b.ident(format!("s{}", links - 1));
    let len = b.member(last, "length");
    body.push(b.expr_stmt(len));
    (b.program(body), len)
}

/// A pile of guarded functions, exercising CFG construction and the guard
/// walk.
fn guarded_functions(count: usize) -> (SyntaxTree, Vec<NodeId>) {
    let mut b = TreeBuilder::new();
    let mut body = Vec::new();
    let mut hits = Vec::new();
    for i in 0..count {
        let param = b.param("a");
        let a_test = b.ident("a");
        let type_of = b.typeof_(a_test);
        let lit = b.string("string");
        let test = b.binary(BinaryOp::StrictNotEq, type_of, lit);
        let ret = b.return_stmt(None);
        let if_stmt = b.if_stmt(test, ret);
        let hit = b.ident("a");
        let hit_stmt = b.expr_stmt(hit);
        let func_body = b.block(vec![if_stmt, hit_stmt]);
        body.push(b.function_decl(format!("f{}", i), vec![param], func_body));
        hits.push(hit);
    }
    (b.program(body), hits)
}

fn bench_const_chain(c: &mut Criterion) {
    let (tree, query) = const_chain(16);
    let tree = Rc::new(tree);
    c.bench_function("const_chain_cold", |bench| {
        bench.iter(|| {
            let tracker = TypeTracker::new(Rc::clone(&tree));
            black_box(tracker.get_types(black_box(query)))
        })
    });

    let tracker = TypeTracker::new(Rc::clone(&tree));
    c.bench_function("const_chain_memoized", |bench| {
        bench.iter(|| black_box(tracker.get_types(black_box(query))))
    });
}

fn bench_guard_narrowing(c: &mut Criterion) {
    let (tree, hits) = guarded_functions(32);
    let tree = Rc::new(tree);
    c.bench_function("guard_narrowing_cold", |bench| {
        bench.iter(|| {
            let tracker = TypeTracker::new(Rc::clone(&tree));
            for &hit in &hits {
                black_box(tracker.get_types(black_box(hit)));
            }
        })
    });
}

criterion_group!(benches, bench_const_chain, bench_guard_narrowing);
criterion_main!(benches);
