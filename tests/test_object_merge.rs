//! Property-based coverage for the reversed-scan last-write-wins rule,
//! including spreads of spreads. The model is a plain left-to-right map
//! merge; the engine must agree with it for every generated layering.

use std::collections::HashMap;
use std::rc::Rc;

use proptest::prelude::*;

use typetrack::ast::{NodeId, ObjectProperty, TreeBuilder};
use typetrack::TypeTracker;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Str,
    Num,
    Bool,
}

impl Kind {
    fn type_name(self) -> &'static str {
        match self {
            Kind::Str => "String",
            Kind::Num => "Number",
            Kind::Bool => "Boolean",
        }
    }
}

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

/// One object layer: an optional leading spread of the previous layer,
/// then own properties in declaration order.
#[derive(Debug, Clone)]
struct Layer {
    spread_previous_first: bool,
    props: Vec<(usize, Kind)>,
}

fn kind_strategy() -> impl Strategy<Value = Kind> {
    prop_oneof![Just(Kind::Str), Just(Kind::Num), Just(Kind::Bool)]
}

fn layer_strategy() -> impl Strategy<Value = Layer> {
    (
        any::<bool>(),
        prop::collection::vec((0..NAMES.len(), kind_strategy()), 0..5),
    )
        .prop_map(|(spread_previous_first, props)| Layer {
            spread_previous_first,
            props,
        })
}

fn literal(b: &mut TreeBuilder, kind: Kind) -> NodeId {
    match kind {
        Kind::Str => b.string("s"),
        Kind::Num => b.number(1.0),
        Kind::Bool => b.boolean(true),
    }
}

/// Reference semantics: merge layers left to right, spread first when
/// present, later writes overwriting earlier ones.
fn expected_map(layers: &[Layer]) -> HashMap<usize, Kind> {
    let mut previous: HashMap<usize, Kind> = HashMap::new();
    for layer in layers {
        let mut current = HashMap::new();
        if layer.spread_previous_first {
            current.extend(previous.iter().map(|(&k, &v)| (k, v)));
        }
        for &(name, kind) in &layer.props {
            current.insert(name, kind);
        }
        previous = current;
    }
    previous
}

proptest! {
    #[test]
    fn prop_nested_spread_merge_matches_model(
        layers in prop::collection::vec(layer_strategy(), 1..4)
    ) {
        let mut b = TreeBuilder::new();
        let mut body = Vec::new();
        let mut previous_name: Option<String> = None;
        let mut final_name = String::new();

        for (index, layer) in layers.iter().enumerate() {
            let mut properties = Vec::new();
            if layer.spread_previous_first {
                if let Some(prev) = &previous_name {
                    let source = b.ident(prev.clone());
                    properties.push(ObjectProperty::Spread(source));
                }
            }
            for &(name, kind) in &layer.props {
                let value = literal(&mut b, kind);
                properties.push(TreeBuilder::prop(NAMES[name], value));
            }
            let object = b.object(properties);
            let binding = format!("o{}", index);
            body.push(b.const_decl(binding.clone(), object));
            previous_name = Some(binding.clone());
            final_name = binding;
        }

        // access every candidate property on the final object
        let mut accesses = Vec::new();
        for name in NAMES {
            let target = b.ident(final_name.clone());
            let member = b.member(target, name);
            body.push(b.expr_stmt(member));
            accesses.push((name, member));
        }

        let tree = b.program(body);
        let tracker = TypeTracker::new(Rc::new(tree));

        let model = expected_map(&layers);
        for (name, member) in accesses {
            let index = NAMES.iter().position(|n| *n == name).unwrap();
            let got = tracker.get_types(member);
            match model.get(&index) {
                Some(kind) => prop_assert_eq!(got, vec![kind.type_name().to_string()]),
                None => prop_assert_eq!(got, Vec::<String>::new()),
            }
        }
    }
}
