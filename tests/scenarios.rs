//! The six concrete end-to-end scenarios from the specification's
//! "Concrete end-to-end scenarios" list, each as its own test.

use std::collections::BTreeMap;
use std::rc::Rc;

use pathkit::{CallError, Engine, SearchMode, Value};

fn map(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    Value::Map(pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
}

#[test]
fn scenario_1_dotted_and_bracketed_paths_are_equivalent() {
    let mut engine = Engine::new();
    let root = map([(
        "foo",
        map([(
            "bar",
            map([("qux", map([("baz", Value::from(true))]))]),
        )]),
    )]);

    assert_eq!(engine.get(&root, "foo.bar.qux.baz", &[]), Value::from(true));
    assert_eq!(
        engine.get(&root, r#"["foo"]["bar"]["qux"]["baz"]"#, &[]),
        Value::from(true)
    );
}

#[test]
fn scenario_2_collection_and_wildcard_gather_sibling_values() {
    let mut engine = Engine::new();
    let root = map([(
        "a",
        map([
            ("b", Value::from(1.0)),
            ("c", Value::from(2.0)),
            ("d", Value::from(3.0)),
        ]),
    )]);

    let collected = engine.get(&root, "a.b,c,d", &[]);
    assert_eq!(
        collected,
        Value::Seq(vec![Value::from(1.0), Value::from(2.0), Value::from(3.0)])
    );

    let starred = engine.get(&root, "a.*", &[]);
    let Value::Seq(values) = starred else {
        panic!("expected a sequence");
    };
    let mut sorted: Vec<f64> = values
        .into_iter()
        .map(|v| match v {
            Value::Num(n) => n,
            other => panic!("expected a number, got {other:?}"),
        })
        .collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
}

#[test]
fn scenario_3_each_separator_reads_and_writes_every_element() {
    let mut engine = Engine::new();
    let mut root = map([(
        "users",
        Value::Seq(vec![
            map([("n", Value::from("x"))]),
            map([("n", Value::from("y"))]),
        ]),
    )]);

    let names = engine.get(&root, "users<n", &[]);
    assert_eq!(names, Value::Seq(vec![Value::from("x"), Value::from("y")]));

    assert!(engine.set(&mut root, "users<n", Value::from("z"), &[]));
    let after = engine.get(&root, "users<n", &[]);
    assert_eq!(after, Value::Seq(vec![Value::from("z"), Value::from("z")]));
}

#[test]
fn scenario_4_computed_key_via_eval_property() {
    let mut engine = Engine::new();
    let root = map([
        (
            "list",
            Value::Seq(vec![Value::from(10.0), Value::from(20.0), Value::from(30.0)]),
        ),
        ("k", Value::from("list")),
    ]);

    assert_eq!(
        engine.get(&root, "{k}", &[]),
        Value::Seq(vec![Value::from(10.0), Value::from(20.0), Value::from(30.0)])
    );
    assert_eq!(engine.get(&root, "{k}.1", &[]), Value::from(20.0));
}

#[test]
fn scenario_5_call_invokes_with_a_literal_argument() {
    let mut engine = Engine::new();
    let say: Rc<dyn pathkit::Callable> = Rc::new(|_receiver: Option<&Value>, args: &[Value]| {
        let Some(Value::Str(who)) = args.first() else {
            return Err(CallError("say expects one string argument".to_owned()));
        };
        Ok(Value::Str(format!("hi {who}")))
    });
    let root = map([("say", Value::Callable(say))]);

    assert_eq!(
        engine.get(&root, r#"say("world")"#, &[]),
        Value::from("hi world")
    );
}

#[test]
fn scenario_6_forced_write_materializes_missing_intermediates() {
    let mut engine = Engine::new();

    let mut root = map([("a", Value::from(1.0))]);
    engine.set_force(true);
    assert!(engine.set(&mut root, "b.c.d", Value::from(9.0), &[]));
    assert_eq!(
        root,
        map([("a", Value::from(1.0)), ("b", map([("c", map([("d", Value::from(9.0))]))]))])
    );

    let mut root2 = map([("a", Value::from(1.0))]);
    engine.set_force(false);
    assert!(!engine.set(&mut root2, "b.c.d", Value::from(9.0), &[]));
    assert_eq!(root2, map([("a", Value::from(1.0))]));
}

#[test]
fn search_round_trip_finds_a_leaf_by_value() {
    let engine = Engine::new();
    let root = map([(
        "users",
        Value::Seq(vec![
            map([("id", Value::from(1.0))]),
            map([("id", Value::from(2.0))]),
        ]),
    )]);

    let found = engine.find(&root, &Value::from(2.0), SearchMode::First);
    assert_eq!(found, Some(Value::from("users.1.id")));
}
