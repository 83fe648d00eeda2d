//! Decode/encode contracts of the shape algebra.

use std::sync::Arc;

use json_shape::{
    array, dictionary, intersection, keyof, literal, never, number, object, partial, pipe,
    readonly, readonly_array, recursive, refinement, reporter, strict, string, tagged_union,
    tuple, undef, union, DecodeOptions, Outcome, Shape, ShapeRef,
};
use serde_json::{json, Value};

/// A transforming codec: decodes numeric strings into numbers.
fn number_from_string() -> ShapeRef {
    Shape::custom(
        "NumberFromString",
        |v: &Value| v.is_number(),
        |v: &Value| v.as_str().and_then(|s| s.parse::<f64>().ok()).map(|n| json!(n)),
        Some(Arc::new(|v: &Value| {
            let n = v.as_f64().unwrap_or(0.0);
            if n.fract() == 0.0 {
                Value::String(format!("{}", n as i64))
            } else {
                Value::String(n.to_string())
            }
        })),
    )
}

#[test]
fn round_trip_encode_then_decode() {
    let cases: Vec<(ShapeRef, Value)> = vec![
        (string(), json!("x")),
        (number(), json!(1.5)),
        (literal("on"), json!("on")),
        (keyof(vec!["a", "b"]), json!("b")),
        (object(vec![("a", string())]), json!({"a": "x", "extra": 1})),
        (array(number()), json!([1, 2, 3])),
        (tuple(vec![string(), number()]), json!(["a", 1])),
        (union(vec![string(), number()]), json!(5)),
        (dictionary(string(), number()), json!({"a": 1})),
        (partial(vec![("a", string())]), json!({})),
        (readonly(object(vec![("a", string())])), json!({"a": "x"})),
        (number_from_string(), json!(5.0)),
    ];
    for (shape, value) in cases {
        assert!(shape.is(&value), "{} should accept {}", shape, value);
        let encoded = shape.encode(&value);
        let decoded = shape
            .decode(encoded)
            .unwrap_or_else(|_| panic!("{} failed to re-decode {}", shape, value));
        assert_eq!(decoded, value, "round trip through {}", shape);
    }
}

#[test]
fn unchanged_containers_keep_the_input_storage() {
    let shape = array(string());
    let input = json!(["a", "b"]);
    let ptr = input.as_array().map(|a| a.as_ptr());
    let outcome = shape
        .validate(&input, "", &DecodeOptions::default())
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    let decoded = shape.decode(input).unwrap();
    assert_eq!(decoded.as_array().map(|a| a.as_ptr()), ptr);
}

#[test]
fn strict_objects_reject_extra_keys_against_never() {
    let shape = strict(vec![("foo", string())]);
    let err = shape.decode(json!({"foo": "x", "bar": 1})).unwrap_err();
    assert_eq!(err.children.len(), 1);
    assert_eq!(err.children[0].key, "bar");
    assert_eq!(err.children[0].type_name, "never");
    assert_eq!(err.children[0].value, json!(1));
    assert!(shape.decode(json!({"foo": "x"})).is_ok());
}

#[test]
fn open_objects_preserve_extra_keys() {
    let shape = object(vec![("foo", string())]);
    let out = shape.decode(json!({"foo": "x", "bar": 1})).unwrap();
    assert_eq!(out, json!({"foo": "x", "bar": 1}));
}

#[test]
fn partial_accepts_absence_and_rejects_wrong_types() {
    let shape = partial(vec![("foo", string())]);
    assert!(shape.decode(json!({})).is_ok());
    assert!(shape.decode(json!({"foo": null})).is_ok());
    assert!(shape.decode(json!({"foo": 1})).is_err());
}

#[test]
fn partial_encoding_omits_absent_fields() {
    let shape = partial(vec![("foo", string())]);
    assert_eq!(
        shape.encode(&json!({"foo": null, "bar": 2})),
        json!({"bar": 2})
    );
    assert_eq!(
        shape.encode(&json!({"foo": "x", "bar": 2})),
        json!({"foo": "x", "bar": 2})
    );
}

#[test]
fn tuples_reject_excess_elements() {
    let shape = tuple(vec![string(), number()]);
    let err = shape.decode(json!(["a", 1, true])).unwrap_err();
    assert_eq!(err.children.len(), 1);
    assert_eq!(err.children[0].key, "2");
    assert_eq!(err.children[0].type_name, "never");
    assert!(shape.decode(json!(["a", 1])).is_ok());
}

#[test]
fn union_order_decides_the_winner() {
    let shape = union(vec![string(), number_from_string()]);
    assert_eq!(shape.decode(json!("5")).unwrap(), json!("5"));

    let reversed = union(vec![number_from_string(), string()]);
    assert_eq!(reversed.decode(json!("5")).unwrap(), json!(5.0));
}

#[test]
fn tagged_union_fails_with_one_discriminant_error() {
    let a = object(vec![("kind", literal("a")), ("a", string())]);
    let b = object(vec![("kind", literal("b")), ("b", number())]);
    let tagged = tagged_union("kind", vec![a.clone(), b.clone()]);

    let err = tagged.decode(json!({"kind": "c"})).unwrap_err();
    assert_eq!(err.children.len(), 1);
    assert_eq!(err.children[0].key, "kind");
    assert!(err.children[0].children.is_empty());

    // A generic union over the same members aggregates every branch.
    let generic = union(vec![a, b]);
    let err = generic.decode(json!({"kind": "c"})).unwrap_err();
    assert_eq!(err.children.len(), 2);
}

#[test]
fn tagged_union_dispatch_keeps_only_the_matching_branch() {
    let a = object(vec![("kind", literal("a")), ("a", string())]);
    let b = object(vec![("kind", literal("b")), ("b", number())]);
    let tagged = tagged_union("kind", vec![a, b]);

    assert!(tagged.decode(json!({"kind": "b", "b": 1})).is_ok());
    let err = tagged.decode(json!({"kind": "b", "b": "x"})).unwrap_err();
    assert_eq!(err.children.len(), 1);
    assert_eq!(err.children[0].key, "1");
}

#[test]
fn objects_collect_every_field_error() {
    let shape = object(vec![("a", string()), ("b", number())]);
    let err = shape.decode(json!({"a": 1, "b": "x"})).unwrap_err();
    assert_eq!(err.children.len(), 2);
    assert_eq!(err.children[0].key, "a");
    assert_eq!(err.children[1].key, "b");
}

#[test]
fn recursive_shapes_decode_trees() {
    let node = recursive("Node", |self_ref| {
        object(vec![("value", number()), ("children", array(self_ref))])
    });
    assert!(node
        .decode(json!({"value": 1, "children": [{"value": 2, "children": []}]}))
        .is_ok());

    let result = node.decode(json!({"value": 1, "children": [{"value": "x", "children": []}]}));
    let messages = reporter::path::report(&result);
    assert_eq!(
        messages,
        ["Invalid value \"x\" supplied to : Node/children: Array<Node>/0: Node/value: number"]
    );
}

#[test]
fn union_nests_branch_failures_while_intersection_splices() {
    let a = object(vec![("a", string())]);
    let b = object(vec![("b", number())]);
    let bad = json!({"a": 1, "b": "x"});

    let err = union(vec![a.clone(), b.clone()]).decode(bad.clone()).unwrap_err();
    assert_eq!(err.children.len(), 2);
    assert_eq!(err.children[0].key, "0");
    assert_eq!(err.children[0].children.len(), 1);

    let err = intersection(vec![a, b]).decode(bad).unwrap_err();
    assert_eq!(err.children.len(), 2);
    assert_eq!(err.children[0].key, "a");
    assert_eq!(err.children[1].key, "b");
    assert!(err.children[0].children.is_empty());
}

#[test]
fn intersection_keeps_leaf_branch_failures_with_their_index() {
    let err = intersection(vec![string(), string()])
        .decode(json!(1))
        .unwrap_err();
    assert_eq!(err.children.len(), 2);
    assert_eq!(err.children[0].key, "0");
    assert_eq!(err.children[1].key, "1");
}

#[test]
fn intersection_threads_transformed_output_and_encodes_in_sequence() {
    let shape = intersection(vec![
        object(vec![("n", number_from_string())]),
        object(vec![("m", number_from_string())]),
    ]);
    let decoded = shape.decode(json!({"n": "1", "m": "2"})).unwrap();
    assert_eq!(decoded, json!({"n": 1.0, "m": 2.0}));
    assert_eq!(shape.encode(&decoded), json!({"n": "1", "m": "2"}));
}

#[test]
fn pipe_composes_decoding_left_to_right_and_encoding_right_to_left() {
    let shape = pipe(string(), number_from_string());
    assert_eq!(shape.decode(json!("5")).unwrap(), json!(5.0));
    // The first stage fails before the codec ever runs.
    assert!(shape.decode(json!(5)).is_err());
    assert_eq!(shape.encode(&json!(5.0)), json!("5"));
}

#[test]
fn pipe_of_identity_encoders_is_identity() {
    let non_empty = refinement(string(), "NonEmpty", |v| {
        v.as_str().is_some_and(|s| !s.is_empty())
    });
    let shape = pipe(string(), non_empty);
    assert_eq!(shape.decode(json!("x")).unwrap(), json!("x"));
    assert!(shape.decode(json!("")).is_err());
    assert_eq!(shape.encode(&json!("x")), json!("x"));
}

#[test]
fn dictionary_rebuilds_under_transformed_keys() {
    let upper_key = Shape::custom(
        "UpperKey",
        |v: &Value| v.as_str().is_some_and(|s| !s.chars().any(char::is_lowercase)),
        |v: &Value| v.as_str().map(|s| Value::String(s.to_uppercase())),
        None,
    );
    let dict = dictionary(upper_key, number());
    assert_eq!(
        dict.decode(json!({"a": 1, "b": 2})).unwrap(),
        json!({"A": 1, "B": 2})
    );
}

#[test]
fn dictionary_collects_key_and_value_errors_at_the_same_path_key() {
    let shape = dictionary(keyof(vec!["a"]), number());
    let err = shape.decode(json!({"z": "x"})).unwrap_err();
    assert_eq!(err.children.len(), 2);
    assert!(err.children.iter().all(|c| c.key == "z"));

    let input = json!({"a": 1});
    let plain = dictionary(string(), number());
    let outcome = plain.validate(&input, "", &DecodeOptions::default()).unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
}

#[test]
fn refinement_errors_carry_the_validated_value() {
    let positive = refinement(number_from_string(), "PositiveFromString", |v| {
        v.as_f64().is_some_and(|n| n > 0.0)
    });
    let err = positive.decode(json!("-5")).unwrap_err();
    // The codec ran first, so the error records the transformed value.
    assert_eq!(err.value, json!(-5.0));
    assert_eq!(err.type_name, "PositiveFromString");
}

#[test]
fn readonly_isolation_is_an_explicit_option() {
    let shape = readonly_array(string());

    let input = json!(["a"]);
    let ptr = input.as_array().map(|a| a.as_ptr());
    let shared = shape.decode(input).unwrap();
    assert_eq!(shared.as_array().map(|a| a.as_ptr()), ptr);

    let input = json!(["a"]);
    let ptr = input.as_array().map(|a| a.as_ptr());
    let isolated = shape
        .decode_with(input, &DecodeOptions { isolate_readonly: true })
        .unwrap();
    assert_ne!(isolated.as_array().map(|a| a.as_ptr()), ptr);
    assert_eq!(isolated, json!(["a"]));
}

#[test]
fn union_encodes_through_the_first_accepting_member() {
    let shape = union(vec![number_from_string(), string()]);
    assert_eq!(shape.encode(&json!(5.0)), json!("5"));
    assert_eq!(shape.encode(&json!("x")), json!("x"));
    // No guard matches: the last member is the fallback.
    assert_eq!(shape.encode(&json!(true)), json!(true));
}

#[test]
fn missing_fields_that_validate_are_materialized() {
    let shape = object(vec![("a", union(vec![string(), undef()]))]);
    let out = shape.decode(json!({})).unwrap();
    assert_eq!(out, json!({"a": null}));
}

#[test]
#[should_panic(expected = "never")]
fn encoding_never_is_a_programmer_error() {
    never().encode(&json!(1));
}
