mod common;

use json_patch_doc::{Operation, PatchDocument, PatchError, PatchValue};
use json_patch_extension_data::{AdaptExt, AdapterError, ExtensionData, ExtensionDataAdapter};
use serde_json::value::RawValue;
use serde_json::json;

use common::{extension_map, MyClass, MyClassWithAList, MyClassWithNesting};

#[derive(Debug, Clone, Copy)]
struct Case {
    initially_empty: bool,
    overwrite_existing: bool,
    untyped_path: bool,
    as_extension_method: bool,
}

fn cases() -> Vec<Case> {
    let mut out = Vec::new();
    for as_extension_method in [true, false] {
        for (initially_empty, overwrite_existing) in [(true, false), (false, true), (false, false)] {
            for untyped_path in [true, false] {
                out.push(Case {
                    initially_empty,
                    overwrite_existing,
                    untyped_path,
                    as_extension_method,
                });
            }
        }
    }
    out
}

fn raw(text: &str) -> PatchValue {
    PatchValue::Raw(RawValue::from_string(text.to_string()).unwrap())
}

#[test]
fn patching_extension_data_matrix() {
    for case in cases() {
        let json = if case.initially_empty {
            r#"{"Foo": 17, "Bar": "asd"}"#
        } else {
            r#"{"Foo": 17, "Bar": "asd", "MyExtensionData": {"abc": "def"}}"#
        };
        let mut entity: MyClass = serde_json::from_str(json).unwrap();
        assert_eq!(
            entity.my_extension_data.as_ref().map_or(true, |m| m.is_empty()),
            case.initially_empty,
            "{case:?}"
        );

        let mut patch = PatchDocument::<MyClass>::new()
            .with(Operation::add("/Foo", json!(42)))
            .with(Operation::add("/Bar", json!("fgh")));
        let key = if case.overwrite_existing { "abc" } else { "uvw" };

        if !case.untyped_path {
            if case.initially_empty {
                patch.push(Operation::add("/MyExtensionData", json!({ key: "xyz" })));
            } else {
                patch.push(Operation::add(format!("/MyExtensionData/{key}"), json!("xyz")));
            }
        } else {
            patch.push(Operation::add(format!("/{key}"), json!("xyz")));
            patch = if case.as_extension_method {
                patch.adapt(MyClass::accessor(), &entity).unwrap()
            } else {
                ExtensionDataAdapter::<MyClass>::for_model()
                    .unwrap()
                    .transform(&patch, &entity)
                    .unwrap()
            };
        }

        patch.apply_to(&mut entity).unwrap();

        assert_eq!(entity.foo, Some(42), "{case:?}");
        assert_eq!(entity.bar.as_deref(), Some("fgh"), "{case:?}");
        let extension_data = entity.my_extension_data.expect("extension data");
        assert_eq!(extension_data.get(key), Some(&json!("xyz")), "{case:?}");
        if !case.overwrite_existing && !case.initially_empty {
            assert_eq!(extension_data.get("abc"), Some(&json!("def")), "{case:?}");
        }
    }
}

#[test]
fn unknown_member_fails_without_adapter() {
    let mut entity = MyClass::default();
    let patch = PatchDocument::<MyClass>::new().with(Operation::add("/uvw", json!("xyz")));
    let err = patch.apply_to(&mut entity).unwrap_err();
    assert!(matches!(err, PatchError::NotFound { ref segment } if segment == "uvw"));
}

#[test]
fn redirect_on_empty_emits_single_bulk_add() {
    let entity = MyClass::default();
    let patch = PatchDocument::<MyClass>::new()
        .with(Operation::add("/uvw", json!("xyz")))
        .with(Operation::replace("/Foo", json!(1)))
        .with(Operation::add("/abc", json!({"nested": [1, 2]})))
        .with(Operation::remove("/gone"));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.operations(),
        [
            Operation::replace("/Foo", json!(1)),
            Operation::add(
                "/MyExtensionData",
                json!({"uvw": "xyz", "abc": {"nested": [1, 2]}, "gone": null})
            ),
        ]
    );
}

#[test]
fn duplicate_buffered_keys_keep_the_last_value() {
    let mut entity = MyClass::default();
    let patch = PatchDocument::<MyClass>::new()
        .with(Operation::add("/uvw", json!("first")))
        .with(Operation::add("/uvw", json!("second")));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(adapted.len(), 1);
    adapted.apply_to(&mut entity).unwrap();
    assert_eq!(
        entity.my_extension_data,
        Some(extension_map([("uvw", json!("second"))]))
    );
}

#[test]
fn redirect_on_nonempty_existing_key_becomes_replace() {
    let entity = MyClass {
        my_extension_data: Some(extension_map([("abc", json!("def"))])),
        ..MyClass::default()
    };
    let patch = PatchDocument::<MyClass>::new().with(Operation::add("/abc", json!("ghi")));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.operations(),
        [Operation::replace("/MyExtensionData/abc", json!("ghi"))]
    );
}

#[test]
fn copy_into_unknown_member_keeps_from() {
    let mut entity = MyClass {
        bar: Some("asd".into()),
        my_extension_data: Some(extension_map([("abc", json!("def"))])),
        ..MyClass::default()
    };
    let patch = PatchDocument::<MyClass>::new().with(Operation::copy_from("/Bar", "/uvw"));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.operations(),
        [Operation::copy_from("/Bar", "/MyExtensionData/uvw")]
    );
    adapted.apply_to(&mut entity).unwrap();
    assert_eq!(entity.my_extension_data.unwrap()["uvw"], json!("asd"));
}

#[test]
fn unadaptable_operation_aborts_the_whole_call() {
    let entity = MyClass {
        my_extension_data: Some(extension_map([("abc", json!("def"))])),
        ..MyClass::default()
    };
    let patch = PatchDocument::<MyClass>::new()
        .with(Operation::replace("/Foo", json!(3)))
        .with(Operation::replace("/missing/deeper", json!(1)));
    let err = patch.adapt(MyClass::accessor(), &entity).unwrap_err();
    let AdapterError::NotAdaptable {
        operation,
        sink_path,
        original,
        rewrite,
    } = &err
    else {
        panic!("unexpected error: {err}");
    };
    assert!(operation.contains("/missing/deeper"));
    assert_eq!(sink_path, "/MyExtensionData");
    assert!(matches!(original, PatchError::NotFound { .. }));
    assert!(matches!(rewrite, PatchError::NotFound { .. }));
    assert!(err
        .to_string()
        .starts_with(r#"The operation {"op":"replace","path":"/missing/deeper","value":1} could neither be applied"#));
}

#[test]
fn case_insensitive_prefix_is_stripped() {
    let mut entity = common::nested_instance(None);
    let patch = PatchDocument::<MyClassWithNesting>::new()
        .with(Operation::add("/myModel/lokationszuordnungen", json!("x")));
    let adapted = ExtensionDataAdapter::<MyClassWithNesting>::for_model()
        .unwrap()
        .transform(&patch, &entity)
        .unwrap();
    assert_eq!(
        adapted.operations(),
        [Operation::add(
            "/MyModel/MyExtensionData",
            json!({"lokationszuordnungen": "x"})
        )]
    );
    adapted.apply_to(&mut entity).unwrap();
    let model = entity.my_model.unwrap();
    assert_eq!(
        model.my_extension_data,
        Some(extension_map([("lokationszuordnungen", json!("x"))]))
    );
}

#[test]
fn raw_values_under_the_sink_are_emitted_as_text() {
    let mut entity = MyClass {
        my_extension_data: Some(extension_map([("abc", json!("def"))])),
        ..MyClass::default()
    };
    let patch = PatchDocument::<MyClass>::new()
        .with(Operation::replace("/Bar", raw(r#""fgh""#)))
        .with(Operation::add("/uvw", raw(r#""xyz""#)))
        .with(Operation::add("/count", raw("42")));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    let ops = adapted.operations();
    assert!(ops[0].value.as_ref().is_some_and(PatchValue::is_raw));
    assert_eq!(ops[1].value, Some(PatchValue::Plain(json!("xyz"))));
    assert_eq!(ops[2].value, Some(PatchValue::Plain(json!("42"))));

    adapted.apply_to(&mut entity).unwrap();
    assert_eq!(entity.bar.as_deref(), Some("fgh"));
    let extension_data = entity.my_extension_data.unwrap();
    assert_eq!(extension_data["uvw"], json!("xyz"));
    assert_eq!(extension_data["count"], json!("42"));
}

#[test]
fn raw_values_are_buffered_as_parsed_json() {
    let entity = MyClass::default();
    let patch = PatchDocument::<MyClass>::new()
        .with(Operation::add("/flag", raw("true")))
        .with(Operation::add("/obj", raw(r#"{"a": 1}"#)));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.operations()[0].value,
        Some(PatchValue::Plain(json!({"flag": true, "obj": {"a": 1}})))
    );
}

#[test]
fn documents_decoded_from_json_are_adapted() {
    let entity = MyClass::default();
    let patch = PatchDocument::<MyClass>::from_json_str(
        r#"[{"op": "add", "path": "/Foo", "value": 5}, {"op": "add", "path": "/lokationszuordnungen"}]"#,
    )
    .unwrap();
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.to_json().unwrap(),
        json!([
            {"op": "add", "path": "/Foo", "value": 5},
            {"op": "add", "path": "/MyExtensionData", "value": {"lokationszuordnungen": null}},
        ])
    );
}

#[test]
fn key_removed_before_redirect_is_added_again() {
    let mut entity = MyClass {
        my_extension_data: Some(extension_map([("abc", json!("def")), ("keep", json!(1))])),
        ..MyClass::default()
    };
    let patch = PatchDocument::<MyClass>::new()
        .with(Operation::remove("/MyExtensionData/abc"))
        .with(Operation::add("/abc", json!("new")));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.operations(),
        [
            Operation::remove("/MyExtensionData/abc"),
            Operation::add("/MyExtensionData/abc", json!("new")),
        ]
    );
    adapted.apply_to(&mut entity).unwrap();
    assert_eq!(
        entity.my_extension_data,
        Some(extension_map([("keep", json!(1)), ("abc", json!("new"))]))
    );
}

#[test]
fn empty_extension_data_is_added_even_if_nothing_is_redirected() {
    let mut entity = MyClass::default();
    let patch = PatchDocument::<MyClass>::new().with(Operation::replace("/Foo", json!(1)));
    let adapted = patch.adapt(MyClass::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.operations(),
        [
            Operation::replace("/Foo", json!(1)),
            Operation::add("/MyExtensionData", json!({})),
        ]
    );
    adapted.apply_to(&mut entity).unwrap();
    assert_eq!(entity.foo, Some(1));
    assert_eq!(entity.my_extension_data, Some(extension_map([])));
}

fn list_entity(initially_empty: bool) -> MyClassWithAList {
    MyClassWithAList {
        my_extension_data: (!initially_empty).then(|| extension_map([("abc", json!("def"))])),
        ..MyClassWithAList::default()
    }
}

#[test]
fn bracket_index_segment_is_not_a_list_element() {
    for initially_empty in [true, false] {
        let mut entity = list_entity(initially_empty);
        let patch = PatchDocument::<MyClassWithAList>::new()
            .with(Operation::add("/Foo", json!(42)))
            .with(Operation::add("/Bar", json!("fgh")))
            .with(Operation::add("/SomeList[0]", json!(17)));
        let err = patch.apply_to(&mut entity.clone()).unwrap_err();
        assert!(matches!(err, PatchError::NotFound { ref segment } if segment == "SomeList[0]"));

        let adapted = patch.adapt(MyClassWithAList::accessor(), &entity).unwrap();
        adapted.apply_to(&mut entity).unwrap();
        assert_eq!(entity.foo, Some(42), "empty: {initially_empty}");
        assert!(entity.some_list.is_empty(), "empty: {initially_empty}");
        let extension_data = entity.my_extension_data.unwrap();
        assert_eq!(extension_data.get("SomeList[0]"), Some(&json!(17)), "empty: {initially_empty}");
    }
}

#[test]
fn list_index_segment_passes_through() {
    for initially_empty in [true, false] {
        let mut entity = list_entity(initially_empty);
        let patch = PatchDocument::<MyClassWithAList>::new().with(Operation::add("/SomeList/0", json!(17)));
        let adapted = patch.adapt(MyClassWithAList::accessor(), &entity).unwrap();
        assert_eq!(adapted.operations()[0], Operation::add("/SomeList/0", json!(17)));
        assert_eq!(adapted.len(), if initially_empty { 2 } else { 1 });
        adapted.apply_to(&mut entity).unwrap();
        assert_eq!(entity.some_list, [17], "empty: {initially_empty}");
    }
}

#[test]
fn out_of_range_list_index_cannot_be_redirected() {
    let entity = list_entity(false);
    let patch = PatchDocument::<MyClassWithAList>::new().with(Operation::add("/SomeList/5", json!(17)));
    let err = patch.adapt(MyClassWithAList::accessor(), &entity).unwrap_err();
    let AdapterError::NotAdaptable { original, rewrite, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert!(matches!(original, PatchError::NotFound { segment } if segment == "5"));
    assert!(matches!(rewrite, PatchError::NotFound { segment } if segment == "SomeList"));
}

#[test]
fn out_of_range_list_index_is_buffered_under_its_relative_key() {
    let mut entity = list_entity(true);
    let patch = PatchDocument::<MyClassWithAList>::new().with(Operation::add("/SomeList/5", json!(17)));
    let adapted = patch.adapt(MyClassWithAList::accessor(), &entity).unwrap();
    assert_eq!(
        adapted.operations(),
        [Operation::add("/MyExtensionData", json!({"SomeList/5": 17}))]
    );
    adapted.apply_to(&mut entity).unwrap();
    assert!(entity.some_list.is_empty());
}
