use serde_json::json;

use super::*;

fn sample_ops() -> Vec<Operation> {
    vec![
        Operation::CreateNode {
            id: 1,
            kind: "box".to_string(),
        },
        Operation::SetStyle {
            id: 1,
            style: json!({ "width": 100 }),
        },
        Operation::SetEventFlag {
            id: 1,
            event: EventKind::Click,
            enabled: true,
        },
        Operation::CreateNode {
            id: 2,
            kind: "text".to_string(),
        },
        Operation::SetText {
            id: 2,
            text: "hello".to_string(),
        },
        Operation::AppendChild {
            parent: 1,
            child: 2,
        },
        Operation::InsertBefore {
            parent: 1,
            child: 3,
            before: 2,
        },
        Operation::SetCustomProperty {
            id: 1,
            key: "src".to_string(),
            value: json!("logo.png"),
        },
        Operation::SetRoot { id: 1 },
        Operation::RemoveChild {
            parent: 1,
            child: 3,
        },
        Operation::DestroyNode { id: 3 },
    ]
}

#[test]
fn batch_round_trips_in_order() {
    let ops = sample_ops();
    let json = encode_batch(&ops).expect("encode");
    let decoded = decode_batch(&json).expect("decode");
    assert_eq!(decoded, ops);
}

#[test]
fn wire_form_is_tagged_tuples() {
    let op = Operation::SetEventFlag {
        id: 4,
        event: EventKind::KeyDown,
        enabled: false,
    };
    assert_eq!(op.to_wire(), json!(["setEventFlag", 4, "keyDown", false]));
}

#[test]
fn null_style_and_custom_values_survive() {
    let ops = vec![
        Operation::SetStyle {
            id: 1,
            style: json!({}),
        },
        Operation::SetCustomProperty {
            id: 1,
            key: "value".to_string(),
            value: serde_json::Value::Null,
        },
    ];
    let decoded = decode_batch(&encode_batch(&ops).expect("encode")).expect("decode");
    assert_eq!(decoded, ops);
}

#[test]
fn unknown_tag_is_malformed() {
    let err = decode_batch(r#"[["explodeNode", 1]]"#).unwrap_err();
    assert!(matches!(err, BatchError::Malformed { .. }));
}

#[test]
fn missing_argument_is_malformed() {
    let err = decode_batch(r#"[["appendChild", 1]]"#).unwrap_err();
    assert!(matches!(err, BatchError::Malformed { .. }));
}

#[test]
fn non_array_batch_is_malformed() {
    let err = decode_batch(r#"{"createNode": 1}"#).unwrap_err();
    assert!(matches!(err, BatchError::Malformed { .. }));
}

#[test]
fn unknown_event_kind_is_malformed() {
    let err = decode_batch(r#"[["setEventFlag", 1, "tripleClick", true]]"#).unwrap_err();
    assert!(matches!(err, BatchError::Malformed { .. }));
}

#[test]
fn created_id_only_reports_create_nodes() {
    assert_eq!(
        Operation::CreateNode {
            id: 9,
            kind: "box".to_string()
        }
        .created_id(),
        Some(9)
    );
    assert_eq!(Operation::SetRoot { id: 9 }.created_id(), None);
}
