//! Shared test utilities and arbitrary generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use crate::types::{Event, PrAction};

pub fn arb_event_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("push".to_string()),
        Just("pull_request".to_string()),
        Just("issues".to_string()),
        "[a-z_]{0,20}",
    ]
}

/// Any JSON value, nested up to a few levels.
pub fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9/_ -]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ref".to_string()),
        Just("action".to_string()),
        Just("head_commit".to_string()),
        Just("pull_request".to_string()),
        Just("author".to_string()),
        Just("user".to_string()),
        Just("login".to_string()),
        "[a-z_]{1,8}",
    ]
}

/// A field that may be missing, null, mistyped, or a plausible string.
fn arb_maybe_str() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        Just(Some(json!(17))),
        Just(Some(json!(""))),
        "[a-z0-9/_-]{1,16}".prop_map(|s| Some(Value::String(s))),
    ]
}

fn arb_maybe_bool() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        Just(Some(json!("true"))),
        any::<bool>().prop_map(|b| Some(Value::Bool(b))),
    ]
}

fn object(fields: Vec<(&str, Option<Value>)>) -> Value {
    let map: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
        .collect();
    Value::Object(map)
}

/// Sometimes wrap a nested object, sometimes replace it with null or drop it.
fn maybe_object(inner: Value) -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        3 => Just(Some(inner)),
        1 => Just(Some(Value::Null)),
        1 => Just(None),
    ]
}

/// A webhook-shaped payload where any field may be absent or malformed.
///
/// Always a JSON object at the root.
pub fn arb_sparse_payload() -> impl Strategy<Value = Value> {
    let author = (arb_maybe_str(), arb_maybe_str())
        .prop_map(|(username, name)| object(vec![("username", username), ("name", name)]));
    let head_commit = (author, arb_maybe_str())
        .prop_flat_map(|(author, ts)| {
            maybe_object(author).prop_map(move |a| object(vec![("author", a), ("timestamp", ts.clone())]))
        })
        .prop_flat_map(maybe_object);

    let login = |s: Option<Value>| object(vec![("login", s)]);
    let branch = |s: Option<Value>| object(vec![("ref", s)]);
    let pull_request = (
        arb_maybe_str().prop_map(login),
        arb_maybe_str().prop_map(login),
        arb_maybe_str().prop_map(branch),
        arb_maybe_str().prop_map(branch),
        arb_maybe_bool(),
        (arb_maybe_str(), arb_maybe_str(), arb_maybe_str()),
    )
        .prop_map(|(user, merged_by, head, base, merged, (created, merged_at, closed))| {
            object(vec![
                ("user", Some(user)),
                ("merged_by", Some(merged_by)),
                ("head", Some(head)),
                ("base", Some(base)),
                ("merged", merged),
                ("created_at", created),
                ("merged_at", merged_at),
                ("closed_at", closed),
            ])
        })
        .prop_flat_map(maybe_object);

    let action = prop_oneof![
        Just(Some(json!("opened"))),
        Just(Some(json!("closed"))),
        arb_maybe_str(),
    ];

    (head_commit, pull_request, action, arb_maybe_str()).prop_map(
        |(head_commit, pull_request, action, git_ref)| {
            object(vec![
                ("head_commit", head_commit),
                ("pull_request", pull_request),
                ("action", action),
                ("ref", git_ref),
            ])
        },
    )
}

pub fn arb_timestamp() -> impl Strategy<Value = String> {
    (2000u32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}Z"),
    )
}

pub fn arb_event() -> impl Strategy<Value = Event> {
    let name = "[a-z][a-z0-9-]{0,10}";
    prop_oneof![
        (name, name, arb_timestamp()).prop_map(|(author, to_branch, timestamp)| Event::Push {
            author,
            to_branch,
            timestamp,
        }),
        (any::<bool>(), name, name, name, arb_timestamp()).prop_map(
            |(opened, author, from_branch, to_branch, timestamp)| Event::PullRequest {
                action: if opened { PrAction::Opened } else { PrAction::Closed },
                author,
                from_branch,
                to_branch,
                timestamp,
            }
        ),
        (name, name, name, arb_timestamp()).prop_map(
            |(author, from_branch, to_branch, timestamp)| Event::Merge {
                author,
                from_branch,
                to_branch,
                timestamp,
            }
        ),
    ]
}
