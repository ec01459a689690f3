/*!
Flattening of backend "list" payloads.

The backend answers list endpoints in one of three shapes:

- grouped by role: `{"students": [..], "teachers": [..], "parent": [..]}`
- grouped by status: `{"Active": [..], "Completed": [..], "Inactive": [..]}`
  or the lowercase `{"ongoing": [..], "completed": [..], "inactive": [..]}`
- flat: a bare array, or an array under the transport envelope's `data`

[`classify`] decides the shape once and the `normalize_*` functions turn it
into a single ordered list. Nothing here fails: parts that are not what they
should be contribute nothing.
*/
use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::roles::Role;

const ROLE_KEYS: [&str; 3] = ["students", "teachers", "parent"];
const STATUS_KEYS: [&str; 3] = ["Active", "Completed", "Inactive"];
const STATUS_KEYS_LOWER: [&str; 3] = ["ongoing", "completed", "inactive"];

pub const COURSE_ORDER: [&str; 3] = STATUS_KEYS_LOWER;
pub const CLASS_ORDER: [&str; 3] = STATUS_KEYS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    Flat,
    ByRole,
    ByStatus,
    /// Grouped under keys the caller named.
    Grouped,
    Unrecognized,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Flat => "flat",
            Shape::ByRole => "byRole",
            Shape::ByStatus => "byStatus",
            Shape::Grouped => "grouped",
            Shape::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCasing {
    /// `Active` / `Completed` / `Inactive`
    Capitalized,
    /// `ongoing` / `completed` / `inactive`
    Lower,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoleGroups<'a> {
    pub students: &'a [Value],
    pub teachers: &'a [Value],
    pub parents: &'a [Value],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusGroups<'a> {
    pub casing: StatusCasing,
    pub active: &'a [Value],
    pub completed: &'a [Value],
    pub inactive: &'a [Value],
}

/// A list payload after its shape has been worked out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ListPayload<'a> {
    FlatList(&'a [Value]),
    GroupedByRole(RoleGroups<'a>),
    GroupedByStatus(StatusGroups<'a>),
    Unrecognized,
}

impl ListPayload<'_> {
    pub fn shape(&self) -> Shape {
        match self {
            ListPayload::FlatList(_) => Shape::Flat,
            ListPayload::GroupedByRole(_) => Shape::ByRole,
            ListPayload::GroupedByStatus(_) => Shape::ByStatus,
            ListPayload::Unrecognized => Shape::Unrecognized,
        }
    }
}

fn has_any(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|k| obj.contains_key(*k))
}

/// Array under `key`, or nothing if it is missing or not an array.
fn group<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Unwraps the transport envelope. A payload that already carries grouping
/// keys is its own body.
pub fn list_body(raw: &Value) -> &Value {
    let Some(obj) = raw.as_object() else {
        return raw;
    };
    if has_any(obj, &ROLE_KEYS) || has_any(obj, &STATUS_KEYS) || has_any(obj, &STATUS_KEYS_LOWER) {
        return raw;
    }
    obj.get("data").unwrap_or(raw)
}

pub fn classify(raw: &Value) -> ListPayload<'_> {
    let body = list_body(raw);
    if let Some(obj) = body.as_object() {
        if has_any(obj, &ROLE_KEYS) {
            return ListPayload::GroupedByRole(RoleGroups {
                students: group(obj, "students"),
                teachers: group(obj, "teachers"),
                parents: group(obj, "parent"),
            });
        }
        for (casing, keys) in [
            (StatusCasing::Capitalized, STATUS_KEYS),
            (StatusCasing::Lower, STATUS_KEYS_LOWER),
        ] {
            if has_any(obj, &keys) {
                if casing == StatusCasing::Capitalized && has_any(obj, &STATUS_KEYS_LOWER) {
                    log::warn!("status payload mixes casings; ignoring ongoing/completed/inactive");
                }
                return ListPayload::GroupedByStatus(StatusGroups {
                    casing,
                    active: group(obj, keys[0]),
                    completed: group(obj, keys[1]),
                    inactive: group(obj, keys[2]),
                });
            }
        }
    }
    match body.as_array() {
        Some(items) => ListPayload::FlatList(items.as_slice()),
        None => ListPayload::Unrecognized,
    }
}

/// One row of a role-grouped user payload, with the backend's varying field
/// names settled.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_id: Option<Value>,
    pub role: Role,
    pub rest: Map<String, Value>,
}

impl UserRecord {
    /// Projects a raw row. `None` when the row is not an object.
    pub fn project(raw: &Value, role: Role) -> Option<Self> {
        let mut rest = raw.as_object()?.clone();

        let ref_id = rest.remove("userRefId");
        let plain_id = rest.remove("userId");
        let user_id = ref_id.or(plain_id).or_else(|| rest.remove("userID"));

        let (first_name, last_name) = match rest.remove("fullName") {
            Some(Value::String(full)) => {
                let (first, last) = split_full_name(&full);
                (Some(first), Some(last))
            }
            // Not a string: leave it where it was.
            Some(other) => {
                rest.insert("fullName".to_owned(), other);
                (None, None)
            }
            None => (None, None),
        };

        rest.remove("role");

        Some(Self {
            first_name,
            last_name,
            user_id,
            role,
            rest,
        })
    }
}

impl From<UserRecord> for Value {
    fn from(rec: UserRecord) -> Self {
        let mut m = rec.rest;
        if let Some(first) = rec.first_name {
            m.insert("firstName".to_owned(), Value::String(first));
        }
        if let Some(last) = rec.last_name {
            m.insert("lastName".to_owned(), Value::String(last));
        }
        if let Some(id) = rec.user_id {
            m.insert("userID".to_owned(), id);
        }
        m.insert("role".to_owned(), Value::from(rec.role.id()));
        Value::Object(m)
    }
}

/// First whitespace-separated token, then everything after it.
pub fn split_full_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or("").to_owned();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

fn project_group(rows: &[Value], role: Role, out: &mut Vec<Value>) {
    for row in rows {
        match UserRecord::project(row, role) {
            Some(rec) => out.push(rec.into()),
            None => log::debug!("skipping non-object {} row", role),
        }
    }
}

/// Users list of any shape, flattened. Role-grouped rows come out students
/// first, then teachers, then parents.
pub fn normalize_user_list(raw: &Value) -> Vec<Value> {
    normalize_classified(&classify(raw))
}

pub fn normalize_classified(payload: &ListPayload<'_>) -> Vec<Value> {
    match payload {
        ListPayload::GroupedByRole(g) => {
            let mut out = Vec::with_capacity(g.students.len() + g.teachers.len() + g.parents.len());
            project_group(g.students, Role::Student, &mut out);
            project_group(g.teachers, Role::Teacher, &mut out);
            project_group(g.parents, Role::Parent, &mut out);
            out
        }
        ListPayload::GroupedByStatus(g) => g
            .active
            .iter()
            .chain(g.completed)
            .chain(g.inactive)
            .cloned()
            .collect(),
        ListPayload::FlatList(items) => items.to_vec(),
        ListPayload::Unrecognized => Vec::new(),
    }
}

/// Concatenates the arrays under `group_order`, in that order. A key named
/// twice is only read the first time. When none of those keys is present the
/// payload is read as a flat list.
pub fn normalize_grouped_list<S: AsRef<str>>(raw: &Value, group_order: &[S]) -> Vec<Value> {
    let body = grouped_body(raw, group_order);
    if let Some(obj) = body.as_object() {
        if group_order.iter().any(|k| obj.contains_key(k.as_ref())) {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for k in group_order {
                let k: &str = k.as_ref();
                if seen.insert(k) {
                    out.extend(group(obj, k).iter().cloned());
                }
            }
            return out;
        }
    }
    body.as_array().cloned().unwrap_or_default()
}

/// Shape [`normalize_grouped_list`] will see for this payload.
pub fn grouped_shape<S: AsRef<str>>(raw: &Value, group_order: &[S]) -> Shape {
    let body = grouped_body(raw, group_order);
    match body {
        Value::Object(obj) if group_order.iter().any(|k| obj.contains_key(k.as_ref())) => {
            Shape::Grouped
        }
        Value::Array(_) => Shape::Flat,
        _ => Shape::Unrecognized,
    }
}

/// Like [`list_body`], but the grouping keys are the caller's.
fn grouped_body<'a, S: AsRef<str>>(raw: &'a Value, group_order: &[S]) -> &'a Value {
    match raw.as_object() {
        Some(obj) if !group_order.iter().any(|k| obj.contains_key(k.as_ref())) => {
            obj.get("data").unwrap_or(raw)
        }
        _ => raw,
    }
}

pub fn normalize_course_list(raw: &Value) -> Vec<Value> {
    normalize_grouped_list(raw, &COURSE_ORDER)
}

pub fn normalize_class_list(raw: &Value) -> Vec<Value> {
    normalize_grouped_list(raw, &CLASS_ORDER)
}
