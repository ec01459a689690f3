use crate::ipc::error::{err, ok, Code};
use crate::ipc::types::{AppState, Request};
use portald::visibility::{filter_for_display, filter_for_submission, get_form_fields};
use portald::Role;
use serde_json::json;

/// Reads a role param, or builds the error response for it.
fn role_param(req: &Request, key: &str) -> Result<Role, serde_json::Value> {
    let Some(v) = req.params.get(key) else {
        return Err(err(&req.id, Code::BadParams, format!("missing {key}"), None));
    };
    Role::from_json(v).map_err(|e| {
        err(
            &req.id,
            Code::UnknownRole,
            e.to_string(),
            Some(json!({ "param": key, "value": v })),
        )
    })
}

fn roles_param(req: &Request) -> Result<(Role, Role), serde_json::Value> {
    Ok((role_param(req, "viewerRole")?, role_param(req, "targetRole")?))
}

fn handle_fields_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (viewer, target) = match roles_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let fields = get_form_fields(&state.cfg.visibility, viewer, target);
    ok(&req.id, json!(fields))
}

#[derive(Clone, Copy)]
enum FilterPath {
    Submission,
    Display,
}

fn handle_fields_filter(state: &mut AppState, req: &Request, path: FilterPath) -> serde_json::Value {
    let (viewer, target) = match roles_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let record = match req.params.get("record") {
        Some(serde_json::Value::Object(m)) => m,
        Some(_) => return err(&req.id, Code::BadParams, "record must be an object", None),
        None => return err(&req.id, Code::BadParams, "missing record", None),
    };

    let table = &state.cfg.visibility;
    let filtered = match path {
        FilterPath::Submission => filter_for_submission(record, table, viewer, target),
        FilterPath::Display => filter_for_display(record, table, viewer, target),
    };
    let dropped = record.len() - filtered.len();
    if dropped > 0 {
        log::debug!(
            "{} viewing {}: dropped {} of {} fields",
            viewer,
            target,
            dropped,
            record.len()
        );
    }
    ok(&req.id, json!({ "record": filtered }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "fields.get" => Some(handle_fields_get(state, req)),
        "fields.filterForSubmission" => {
            Some(handle_fields_filter(state, req, FilterPath::Submission))
        }
        "fields.filterForDisplay" => Some(handle_fields_filter(state, req, FilterPath::Display)),
        _ => None,
    }
}
