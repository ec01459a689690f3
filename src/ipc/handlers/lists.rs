use crate::ipc::error::{err, ok, Code};
use crate::ipc::types::{AppState, Request};
use portald::config::UnrecognizedShape;
use portald::normalize::{
    classify, grouped_shape, normalize_classified, normalize_grouped_list, Shape, CLASS_ORDER,
    COURSE_ORDER,
};
use serde_json::json;

fn payload_param(req: &Request) -> Result<&serde_json::Value, serde_json::Value> {
    req.params
        .get("payload")
        .ok_or_else(|| err(&req.id, Code::BadParams, "missing payload", None))
}

/// Applies the configured policy for payloads of no known shape. `Err` is the
/// response to send instead of a list.
fn check_shape(state: &AppState, req: &Request, shape: Shape) -> Result<(), serde_json::Value> {
    if shape != Shape::Unrecognized {
        return Ok(());
    }
    log::warn!("{} {}: unrecognized payload shape", req.id, req.method);
    match state.cfg.unrecognized_shape {
        UnrecognizedShape::Empty => Ok(()),
        UnrecognizedShape::Reject => Err(err(
            &req.id,
            Code::UnrecognizedShape,
            "payload is not a list, a role-grouped object or a status-grouped object",
            Some(json!({ "method": req.method })),
        )),
    }
}

fn handle_lists_classify(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let payload = match payload_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(&req.id, json!({ "shape": classify(payload).shape() }))
}

fn handle_users_normalize(state: &mut AppState, req: &Request) -> serde_json::Value {
    let payload = match payload_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let classified = classify(payload);
    let shape = classified.shape();
    if let Err(resp) = check_shape(state, req, shape) {
        return resp;
    }
    let records = normalize_classified(&classified);
    log::debug!("{}: {} records from {} payload", req.id, records.len(), shape);
    ok(&req.id, json!({ "records": records, "shape": shape }))
}

fn grouped_response<S: AsRef<str>>(
    state: &AppState,
    req: &Request,
    order: &[S],
) -> serde_json::Value {
    let payload = match payload_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let shape = grouped_shape(payload, order);
    if let Err(resp) = check_shape(state, req, shape) {
        return resp;
    }
    let items = normalize_grouped_list(payload, order);
    ok(&req.id, json!({ "items": items, "shape": shape }))
}

fn handle_lists_normalize_grouped(state: &mut AppState, req: &Request) -> serde_json::Value {
    let order: Vec<String> = match req.params.get("groupOrder") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(o) => o,
            Err(e) => {
                return err(
                    &req.id,
                    Code::BadParams,
                    format!("groupOrder must be an array of strings: {e}"),
                    None,
                )
            }
        },
        None => return err(&req.id, Code::BadParams, "missing groupOrder", None),
    };
    if order.is_empty() {
        return err(&req.id, Code::BadParams, "groupOrder must not be empty", None);
    }
    if let Some((i, key)) = order
        .iter()
        .enumerate()
        .find(|&(i, k)| order[..i].contains(k))
    {
        return err(
            &req.id,
            Code::BadParams,
            format!("groupOrder repeats {key:?}"),
            Some(json!({ "index": i })),
        );
    }
    grouped_response(state, req, order.as_slice())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lists.classify" => Some(handle_lists_classify(state, req)),
        "users.normalize" => Some(handle_users_normalize(state, req)),
        "lists.normalizeGrouped" => Some(handle_lists_normalize_grouped(state, req)),
        "courses.normalize" => Some(grouped_response(state, req, &COURSE_ORDER)),
        "classes.normalize" => Some(grouped_response(state, req, &CLASS_ORDER)),
        _ => None,
    }
}
