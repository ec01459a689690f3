use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use portald::Role;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "startedAt": state.started_at.to_rfc3339(),
            "uptimeSecs": uptime.num_seconds().max(0),
            "unrecognizedShape": state.cfg.unrecognized_shape.as_str(),
        }),
    )
}

fn handle_roles_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let roles: Vec<serde_json::Value> = Role::ALL
        .iter()
        .map(|r| {
            json!({
                "id": r.id(),
                "name": r.name(),
                "hasVisibility": state.cfg.visibility.get(*r).is_some(),
            })
        })
        .collect();
    ok(&req.id, json!({ "roles": roles }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "roles.list" => Some(handle_roles_list(state, req)),
        _ => None,
    }
}
