use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::{err, Code};

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    log::debug!("request {} {}", req.id, req.method);

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::fields::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::lists::try_handle(state, &req) {
        return resp;
    }

    log::warn!("unknown method {:?}", req.method);
    err(
        &req.id,
        Code::NotImplemented,
        format!("unknown method: {}", req.method),
        None,
    )
}
