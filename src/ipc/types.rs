use chrono::{DateTime, Utc};
use portald::config::Cfg;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub cfg: Cfg,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(cfg: Cfg) -> Self {
        Self {
            cfg,
            started_at: Utc::now(),
        }
    }
}
