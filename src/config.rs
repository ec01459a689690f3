/*!
Start-up configuration.

Everything here is read once, before the first request, and never changes
afterwards. A missing config file just means defaults.
*/
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use simplelog::LevelFilter;

use crate::roles::Role;
use crate::visibility::{FieldSet, TableError, VisibilityTable};

pub const CONFIG_ENV: &str = "PORTALD_CONFIG";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// What to answer when a list payload has no shape we know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnrecognizedShape {
    /// Answer an empty list, tagged as unrecognized.
    #[default]
    Empty,
    /// Answer an `unrecognized_shape` error.
    Reject,
}

impl UnrecognizedShape {
    pub fn as_str(self) -> &'static str {
        match self {
            UnrecognizedShape::Empty => "empty",
            UnrecognizedShape::Reject => "reject",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("unable to deserialize config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0:?} is not a valid log level")]
    LogLevel(String),
    #[error("unknown role {0:?} in [visibility]")]
    Role(String),
    #[error("{0} is listed more than once in [visibility]")]
    DuplicateRole(Role),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    log_level: Option<String>,
    unrecognized_shape: Option<UnrecognizedShape>,
    visibility: Option<HashMap<String, FieldSet>>,
}

#[derive(Debug)]
pub struct Cfg {
    pub log_level: LevelFilter,
    pub unrecognized_shape: UnrecognizedShape,
    pub visibility: VisibilityTable,
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
            unrecognized_shape: UnrecognizedShape::Empty,
            visibility: VisibilityTable::builtin(),
        }
    }
}

impl Cfg {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cf: ConfigFile = toml::from_str(text)?;
        let mut c = Self::default();

        if let Some(s) = cf.log_level {
            c.log_level = parse_level(&s).ok_or(ConfigError::LogLevel(s))?;
        }
        if let Some(u) = cf.unrecognized_shape {
            c.unrecognized_shape = u;
        }
        if let Some(entries) = cf.visibility {
            let mut parsed = Vec::with_capacity(entries.len());
            for (name, set) in entries {
                let role: Role = name.parse().map_err(|_| ConfigError::Role(name.clone()))?;
                // `admin`, `Admin` and `1` are all the same table key
                if parsed.iter().any(|(r, _)| *r == role) {
                    return Err(ConfigError::DuplicateRole(role));
                }
                parsed.push((role, set));
            }
            c.visibility = VisibilityTable::from_entries(parsed)?;
        }

        Ok(c)
    }

    /// `LOG_LEVEL` wins over whatever the file said. Returns the variable's
    /// value when it was set but not a level.
    pub fn apply_env(&mut self) -> Option<String> {
        let s = std::env::var(LOG_LEVEL_ENV).ok()?;
        match parse_level(&s) {
            Some(l) => {
                self.log_level = l;
                None
            }
            None => Some(s),
        }
    }
}

pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "max" | "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}
