/*!
Portal user roles.

Every record the portal handles carries exactly one [`Role`]. On the wire a
role is its small integer id; in config files and logs it is its name.
*/
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RoleError {
    #[error("{0} is not a valid role id")]
    UnknownId(i64),
    #[error("{0:?} is not a valid role name")]
    UnknownName(String),
    #[error("role must be a number or a string, got {0}")]
    WrongType(String),
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    pub fn id(self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::Teacher => 2,
            Role::Student => 3,
            Role::Parent => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
            Role::Parent => "Parent",
        }
    }

    /// Reads a role out of a request or payload field. Accepts the numeric
    /// id or the name.
    pub fn from_json(v: &Value) -> Result<Role, RoleError> {
        match v {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Role::try_from(i),
                None => Err(RoleError::WrongType(n.to_string())),
            },
            Value::String(s) => s.parse(),
            other => Err(RoleError::WrongType(json_kind(other).to_owned())),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<i64> for Role {
    type Error = RoleError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Teacher),
            3 => Ok(Role::Student),
            4 => Ok(Role::Parent),
            _ => Err(RoleError::UnknownId(id)),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Ok(id) = t.parse::<i64>() {
            return Role::try_from(id);
        }
        match t.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            _ => Err(RoleError::UnknownName(s.to_owned())),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        Role::from_json(&v).map_err(serde::de::Error::custom)
    }
}
