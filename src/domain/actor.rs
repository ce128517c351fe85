use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    ColonyAdmin,
    BlockManager,
    Resident,
    Unrecognized(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::ColonyAdmin => "colony_admin",
            Role::BlockManager => "block_manager",
            Role::Resident => "resident",
            Role::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "super_admin" => Role::SuperAdmin,
            "colony_admin" => Role::ColonyAdmin,
            "block_manager" => Role::BlockManager,
            "resident" => Role::Resident,
            _ => Role::Unrecognized(trimmed.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId(id.into()),
            role,
        }
    }
}
