use serde::{Deserialize, Serialize};

/// A tenant group. Every authorization question is asked relative to a
/// group: its owner passes every check, members get what their role
/// grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Group display name.
    pub name: String,

    /// The owning user. Exactly one per group.
    pub owner_id: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a new group.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub owner_id: String,
}
