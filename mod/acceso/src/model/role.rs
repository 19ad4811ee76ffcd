use serde::{Deserialize, Serialize};

/// A named permission set granted through memberships.
///
/// `es_activo` is administrative bookkeeping only. Resolution filters on
/// the membership's status and the permission's `activo` flag, never on
/// this field: a deactivated role keeps granting through active
/// memberships until those are retired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Role name, unique across the catalog (e.g. "administrador").
    pub name: String,

    /// Administrative active flag.
    #[serde(default = "default_true")]
    pub es_activo: bool,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a new role.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
}

fn default_true() -> bool {
    true
}
