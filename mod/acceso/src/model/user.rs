use serde::{Deserialize, Serialize};

/// A staff account known to the access module.
///
/// Credentials are issued and verified elsewhere; the hash is stored as
/// an opaque string and never interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Opaque credential hash, if one has been provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_hash: Option<String>,

    /// Coarse account tag ("propietario", "miembro", ...). Informational
    /// only; permission resolution never consults it.
    #[serde(default = "default_rol_global")]
    pub rol_global: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    #[serde(default)]
    pub credential_hash: Option<String>,
    #[serde(default)]
    pub rol_global: Option<String>,
}

fn default_rol_global() -> String {
    "miembro".to_string()
}
