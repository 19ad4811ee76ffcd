use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An atomic permission in the catalog, e.g. "inventario_leer".
///
/// The catalog is data: seeded at init, extended at runtime. During
/// resolution a code with `activo = false` behaves exactly like a code
/// the catalog has never seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicPermission {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// The permission code, unique across the catalog.
    pub codigo: String,

    /// Whether the code currently counts as known.
    #[serde(default = "default_true")]
    pub activo: bool,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// A per-user permission override, independent of any group.
///
/// Overrides are additive only: an `inactivo` row grants nothing and
/// revokes nothing. The id is derived from (user_id, codigo), so granting
/// the same code twice updates the one row instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialPermission {
    /// Deterministic id: hex(sha256(user_id + ":" + codigo)), first 32 chars.
    pub id: String,

    /// The user holding the override.
    pub user_id: String,

    /// The permission code granted.
    pub codigo: String,

    /// Override status; see [`status`](super::status).
    pub status: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Compute the deterministic special-permission id from (user_id, codigo).
pub fn special_permission_id(user_id: &str, codigo: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(codigo.as_bytes());
    let result = hasher.finalize();
    // First 16 bytes (32 hex chars) for a reasonably short, unique id.
    hex_encode(&result[..16])
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

fn default_true() -> bool {
    true
}
