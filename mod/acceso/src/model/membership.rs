use serde::{Deserialize, Serialize};

/// Well-known status values.
///
/// Status is an open string in the data; `activo` is the only value that
/// counts as active. Retired rows usually carry `inactivo`, but any other
/// value is treated the same way.
pub mod status {
    pub const ACTIVO: &str = "activo";
    pub const INACTIVO: &str = "inactivo";
}

/// A user's membership in a group, carrying the role that applies there.
///
/// Memberships are never hard-deleted: retiring one flips `status` to
/// `inactivo` and the row stays as history. At most one membership per
/// (user, group) may be active at a time; the schema enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// The member.
    pub user_id: String,

    /// The group joined.
    pub group_id: String,

    /// The role held within the group.
    pub role_id: String,

    /// Membership status; see [`status`].
    pub status: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

impl Membership {
    /// Whether the membership currently grants anything.
    pub fn is_active(&self) -> bool {
        self.status == status::ACTIVO
    }
}

/// Input for assigning a user to a group with a role.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignMembership {
    pub user_id: String,
    pub group_id: String,
    pub role_id: String,
}

/// One row of the owned-or-joined view that permission resolution reads.
///
/// `role_id` and `status` are `None` for a group the user owns without
/// holding a membership row in it.
#[derive(Debug, Clone)]
pub struct MembershipView {
    pub group_id: String,
    pub owner_id: String,
    pub role_id: Option<String>,
    pub status: Option<String>,
}

impl MembershipView {
    /// Whether this row is an active membership.
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some(status::ACTIVO)
    }
}

/// One group relationship, as reported to callers.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipSummary {
    pub group_id: String,

    /// Role held through a membership row, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,

    /// Membership status, if a row exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Whether the user owns the group.
    pub is_owner: bool,
}
