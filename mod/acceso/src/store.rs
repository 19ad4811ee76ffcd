use thiserror::Error;

use negocio_sql::{Row, Value};

use crate::model::{MembershipView, status};
use crate::service::AccessService;

/// Failures at the identity read boundary.
///
/// The resolution engine never inspects the variant: any `StoreError` means
/// the question stays unanswered. It must never be converted into a grant or
/// a deny.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    #[error("identity store corrupt: {0}")]
    Corrupt(String),
}

/// Narrow read interface the resolution engine consumes.
///
/// Kept small so alternative backends and test doubles only implement the
/// four queries resolution actually needs.
pub trait IdentityStore: Send + Sync {
    /// Union of every group the user owns (role/status come back `None` when
    /// there is no membership row) and every membership row of the user
    /// regardless of status, joined to the group's owner.
    fn groups_owned_or_joined(&self, user_id: &str) -> Result<Vec<MembershipView>, StoreError>;

    /// Codes granted by a role, restricted to active catalog entries.
    fn role_permission_codes(&self, role_id: &str) -> Result<Vec<String>, StoreError>;

    /// Codes granted directly to a user via active special rows, restricted
    /// to active catalog entries.
    fn special_permission_codes(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Whether a code exists in the catalog with `activo = 1`. A disabled
    /// code behaves like an unknown one.
    fn permission_code_exists(&self, codigo: &str) -> Result<bool, StoreError>;
}

impl IdentityStore for AccessService {
    fn groups_owned_or_joined(&self, user_id: &str) -> Result<Vec<MembershipView>, StoreError> {
        let rows = self
            .sql
            .query(
                "SELECT g.id AS group_id, g.owner_id AS owner_id,
                        NULL AS role_id, NULL AS status
                    FROM groups g
                    WHERE g.owner_id = ?1
                 UNION ALL
                 SELECT m.group_id AS group_id, g.owner_id AS owner_id,
                        m.role_id AS role_id, m.status AS status
                    FROM memberships m
                    JOIN groups g ON g.id = m.group_id
                    WHERE m.user_id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut views = Vec::with_capacity(rows.len());
        for row in &rows {
            let group_id = row
                .get_str("group_id")
                .ok_or_else(|| StoreError::Corrupt("membership row without group_id".into()))?;
            let owner_id = row
                .get_str("owner_id")
                .ok_or_else(|| StoreError::Corrupt("membership row without owner_id".into()))?;
            views.push(MembershipView {
                group_id: group_id.to_string(),
                owner_id: owner_id.to_string(),
                role_id: row.get_str("role_id").map(str::to_string),
                status: row.get_str("status").map(str::to_string),
            });
        }
        Ok(views)
    }

    fn role_permission_codes(&self, role_id: &str) -> Result<Vec<String>, StoreError> {
        let rows = self
            .sql
            .query(
                "SELECT rp.codigo AS codigo
                    FROM role_permissions rp
                    JOIN permissions p ON p.codigo = rp.codigo
                    WHERE rp.role_id = ?1 AND p.activo = 1
                    ORDER BY rp.codigo",
                &[Value::Text(role_id.to_string())],
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        collect_codes(&rows)
    }

    fn special_permission_codes(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let rows = self
            .sql
            .query(
                "SELECT sp.codigo AS codigo
                    FROM special_permissions sp
                    JOIN permissions p ON p.codigo = sp.codigo
                    WHERE sp.user_id = ?1 AND sp.status = ?2 AND p.activo = 1
                    ORDER BY sp.codigo",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(status::ACTIVO.to_string()),
                ],
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        collect_codes(&rows)
    }

    fn permission_code_exists(&self, codigo: &str) -> Result<bool, StoreError> {
        let rows = self
            .sql
            .query(
                "SELECT 1 AS known FROM permissions WHERE codigo = ?1 AND activo = 1",
                &[Value::Text(codigo.to_string())],
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(!rows.is_empty())
    }
}

fn collect_codes(rows: &[Row]) -> Result<Vec<String>, StoreError> {
    let mut codes = Vec::with_capacity(rows.len());
    for row in rows {
        let codigo = row
            .get_str("codigo")
            .ok_or_else(|| StoreError::Corrupt("grant row without codigo".into()))?;
        codes.push(codigo.to_string());
    }
    Ok(codes)
}
