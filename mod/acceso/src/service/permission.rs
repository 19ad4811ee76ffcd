use std::collections::HashSet;

use tracing::debug;

use negocio_core::{ListParams, ListResult, new_id, now_rfc3339};
use negocio_sql::Value;

use crate::model::{AtomicPermission, SpecialPermission, User, special_permission_id, status};
use crate::service::{AccessError, AccessService};
use crate::store::IdentityStore;

impl AccessService {
    /// Add a code to the catalog, reactivating it if it was disabled.
    pub fn register_permission(&self, codigo: &str) -> Result<AtomicPermission, AccessError> {
        let codigo = codigo.trim();
        if codigo.is_empty() {
            return Err(AccessError::Validation(
                "permission code required".to_string(),
            ));
        }

        if let Some(mut existing) = self.find_permission(codigo)? {
            if !existing.activo {
                existing.activo = true;
                existing.updated_at = now_rfc3339();
                self.update_record(
                    "permissions",
                    &existing.id,
                    &existing,
                    &[
                        ("activo", Value::Integer(1)),
                        ("updated_at", Value::Text(existing.updated_at.clone())),
                    ],
                )?;
            }
            return Ok(existing);
        }

        let now = now_rfc3339();
        let permission = AtomicPermission {
            id: new_id(),
            codigo: codigo.to_string(),
            activo: true,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "permissions",
            &permission.id,
            &permission,
            &[
                ("codigo", Value::Text(permission.codigo.clone())),
                ("activo", Value::Integer(1)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(permission)
    }

    pub fn get_permission(&self, codigo: &str) -> Result<AtomicPermission, AccessError> {
        self.find_permission(codigo)?
            .ok_or_else(|| AccessError::NotFound(format!("permissions/{}", codigo)))
    }

    /// Disable or re-enable a catalog code. A disabled code behaves like an
    /// unknown one during resolution.
    pub fn set_permission_active(
        &self,
        codigo: &str,
        active: bool,
    ) -> Result<AtomicPermission, AccessError> {
        let mut permission = self.get_permission(codigo)?;
        permission.activo = active;
        permission.updated_at = now_rfc3339();

        self.update_record(
            "permissions",
            &permission.id,
            &permission,
            &[
                ("activo", Value::Integer(active as i64)),
                ("updated_at", Value::Text(permission.updated_at.clone())),
            ],
        )?;

        Ok(permission)
    }

    pub fn list_permissions(
        &self,
        params: &ListParams,
    ) -> Result<ListResult<AtomicPermission>, AccessError> {
        let (items, total) =
            self.list_records("permissions", &[], params.limit, params.offset)?;
        Ok(ListResult { items, total })
    }

    fn find_permission(&self, codigo: &str) -> Result<Option<AtomicPermission>, AccessError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM permissions WHERE codigo = ?1",
                &[Value::Text(codigo.to_string())],
            )
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        match rows.first() {
            None => Ok(None),
            Some(row) => {
                let data = row
                    .get_str("data")
                    .ok_or_else(|| AccessError::Internal("missing data column".into()))?;
                let permission = serde_json::from_str(data)
                    .map_err(|e| AccessError::Internal(e.to_string()))?;
                Ok(Some(permission))
            }
        }
    }

    /// Grant a code directly to a user, outside any role.
    ///
    /// The row id is deterministic over (user, code), so re-granting a
    /// revoked override reactivates the same row.
    pub fn grant_special_permission(
        &self,
        user_id: &str,
        codigo: &str,
    ) -> Result<SpecialPermission, AccessError> {
        self.get_record::<User>("users", user_id)
            .map_err(|_| AccessError::Validation(format!("user '{}' does not exist", user_id)))?;

        let known = self
            .permission_code_exists(codigo)
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        if !known {
            return Err(AccessError::Validation(format!(
                "unknown or inactive permission code '{}'",
                codigo
            )));
        }

        let id = special_permission_id(user_id, codigo);
        if let Ok(mut existing) = self.get_record::<SpecialPermission>("special_permissions", &id)
        {
            existing.status = status::ACTIVO.to_string();
            existing.updated_at = now_rfc3339();
            self.update_record(
                "special_permissions",
                &id,
                &existing,
                &[
                    ("status", Value::Text(existing.status.clone())),
                    ("updated_at", Value::Text(existing.updated_at.clone())),
                ],
            )?;
            return Ok(existing);
        }

        let now = now_rfc3339();
        let special = SpecialPermission {
            id,
            user_id: user_id.to_string(),
            codigo: codigo.to_string(),
            status: status::ACTIVO.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "special_permissions",
            &special.id,
            &special,
            &[
                ("user_id", Value::Text(special.user_id.clone())),
                ("codigo", Value::Text(special.codigo.clone())),
                ("status", Value::Text(special.status.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(special)
    }

    /// Revoke a user's special permission. The row stays, flipped inactive.
    pub fn revoke_special_permission(
        &self,
        user_id: &str,
        codigo: &str,
    ) -> Result<(), AccessError> {
        let id = special_permission_id(user_id, codigo);
        let mut special: SpecialPermission = self.get_record("special_permissions", &id)?;

        special.status = status::INACTIVO.to_string();
        special.updated_at = now_rfc3339();

        self.update_record(
            "special_permissions",
            &id,
            &special,
            &[
                ("status", Value::Text(special.status.clone())),
                ("updated_at", Value::Text(special.updated_at.clone())),
            ],
        )?;

        debug!(user_id = %user_id, codigo = %codigo, "special permission revoked");
        Ok(())
    }

    /// Sorted union of every code the user can exercise.
    ///
    /// Owners get the full active catalog; everyone else gets role grants
    /// from active memberships (optionally group-scoped) plus active special
    /// overrides.
    pub fn effective_permissions(
        &self,
        user_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<String>, AccessError> {
        let views = self
            .groups_owned_or_joined(user_id)
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        let owns = views
            .iter()
            .any(|v| v.owner_id == user_id && group_id.map_or(true, |g| g == v.group_id));
        if owns {
            let rows = self
                .sql
                .query(
                    "SELECT codigo FROM permissions WHERE activo = 1 ORDER BY codigo",
                    &[],
                )
                .map_err(|e| AccessError::Storage(e.to_string()))?;

            let mut all = Vec::with_capacity(rows.len());
            for row in &rows {
                let codigo = row
                    .get_str("codigo")
                    .ok_or_else(|| AccessError::Internal("missing codigo column".into()))?;
                all.push(codigo.to_string());
            }
            return Ok(all);
        }

        let mut union = HashSet::new();
        for view in &views {
            if !view.is_active() {
                continue;
            }
            if let Some(g) = group_id {
                if view.group_id != g {
                    continue;
                }
            }
            let Some(role_id) = view.role_id.as_deref() else {
                continue;
            };
            let granted = self
                .role_permission_codes(role_id)
                .map_err(|e| AccessError::Storage(e.to_string()))?;
            union.extend(granted);
        }

        let special = self
            .special_permission_codes(user_id)
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        union.extend(special);

        let mut effective: Vec<String> = union.into_iter().collect();
        effective.sort();
        Ok(effective)
    }
}
