use std::collections::HashSet;

use negocio_core::{ListParams, ListResult, new_id, now_rfc3339};
use negocio_sql::Value;

use crate::model::{CreateRole, Role};
use crate::service::{AccessError, AccessService};
use crate::store::IdentityStore;

impl AccessService {
    pub fn create_role(&self, input: CreateRole) -> Result<Role, AccessError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AccessError::Validation("role name required".to_string()));
        }

        let now = now_rfc3339();
        let role = Role {
            id: new_id(),
            name,
            es_activo: true,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "roles",
            &role.id,
            &role,
            &[
                ("name", Value::Text(role.name.clone())),
                ("es_activo", Value::Integer(1)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(role)
    }

    pub fn get_role(&self, id: &str) -> Result<Role, AccessError> {
        self.get_record("roles", id)
    }

    pub fn list_roles(&self, params: &ListParams) -> Result<ListResult<Role>, AccessError> {
        let (items, total) = self.list_records("roles", &[], params.limit, params.offset)?;
        Ok(ListResult { items, total })
    }

    /// Flip a role's administrative flag. Resolution does not consult it.
    pub fn set_role_active(&self, id: &str, active: bool) -> Result<Role, AccessError> {
        let mut role: Role = self.get_record("roles", id)?;
        role.es_activo = active;
        role.updated_at = now_rfc3339();

        self.update_record(
            "roles",
            id,
            &role,
            &[
                ("es_activo", Value::Integer(active as i64)),
                ("updated_at", Value::Text(role.updated_at.clone())),
            ],
        )?;

        Ok(role)
    }

    /// Replace a role's grant set wholesale.
    ///
    /// Delete-then-reinsert runs as one transaction, so no permission check
    /// can observe the role with an empty grant set mid-update. Unknown or
    /// inactive codes fail validation before anything is written.
    pub fn replace_role_permissions(
        &self,
        role_id: &str,
        codes: &[&str],
    ) -> Result<(), AccessError> {
        self.get_record::<Role>("roles", role_id)?;

        let mut seen = HashSet::new();
        let mut deduped = Vec::with_capacity(codes.len());
        for codigo in codes {
            if seen.insert(*codigo) {
                deduped.push(*codigo);
            }
        }

        for codigo in &deduped {
            let known = self
                .permission_code_exists(codigo)
                .map_err(|e| AccessError::Storage(e.to_string()))?;
            if !known {
                return Err(AccessError::Validation(format!(
                    "unknown or inactive permission code '{}'",
                    codigo
                )));
            }
        }

        let mut statements: Vec<(&str, Vec<Value>)> = vec![(
            "DELETE FROM role_permissions WHERE role_id = ?1",
            vec![Value::Text(role_id.to_string())],
        )];
        for codigo in &deduped {
            statements.push((
                "INSERT INTO role_permissions (role_id, codigo, added_at) VALUES (?1, ?2, ?3)",
                vec![
                    Value::Text(role_id.to_string()),
                    Value::Text((*codigo).to_string()),
                    Value::Text(now_rfc3339()),
                ],
            ));
        }

        self.sql
            .exec_batch(&statements)
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use negocio_sql::SqliteStore;

    use crate::codes;
    use crate::model::CreateRole;
    use crate::service::{AccessConfig, AccessError, AccessService};
    use crate::store::IdentityStore;

    fn test_service() -> Arc<AccessService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AccessService::new(sql, AccessConfig::default()).unwrap()
    }

    #[test]
    fn test_role_name_is_unique() {
        let svc = test_service();

        svc.create_role(CreateRole {
            name: "cajero".to_string(),
        })
        .unwrap();

        let err = svc
            .create_role(CreateRole {
                name: "cajero".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, AccessError::Conflict(_)));
    }

    #[test]
    fn test_replace_role_permissions_round_trip() {
        let svc = test_service();
        let role = svc
            .create_role(CreateRole {
                name: "cajero".to_string(),
            })
            .unwrap();

        svc.replace_role_permissions(
            &role.id,
            &[codes::FOTOCOPIAS_CREAR, codes::FOTOCOPIAS_LEER],
        )
        .unwrap();

        let granted = svc.role_permission_codes(&role.id).unwrap();
        assert_eq!(
            granted,
            vec![
                codes::FOTOCOPIAS_CREAR.to_string(),
                codes::FOTOCOPIAS_LEER.to_string()
            ]
        );

        svc.replace_role_permissions(&role.id, &[codes::REPORTES_VER])
            .unwrap();
        let granted = svc.role_permission_codes(&role.id).unwrap();
        assert_eq!(granted, vec![codes::REPORTES_VER.to_string()]);
    }

    #[test]
    fn test_replace_rejects_unknown_code_and_keeps_old_set() {
        let svc = test_service();
        let role = svc
            .create_role(CreateRole {
                name: "cajero".to_string(),
            })
            .unwrap();

        svc.replace_role_permissions(&role.id, &[codes::INVENTARIO_LEER])
            .unwrap();

        let err = svc
            .replace_role_permissions(&role.id, &[codes::REPORTES_VER, "no_existe"])
            .unwrap_err();
        assert!(matches!(err, AccessError::Validation(_)));

        let granted = svc.role_permission_codes(&role.id).unwrap();
        assert_eq!(granted, vec![codes::INVENTARIO_LEER.to_string()]);
    }

    #[test]
    fn test_replace_dedupes_and_empty_clears() {
        let svc = test_service();
        let role = svc
            .create_role(CreateRole {
                name: "cajero".to_string(),
            })
            .unwrap();

        svc.replace_role_permissions(
            &role.id,
            &[codes::INVENTARIO_LEER, codes::INVENTARIO_LEER],
        )
        .unwrap();
        assert_eq!(svc.role_permission_codes(&role.id).unwrap().len(), 1);

        svc.replace_role_permissions(&role.id, &[]).unwrap();
        assert!(svc.role_permission_codes(&role.id).unwrap().is_empty());
    }

    #[test]
    fn test_set_role_active_flips_flag_only() {
        let svc = test_service();
        let role = svc
            .create_role(CreateRole {
                name: "cajero".to_string(),
            })
            .unwrap();
        assert!(role.es_activo);

        let updated = svc.set_role_active(&role.id, false).unwrap();
        assert!(!updated.es_activo);
        assert_eq!(svc.get_role(&role.id).unwrap().es_activo, false);
    }
}
