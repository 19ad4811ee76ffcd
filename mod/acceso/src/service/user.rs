use negocio_core::{ListParams, ListResult, new_id, now_rfc3339};
use negocio_sql::Value;

use crate::model::{CreateUser, User};
use crate::service::{AccessError, AccessService};

impl AccessService {
    pub fn create_user(&self, input: CreateUser) -> Result<User, AccessError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AccessError::Validation("user name required".to_string()));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name,
            credential_hash: input.credential_hash,
            rol_global: input
                .rol_global
                .unwrap_or_else(|| "miembro".to_string()),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("name", Value::Text(user.name.clone())),
                ("rol_global", Value::Text(user.rol_global.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<User, AccessError> {
        self.get_record("users", id)
    }

    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<User>, AccessError> {
        let (items, total) = self.list_records("users", &[], params.limit, params.offset)?;
        Ok(ListResult { items, total })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use negocio_sql::SqliteStore;

    use crate::service::{AccessConfig, AccessService};

    fn test_service() -> Arc<AccessService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AccessService::new(sql, AccessConfig::default()).unwrap()
    }

    #[test]
    fn test_create_and_get_user() {
        let svc = test_service();

        let user = svc
            .create_user(crate::model::CreateUser {
                name: "Marta".to_string(),
                credential_hash: None,
                rol_global: None,
            })
            .unwrap();
        assert_eq!(user.rol_global, "miembro");

        let fetched = svc.get_user(&user.id).unwrap();
        assert_eq!(fetched.name, "Marta");
        assert_eq!(fetched.id, user.id);
    }

    #[test]
    fn test_create_user_rejects_blank_name() {
        let svc = test_service();

        let err = svc
            .create_user(crate::model::CreateUser {
                name: "   ".to_string(),
                credential_hash: None,
                rol_global: None,
            })
            .unwrap_err();
        assert!(matches!(err, crate::service::AccessError::Validation(_)));
    }

    #[test]
    fn test_list_users_pagination() {
        let svc = test_service();

        for i in 0..5 {
            svc.create_user(crate::model::CreateUser {
                name: format!("user-{i}"),
                credential_hash: None,
                rol_global: Some("propietario".to_string()),
            })
            .unwrap();
        }

        let page = svc
            .list_users(&negocio_core::ListParams { limit: 2, offset: 0 })
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_get_missing_user_is_not_found() {
        let svc = test_service();
        let err = svc.get_user("nope").unwrap_err();
        assert!(matches!(err, crate::service::AccessError::NotFound(_)));
    }
}
