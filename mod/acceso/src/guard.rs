use thiserror::Error;
use tracing::{debug, error};

use negocio_core::ServiceError;

use crate::resolver::PermissionResolver;
use crate::store::StoreError;

/// Why a guarded operation was refused.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Resolution completed and the answer is no.
    #[error("permission denied: {codigo}")]
    Denied { codigo: String },

    /// The identity store could not answer. Never a grant, never a deny.
    #[error("permission resolution failed: {0}")]
    ResolutionFailed(#[from] StoreError),
}

impl From<GuardError> for ServiceError {
    fn from(e: GuardError) -> Self {
        let msg = e.to_string();
        match e {
            GuardError::Denied { .. } => ServiceError::PermissionDenied(msg),
            GuardError::ResolutionFailed(_) => ServiceError::Storage(msg),
        }
    }
}

/// The consumption point for protected operations.
///
/// A refused caller learns only which code was checked, not which rule
/// refused it. Store failures stay distinguishable from denials so the
/// boundary above can answer with a server error instead of a forbidden.
pub struct AccessGuard {
    resolver: PermissionResolver,
}

impl AccessGuard {
    pub fn new(resolver: PermissionResolver) -> Self {
        Self { resolver }
    }

    /// Fail unless `user_id` may exercise `codigo`.
    pub fn require_permission(
        &self,
        user_id: &str,
        codigo: &str,
        group_id: Option<&str>,
    ) -> Result<(), GuardError> {
        let decision = self
            .resolver
            .resolve(user_id, codigo, group_id)
            .map_err(|e| {
                error!(user_id = %user_id, codigo = %codigo, error = %e, "permission resolution failed");
                e
            })?;

        if decision.allowed {
            Ok(())
        } else {
            debug!(user_id = %user_id, codigo = %codigo, "permission denied");
            Err(GuardError::Denied {
                codigo: codigo.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use negocio_core::ServiceError;
    use negocio_core::error::error_code;
    use negocio_sql::SqliteStore;

    use super::{AccessGuard, GuardError};
    use crate::codes;
    use crate::model::{CreateGroup, CreateUser, MembershipView};
    use crate::resolver::{PermissionResolver, UnknownCodePolicy};
    use crate::service::{AccessConfig, AccessService};
    use crate::store::{IdentityStore, StoreError};

    fn test_service() -> Arc<AccessService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AccessService::new(sql, AccessConfig::default()).unwrap()
    }

    #[test]
    fn test_guard_passes_the_owner_through() {
        let svc = test_service();
        let owner = svc
            .create_user(CreateUser {
                name: "dueña".to_string(),
                credential_hash: None,
                rol_global: Some("propietario".to_string()),
            })
            .unwrap();
        let group = svc
            .create_group(CreateGroup {
                name: "Papelería Centro".to_string(),
                owner_id: owner.id.clone(),
            })
            .unwrap();

        let guard = AccessGuard::new(PermissionResolver::new(svc));
        guard
            .require_permission(&owner.id, codes::TRABAJADORES_EDITAR, Some(&group.id))
            .unwrap();
    }

    #[test]
    fn test_guard_refuses_without_a_grant() {
        let svc = test_service();
        let user = svc
            .create_user(CreateUser {
                name: "empleada".to_string(),
                credential_hash: None,
                rol_global: None,
            })
            .unwrap();

        let guard = AccessGuard::new(PermissionResolver::new(svc));
        let err = guard
            .require_permission(&user.id, codes::TRABAJADORES_EDITAR, None)
            .unwrap_err();
        assert!(matches!(err, GuardError::Denied { .. }));
    }

    struct FailingStore;

    impl IdentityStore for FailingStore {
        fn groups_owned_or_joined(
            &self,
            _user_id: &str,
        ) -> Result<Vec<MembershipView>, StoreError> {
            Err(StoreError::Unavailable("sqlite gone".to_string()))
        }

        fn role_permission_codes(&self, _role_id: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("sqlite gone".to_string()))
        }

        fn special_permission_codes(&self, _user_id: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("sqlite gone".to_string()))
        }

        fn permission_code_exists(&self, _codigo: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("sqlite gone".to_string()))
        }
    }

    #[test]
    fn test_store_failure_is_not_a_denial() {
        let guard = AccessGuard::new(PermissionResolver::with_policy(
            Arc::new(FailingStore),
            UnknownCodePolicy::Deny,
        ));

        let err = guard
            .require_permission("u1", codes::INVENTARIO_LEER, None)
            .unwrap_err();
        assert!(matches!(err, GuardError::ResolutionFailed(_)));
    }

    #[test]
    fn test_guard_errors_map_to_stable_codes() {
        let denied: ServiceError = GuardError::Denied {
            codigo: codes::INVENTARIO_LEER.to_string(),
        }
        .into();
        assert_eq!(denied.error_code(), error_code::PERMISSION_DENIED);

        let failed: ServiceError =
            GuardError::ResolutionFailed(StoreError::Unavailable("sqlite gone".to_string()))
                .into();
        assert_eq!(failed.error_code(), error_code::STORAGE_ERROR);
    }
}
