use std::collections::HashSet;

use tracing::debug;

use negocio_core::{new_id, now_rfc3339};
use negocio_sql::Value;

use crate::model::{AssignMembership, Group, Membership, MembershipSummary, Role, User, status};
use crate::service::{AccessError, AccessService};
use crate::store::IdentityStore;

impl AccessService {
    /// Assign a user to a group under a role. The membership starts active.
    ///
    /// A second active membership for the same (user, group) is a `Conflict`;
    /// retire the existing one first.
    pub fn assign_membership(&self, input: AssignMembership) -> Result<Membership, AccessError> {
        self.get_record::<User>("users", &input.user_id).map_err(|_| {
            AccessError::Validation(format!("user '{}' does not exist", input.user_id))
        })?;
        self.get_record::<Group>("groups", &input.group_id).map_err(|_| {
            AccessError::Validation(format!("group '{}' does not exist", input.group_id))
        })?;
        self.get_record::<Role>("roles", &input.role_id).map_err(|_| {
            AccessError::Validation(format!("role '{}' does not exist", input.role_id))
        })?;

        let now = now_rfc3339();
        let membership = Membership {
            id: new_id(),
            user_id: input.user_id,
            group_id: input.group_id,
            role_id: input.role_id,
            status: status::ACTIVO.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "memberships",
            &membership.id,
            &membership,
            &[
                ("user_id", Value::Text(membership.user_id.clone())),
                ("group_id", Value::Text(membership.group_id.clone())),
                ("role_id", Value::Text(membership.role_id.clone())),
                ("status", Value::Text(membership.status.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(membership)
    }

    /// Retire the active membership of a user in a group.
    ///
    /// The row is kept with status `"inactivo"`; there is no hard delete.
    pub fn retire_membership(&self, user_id: &str, group_id: &str) -> Result<(), AccessError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM memberships
                    WHERE user_id = ?1 AND group_id = ?2 AND status = 'activo'",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(group_id.to_string()),
                ],
            )
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        let row = rows.first().ok_or_else(|| {
            AccessError::NotFound(format!(
                "no active membership for user '{}' in group '{}'",
                user_id, group_id
            ))
        })?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AccessError::Internal("missing data column".into()))?;
        let mut membership: Membership =
            serde_json::from_str(data).map_err(|e| AccessError::Internal(e.to_string()))?;

        membership.status = status::INACTIVO.to_string();
        membership.updated_at = now_rfc3339();

        self.update_record(
            "memberships",
            &membership.id,
            &membership,
            &[
                ("status", Value::Text(membership.status.clone())),
                ("updated_at", Value::Text(membership.updated_at.clone())),
            ],
        )?;

        debug!(user_id = %user_id, group_id = %group_id, "membership retired");
        Ok(())
    }

    /// Active memberships of a group, oldest first.
    pub fn list_group_members(&self, group_id: &str) -> Result<Vec<Membership>, AccessError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM memberships
                    WHERE group_id = ?1 AND status = 'activo' ORDER BY created_at",
                &[Value::Text(group_id.to_string())],
            )
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        let mut members = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AccessError::Internal("missing data column".into()))?;
            members
                .push(serde_json::from_str(data).map_err(|e| AccessError::Internal(e.to_string()))?);
        }
        Ok(members)
    }

    /// Every group a user owns or has a membership row in, summarized.
    ///
    /// Owned groups with no membership row appear with `role_id`/`status` of
    /// `None`. An unknown user gets an empty list, not an error.
    pub fn list_memberships(&self, user_id: &str) -> Result<Vec<MembershipSummary>, AccessError> {
        let views = self
            .groups_owned_or_joined(user_id)
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        let joined: HashSet<&str> = views
            .iter()
            .filter(|v| v.status.is_some())
            .map(|v| v.group_id.as_str())
            .collect();

        let mut summaries = Vec::with_capacity(views.len());
        for view in &views {
            // The bare ownership row is redundant when a membership row covers
            // the same group.
            if view.status.is_none() && joined.contains(view.group_id.as_str()) {
                continue;
            }
            summaries.push(MembershipSummary {
                group_id: view.group_id.clone(),
                role_id: view.role_id.clone(),
                status: view.status.clone(),
                is_owner: view.owner_id == user_id,
            });
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use negocio_sql::SqliteStore;

    use crate::model::{AssignMembership, CreateGroup, CreateRole, CreateUser};
    use crate::service::{AccessConfig, AccessError, AccessService};

    fn test_service() -> Arc<AccessService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AccessService::new(sql, AccessConfig::default()).unwrap()
    }

    fn seeded() -> (Arc<AccessService>, String, String, String) {
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
        let role = svc
            .create_role(CreateRole {
                name: "trabajador".to_string(),
            })
            .unwrap();
        let user = svc
            .create_user(CreateUser {
                name: "empleada".to_string(),
                credential_hash: None,
                rol_global: None,
            })
            .unwrap();
        (svc, user.id, group.id, role.id)
    }

    #[test]
    fn test_assign_membership_rejects_unknown_references() {
        let (svc, user_id, group_id, role_id) = seeded();

        let err = svc
            .assign_membership(AssignMembership {
                user_id: "ghost".to_string(),
                group_id: group_id.clone(),
                role_id: role_id.clone(),
            })
            .unwrap_err();
        assert!(matches!(err, AccessError::Validation(_)));

        let err = svc
            .assign_membership(AssignMembership {
                user_id,
                group_id,
                role_id: "ghost".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, AccessError::Validation(_)));
    }

    #[test]
    fn test_second_active_membership_is_conflict() {
        let (svc, user_id, group_id, role_id) = seeded();

        svc.assign_membership(AssignMembership {
            user_id: user_id.clone(),
            group_id: group_id.clone(),
            role_id: role_id.clone(),
        })
        .unwrap();

        let err = svc
            .assign_membership(AssignMembership {
                user_id,
                group_id,
                role_id,
            })
            .unwrap_err();
        assert!(matches!(err, AccessError::Conflict(_)));
    }

    #[test]
    fn test_retire_then_reassign_creates_fresh_row() {
        let (svc, user_id, group_id, role_id) = seeded();

        let first = svc
            .assign_membership(AssignMembership {
                user_id: user_id.clone(),
                group_id: group_id.clone(),
                role_id: role_id.clone(),
            })
            .unwrap();

        svc.retire_membership(&user_id, &group_id).unwrap();

        let err = svc.retire_membership(&user_id, &group_id).unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));

        let second = svc
            .assign_membership(AssignMembership {
                user_id: user_id.clone(),
                group_id: group_id.clone(),
                role_id,
            })
            .unwrap();
        assert_ne!(first.id, second.id);

        let members = svc.list_group_members(&group_id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, second.id);
    }

    #[test]
    fn test_list_memberships_includes_owned_group_without_row() {
        let (svc, _user_id, group_id, _role_id) = seeded();

        let group = svc.get_group(&group_id).unwrap();
        let summaries = svc.list_memberships(&group.owner_id).unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].group_id, group_id);
        assert!(summaries[0].is_owner);
        assert!(summaries[0].role_id.is_none());
        assert!(summaries[0].status.is_none());
    }

    #[test]
    fn test_list_memberships_prefers_membership_row_over_placeholder() {
        let (svc, _user_id, group_id, role_id) = seeded();

        let group = svc.get_group(&group_id).unwrap();
        svc.assign_membership(AssignMembership {
            user_id: group.owner_id.clone(),
            group_id: group_id.clone(),
            role_id,
        })
        .unwrap();

        let summaries = svc.list_memberships(&group.owner_id).unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].is_owner);
        assert!(summaries[0].role_id.is_some());
    }

    #[test]
    fn test_list_memberships_unknown_user_is_empty() {
        let (svc, _, _, _) = seeded();
        let summaries = svc.list_memberships("nobody").unwrap();
        assert!(summaries.is_empty());
    }
}
