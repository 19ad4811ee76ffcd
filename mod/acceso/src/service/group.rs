use negocio_core::{ListParams, ListResult, new_id, now_rfc3339};
use negocio_sql::Value;

use crate::model::{CreateGroup, Group, User};
use crate::service::{AccessError, AccessService};

impl AccessService {
    pub fn create_group(&self, input: CreateGroup) -> Result<Group, AccessError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AccessError::Validation("group name required".to_string()));
        }

        self.get_record::<User>("users", &input.owner_id).map_err(|_| {
            AccessError::Validation(format!("owner '{}' does not exist", input.owner_id))
        })?;

        let now = now_rfc3339();
        let group = Group {
            id: new_id(),
            name,
            owner_id: input.owner_id,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "groups",
            &group.id,
            &group,
            &[
                ("name", Value::Text(group.name.clone())),
                ("owner_id", Value::Text(group.owner_id.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(group)
    }

    pub fn get_group(&self, id: &str) -> Result<Group, AccessError> {
        self.get_record("groups", id)
    }

    pub fn list_groups(&self, params: &ListParams) -> Result<ListResult<Group>, AccessError> {
        let (items, total) = self.list_records("groups", &[], params.limit, params.offset)?;
        Ok(ListResult { items, total })
    }
}
