pub mod schema;
pub mod user;
pub mod group;
pub mod membership;
pub mod role;
pub mod permission;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use negocio_sql::{SQLStore, Value};

/// Access service error type.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AccessError> for negocio_core::ServiceError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::NotFound(m) => negocio_core::ServiceError::NotFound(m),
            AccessError::Conflict(m) => negocio_core::ServiceError::Conflict(m),
            AccessError::Validation(m) => negocio_core::ServiceError::Validation(m),
            AccessError::Storage(m) => negocio_core::ServiceError::Storage(m),
            AccessError::Internal(m) => negocio_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the access service.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Seed the default permission catalog and roles at construction.
    pub seed_defaults: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
        }
    }
}

/// The access service. Owns identity data (users, groups, memberships,
/// roles, permission catalog, overrides) and the queries permission
/// resolution reads through.
pub struct AccessService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl AccessService {
    /// Create a new AccessService, initializing the DB schema.
    ///
    /// Schema init and seeding are idempotent, so constructing a service
    /// over an existing database is safe.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        config: AccessConfig,
    ) -> Result<Arc<Self>, AccessError> {
        schema::init_schema(sql.as_ref())?;
        if config.seed_defaults {
            schema::seed_defaults(sql.as_ref())?;
        }
        Ok(Arc::new(Self { sql }))
    }

    // ── Generic record helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AccessError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AccessError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                AccessError::Conflict(msg)
            } else {
                AccessError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, AccessError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self.sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| AccessError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AccessError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| AccessError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AccessError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AccessError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql
            .exec(&sql, &params)
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(AccessError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// List records with optional filters and pagination.
    pub(crate) fn list_records<T: DeserializeOwned + Serialize>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<T>, usize), AccessError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        // Count
        let count_sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let count_rows = self.sql
            .query(&count_sql, &params)
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        // Items
        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            table, where_sql, limit_idx, offset_idx,
        );

        let rows = self.sql
            .query(&sql, &params)
            .map_err(|e| AccessError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AccessError::Internal("missing data column".into()))?;
            let item: T =
                serde_json::from_str(data).map_err(|e| AccessError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok((items, total))
    }
}
