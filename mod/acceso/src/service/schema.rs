use tracing::debug;

use negocio_core::{new_id, now_rfc3339};
use negocio_sql::{SQLStore, Value};

use crate::codes;
use crate::model::{AtomicPermission, Role};
use crate::service::AccessError;

/// Initialize the SQLite schema for all access resources.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AccessError> {
    let statements = [
        // Users table: staff accounts
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            rol_global TEXT NOT NULL DEFAULT 'miembro',
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_users_name ON users(name)",

        // Groups table: tenant units, exactly one owner each
        "CREATE TABLE IF NOT EXISTS groups (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_groups_owner ON groups(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_groups_name ON groups(name)",

        // Roles table: named permission sets
        "CREATE TABLE IF NOT EXISTS roles (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            es_activo INTEGER NOT NULL DEFAULT 1,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_roles_name ON roles(name)",

        // Memberships: user-to-group with a role; retired rows stay
        "CREATE TABLE IF NOT EXISTS memberships (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            group_id TEXT NOT NULL,
            role_id TEXT NOT NULL,
            status TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (group_id) REFERENCES groups(id),
            FOREIGN KEY (role_id) REFERENCES roles(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_memberships_user ON memberships(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_memberships_group ON memberships(group_id)",
        // One live membership per (user, group); historical rows are exempt.
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_memberships_active
            ON memberships(user_id, group_id) WHERE status = 'activo'",

        // Permission catalog
        "CREATE TABLE IF NOT EXISTS permissions (
            id TEXT PRIMARY KEY,
            codigo TEXT NOT NULL,
            activo INTEGER NOT NULL DEFAULT 1,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_permissions_codigo ON permissions(codigo)",

        // Role-to-permission edges
        "CREATE TABLE IF NOT EXISTS role_permissions (
            role_id TEXT NOT NULL,
            codigo TEXT NOT NULL,
            added_at TEXT NOT NULL,
            PRIMARY KEY (role_id, codigo),
            FOREIGN KEY (role_id) REFERENCES roles(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_role_permissions_codigo ON role_permissions(codigo)",

        // Per-user overrides, independent of any group
        "CREATE TABLE IF NOT EXISTS special_permissions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            codigo TEXT NOT NULL,
            status TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_special_permissions_user ON special_permissions(user_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| AccessError::Storage(e.to_string()))?;
    }

    Ok(())
}

/// Seed the default permission catalog and roles.
///
/// Idempotent: existing rows are left untouched, so this runs on every
/// startup.
pub fn seed_defaults(sql: &dyn SQLStore) -> Result<(), AccessError> {
    for codigo in codes::DEFAULT_CATALOG {
        let now = now_rfc3339();
        let permission = AtomicPermission {
            id: new_id(),
            codigo: (*codigo).to_string(),
            activo: true,
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        let data = serde_json::to_string(&permission)
            .map_err(|e| AccessError::Internal(e.to_string()))?;

        sql.exec(
            "INSERT OR IGNORE INTO permissions (id, codigo, activo, data, created_at, updated_at)
                VALUES (?1, ?2, 1, ?3, ?4, ?5)",
            &[
                Value::Text(permission.id),
                Value::Text(permission.codigo),
                Value::Text(data),
                Value::Text(now.clone()),
                Value::Text(now),
            ],
        )
        .map_err(|e| AccessError::Storage(e.to_string()))?;
    }

    for &(name, grants) in codes::DEFAULT_ROLES {
        seed_role(sql, name, grants)?;
    }

    debug!("seeded default permission catalog and roles");
    Ok(())
}

/// Ensure a named role exists and carries at least the given grants.
fn seed_role(sql: &dyn SQLStore, name: &str, grants: &[&str]) -> Result<(), AccessError> {
    let rows = sql
        .query(
            "SELECT id FROM roles WHERE name = ?1",
            &[Value::Text(name.to_string())],
        )
        .map_err(|e| AccessError::Storage(e.to_string()))?;

    let role_id = match rows.first().and_then(|r| r.get_str("id")) {
        Some(id) => id.to_string(),
        None => {
            let now = now_rfc3339();
            let role = Role {
                id: new_id(),
                name: name.to_string(),
                es_activo: true,
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            let data = serde_json::to_string(&role)
                .map_err(|e| AccessError::Internal(e.to_string()))?;

            sql.exec(
                "INSERT INTO roles (id, name, es_activo, data, created_at, updated_at)
                    VALUES (?1, ?2, 1, ?3, ?4, ?5)",
                &[
                    Value::Text(role.id.clone()),
                    Value::Text(role.name),
                    Value::Text(data),
                    Value::Text(now.clone()),
                    Value::Text(now),
                ],
            )
            .map_err(|e| AccessError::Storage(e.to_string()))?;
            role.id
        }
    };

    for codigo in grants {
        sql.exec(
            "INSERT OR IGNORE INTO role_permissions (role_id, codigo, added_at) VALUES (?1, ?2, ?3)",
            &[
                Value::Text(role_id.clone()),
                Value::Text((*codigo).to_string()),
                Value::Text(now_rfc3339()),
            ],
        )
        .map_err(|e| AccessError::Storage(e.to_string()))?;
    }

    Ok(())
}
