//! Access module: multi-tenant permission resolution.
//!
//! Answers one question for the rest of the suite: may this user perform
//! this operation, in this group? Group owners pass every check; members
//! get whatever their role grants; per-user overrides come last.
//!
//! # Resources
//!
//! - **User**: staff account (credential hashes stay opaque here)
//! - **Group**: tenant unit with exactly one owner
//! - **Membership**: ties a user to a group with a role; retired by status flip, never deleted
//! - **Role**: named permission set
//! - **AtomicPermission**: catalog entry, e.g. "inventario_leer"
//! - **SpecialPermission**: per-user override, independent of any group
//!
//! # Usage
//!
//! ```ignore
//! use acceso::{AccessConfig, AccessService, AccessGuard, PermissionResolver};
//!
//! let svc = AccessService::new(sql, AccessConfig::default())?;
//! let guard = AccessGuard::new(PermissionResolver::new(svc.clone()));
//! guard.require_permission(&user_id, acceso::codes::INVENTARIO_LEER, Some(&group_id))?;
//! ```

pub mod codes;
pub mod guard;
pub mod model;
pub mod resolver;
pub mod service;
pub mod store;

pub use guard::{AccessGuard, GuardError};
pub use resolver::{AccessDecision, GrantSource, PermissionResolver, UnknownCodePolicy};
pub use service::{AccessConfig, AccessError, AccessService};
pub use store::{IdentityStore, StoreError};
