use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::store::{IdentityStore, StoreError};

/// What to do when a checked code is missing from the catalog (or disabled).
///
/// Historical call sites disagreed: the statistics path granted access when a
/// code was not yet seeded, stricter paths denied. The policy is therefore
/// chosen where each resolver is built, not unified globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCodePolicy {
    /// An unknown code is granted. The historical default.
    Grant,
    /// An unknown code is denied.
    Deny,
}

/// Which rule granted the permission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum GrantSource {
    /// The user owns the group.
    Owner { group_id: String },
    /// An active membership's role grants the code.
    Role { group_id: String, role_id: String },
    /// An active special override grants the code.
    Special,
    /// The code is not in the catalog and the policy grants by default.
    UnknownCode,
}

/// Outcome of a resolution call.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<GrantSource>,
}

/// The permission decision engine.
///
/// Pure read path over an [`IdentityStore`]: no interior state, no caching,
/// so a decision always reflects the store's current snapshot and concurrent
/// calls are independent. Store failures surface as `Err`; they never decide
/// the question.
pub struct PermissionResolver {
    store: Arc<dyn IdentityStore>,
    unknown_code_policy: UnknownCodePolicy,
}

impl PermissionResolver {
    /// Resolver with the historical fail-open policy for unknown codes.
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self::with_policy(store, UnknownCodePolicy::Grant)
    }

    pub fn with_policy(store: Arc<dyn IdentityStore>, policy: UnknownCodePolicy) -> Self {
        Self {
            store,
            unknown_code_policy: policy,
        }
    }

    /// Decide whether `user_id` may exercise `codigo`.
    ///
    /// Precedence:
    /// 1. owner bypass: owning the group (or any owned group when
    ///    `group_id` is `None`) grants everything, regardless of membership
    ///    status or whether the code is even in the catalog;
    /// 2. catalog check: an unknown or disabled code is logged and decided
    ///    by the configured [`UnknownCodePolicy`], never an error;
    /// 3. role grants: active memberships only, filtered to `group_id` when
    ///    supplied;
    /// 4. special overrides: active rows, independent of any group.
    pub fn resolve(
        &self,
        user_id: &str,
        codigo: &str,
        group_id: Option<&str>,
    ) -> Result<AccessDecision, StoreError> {
        let views = self.store.groups_owned_or_joined(user_id)?;

        for view in &views {
            if view.owner_id == user_id && group_id.map_or(true, |g| g == view.group_id) {
                return Ok(AccessDecision {
                    allowed: true,
                    source: Some(GrantSource::Owner {
                        group_id: view.group_id.clone(),
                    }),
                });
            }
        }

        if !self.store.permission_code_exists(codigo)? {
            warn!(
                codigo = %codigo,
                policy = ?self.unknown_code_policy,
                "permission code not in catalog"
            );
            return Ok(match self.unknown_code_policy {
                UnknownCodePolicy::Grant => AccessDecision {
                    allowed: true,
                    source: Some(GrantSource::UnknownCode),
                },
                UnknownCodePolicy::Deny => AccessDecision {
                    allowed: false,
                    source: None,
                },
            });
        }

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
            let granted = self.store.role_permission_codes(role_id)?;
            if granted.iter().any(|c| c == codigo) {
                return Ok(AccessDecision {
                    allowed: true,
                    source: Some(GrantSource::Role {
                        group_id: view.group_id.clone(),
                        role_id: role_id.to_string(),
                    }),
                });
            }
        }

        let special = self.store.special_permission_codes(user_id)?;
        if special.iter().any(|c| c == codigo) {
            return Ok(AccessDecision {
                allowed: true,
                source: Some(GrantSource::Special),
            });
        }

        debug!(user_id = %user_id, codigo = %codigo, "no grant source");
        Ok(AccessDecision {
            allowed: false,
            source: None,
        })
    }

    /// Boolean shorthand over [`resolve`](Self::resolve).
    pub fn has_permission(
        &self,
        user_id: &str,
        codigo: &str,
        group_id: Option<&str>,
    ) -> Result<bool, StoreError> {
        Ok(self.resolve(user_id, codigo, group_id)?.allowed)
    }
}
