//! Tenant scoping primitive.
//!
//! Every core operation takes a `TenantScope` explicitly; nothing in this
//! crate looks a tenant up from ambient state. Queries filter by it, writes
//! stamp it, and a by-id lookup that lands outside the scope reports
//! not-found rather than revealing the record exists.

use serde::{Deserialize, Serialize};

/// Opaque identifier of the tenant an operation runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantScope(i64);

impl TenantScope {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TenantScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tenant:{}", self.0)
    }
}
