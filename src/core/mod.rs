//! Core ledger logic, framework-agnostic.
//!
//! Every operation takes a database handle and an explicit [`TenantScope`];
//! nothing here knows about transports, schedulers or file formats.

/// Attachment metadata operations
pub mod attachment;
/// Bulk row import with per-row error reporting
pub mod import;
/// Account payable creation, queries and lifecycle transitions
pub mod payable;
/// Payment records and parent reconciliation
pub mod payment;
/// Recurrence projection and occurrence generation
pub mod recurrence;
/// Lookup-or-create for branches, suppliers, categories and payment methods
pub mod registry;
/// Dashboard rollups
pub mod report;
/// The status recompute rule and derived monetary fields
pub mod status;
/// Tenant scoping primitive
pub mod tenancy;

pub use tenancy::TenantScope;
