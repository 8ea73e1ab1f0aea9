//! Supplier entity - a party money is owed to, scoped to a tenant.
//!
//! Suppliers are unique by (tenant, tax id) when a tax id is present;
//! suppliers without one are matched by name only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    /// Unique identifier for the supplier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant
    pub tenant_id: i64,
    /// Supplier name (stored upper-cased)
    pub name: String,
    /// Fiscal registration number, digits only, exactly 14 when present
    pub tax_id: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
    /// Soft delete flag
    pub is_active: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One supplier has many obligations
    #[sea_orm(has_many = "super::account_payable::Entity")]
    AccountsPayable,
}

impl Related<super::account_payable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountsPayable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
