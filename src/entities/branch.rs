//! Branch entity - the business location an obligation belongs to.
//!
//! Same identification rules as suppliers: unique by (tenant, tax id) when a
//! tax id is present, matched by name otherwise.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Branch database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "branches")]
pub struct Model {
    /// Unique identifier for the branch
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant
    pub tenant_id: i64,
    /// Branch name (stored upper-cased)
    pub name: String,
    /// Fiscal registration number, digits only, exactly 14 when present
    pub tax_id: Option<String>,
    pub notes: String,
    /// Display name of the branch's bank account, e.g. "MAIN - CHECKING"
    pub bank_account_name: String,
    pub bank_account_description: String,
    /// Soft delete flag
    pub is_active: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One branch has many obligations
    #[sea_orm(has_many = "super::account_payable::Entity")]
    AccountsPayable,
}

impl Related<super::account_payable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountsPayable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
