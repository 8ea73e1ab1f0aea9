//! Expense category entity, unique by (tenant, name case-insensitive).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant
    pub tenant_id: i64,
    /// Category name (stored upper-cased)
    pub name: String,
    pub description: String,
    /// Hex display color, e.g. "#FF5733", or empty
    pub color: String,
    /// Soft delete flag
    pub is_active: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many obligations
    #[sea_orm(has_many = "super::account_payable::Entity")]
    AccountsPayable,
}

impl Related<super::account_payable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountsPayable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
