//! Payment method entity, unique by (tenant, name case-insensitive).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment method database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    /// Unique identifier for the payment method
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant
    pub tenant_id: i64,
    /// Method name (stored upper-cased), e.g. "BANK SLIP"
    pub name: String,
    pub description: String,
    /// Soft delete flag
    pub is_active: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One payment method has many obligations
    #[sea_orm(has_many = "super::account_payable::Entity")]
    AccountsPayable,
    /// One payment method has many payment records
    #[sea_orm(has_many = "super::payable_payment::Entity")]
    Payments,
}

impl Related<super::account_payable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountsPayable.def()
    }
}

impl Related<super::payable_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
