//! Payable payment entity - one payment applied against an account payable.
//!
//! Payments are the single hard-delete case in the ledger: removing one
//! physically deletes the row, and reconciliation recomputes the parent's
//! paid amount from the rows that remain.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payable_payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant; always matches the parent obligation's tenant
    pub tenant_id: i64,
    /// Parent obligation this payment applies to
    pub account_payable_id: i64,
    pub payment_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub payment_method_id: i64,
    pub notes: String,
    /// Free-text bank account the payment was made from
    pub bank_account: String,
    /// Free-text bank transaction reference
    pub transaction_number: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between payments and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one obligation
    #[sea_orm(
        belongs_to = "super::account_payable::Entity",
        from = "Column::AccountPayableId",
        to = "super::account_payable::Column::Id",
        on_delete = "Cascade"
    )]
    AccountPayable,
    #[sea_orm(
        belongs_to = "super::payment_method::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_method::Column::Id"
    )]
    PaymentMethod,
}

impl Related<super::account_payable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountPayable.def()
    }
}

impl Related<super::payment_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
