//! Account payable entity - one money-owed-to-supplier record.
//!
//! Each row carries its tenant, required branch/supplier/category references,
//! the monetary breakdown (original amount, discount, interest, fine, paid
//! amount), recurrence metadata, and the soft-delete lifecycle fields.
//! `status` and `paid_amount` are derived by the core layer and are never
//! written directly by callers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::{PayableStatus, RecurrenceFrequency};

/// Account payable database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts_payable")]
pub struct Model {
    /// Unique identifier for the obligation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant; assigned at creation, immutable thereafter
    pub tenant_id: i64,
    /// Branch responsible for this obligation
    pub branch_id: i64,
    /// Supplier the money is owed to
    pub supplier_id: i64,
    /// Expense category
    pub category_id: i64,
    /// Intended payment method, if known up front
    pub payment_method_id: Option<i64>,
    /// Template obligation that generated this occurrence, if any
    pub recurring_parent_id: Option<i64>,
    /// Human-readable description (stored upper-cased)
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub original_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub interest: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub fine: Decimal,
    /// Sum of payment records; maintained by reconciliation only
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub paid_amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    /// Derived status; see `core::status` for the recompute rule
    pub status: PayableStatus,
    pub is_recurring: bool,
    pub recurrence_frequency: Option<RecurrenceFrequency>,
    /// Invoice reference numbers, digits/commas/spaces only
    pub invoice_numbers: String,
    /// Bank-slip number, digits only
    pub bank_slip_number: String,
    pub notes: String,
    /// Soft delete flag - if false, the obligation is hidden but preserved
    pub is_active: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between accounts payable and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::payment_method::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_method::Column::Id"
    )]
    PaymentMethod,
    /// Template obligation for generated recurrence occurrences
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::RecurringParentId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    RecurringParent,
    /// One obligation has many payment records
    #[sea_orm(has_many = "super::payable_payment::Entity")]
    Payments,
}

impl Related<super::payable_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::payment_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
