//! Payment records and the reconciliation that keeps parents honest.
//!
//! A payment never edits the parent obligation directly. Every mutation
//! (record, update, delete) runs inside a transaction and finishes by
//! reconciling: the parent's paid amount becomes the sum of its surviving
//! payment rows and the status is recomputed from that. Payments are the
//! one hard-delete case in the ledger.

use crate::{
    core::{payable::get_payable, status::recompute_status, TenantScope},
    entities::{
        account_payable, payable_payment, PayablePayment, PaymentMethod,
        types::PayableStatus,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};

/// Input for recording a payment against an obligation.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub account_payable_id: i64,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub payment_method_id: i64,
    pub notes: String,
    pub bank_account: String,
    pub transaction_number: String,
}

/// Mutable attributes of an existing payment. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayment {
    pub payment_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub payment_method_id: Option<i64>,
    pub notes: Option<String>,
    pub bank_account: Option<String>,
    pub transaction_number: Option<String>,
}

/// Recomputes the parent's paid amount from its payment rows and applies
/// the status rule.
///
/// When every payment is gone and the obligation still reads as paid, the
/// status resets to `due` and the payment date clears before recompute, so
/// a past-due obligation correctly lands back on `overdue`.
pub async fn reconcile_payable<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    payable_id: i64,
    today: NaiveDate,
) -> Result<account_payable::Model> {
    let payable = get_payable(db, tenant, payable_id).await?;

    let payments = PayablePayment::find()
        .filter(payable_payment::Column::TenantId.eq(tenant.id()))
        .filter(payable_payment::Column::AccountPayableId.eq(payable_id))
        .all(db)
        .await?;
    let total: Decimal = payments.iter().map(|p| p.amount).sum();

    let mut status = payable.status;
    let mut payment_date = payable.payment_date;
    if total == Decimal::ZERO
        && matches!(status, PayableStatus::Paid | PayableStatus::PartiallyPaid)
    {
        status = PayableStatus::Due;
        payment_date = None;
    }

    let outcome = recompute_status(
        status,
        total,
        payable.final_amount(),
        payment_date.is_some(),
        payable.due_date,
        today,
    );
    if outcome.stamp_payment_date {
        payment_date = Some(today);
    }

    let mut active: account_payable::ActiveModel = payable.into();
    active.paid_amount = Set(total);
    active.status = Set(outcome.status);
    active.payment_date = Set(payment_date);
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

async fn check_payment_method<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    method_id: i64,
) -> Result<()> {
    let method = PaymentMethod::find_by_id(method_id)
        .filter(crate::entities::payment_method::Column::TenantId.eq(tenant.id()))
        .filter(crate::entities::payment_method::Column::IsActive.eq(true))
        .one(db)
        .await?;
    if method.is_none() {
        return Err(Error::not_found("payment method"));
    }
    Ok(())
}

fn validate_amount_against_remaining(amount: Decimal, remaining: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(
            "amount",
            "payment amount must be greater than zero",
        ));
    }
    if amount > remaining {
        return Err(Error::validation(
            "amount",
            format!("payment amount exceeds the remaining balance of {remaining}"),
        ));
    }
    Ok(())
}

/// Records a payment and reconciles the parent, atomically.
pub async fn record_payment<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    tenant: TenantScope,
    input: CreatePayment,
    today: NaiveDate,
) -> Result<(payable_payment::Model, account_payable::Model)> {
    let txn = db.begin().await?;

    let payable = get_payable(&txn, tenant, input.account_payable_id).await?;
    if payable.status == PayableStatus::Cancelled {
        return Err(Error::conflict(
            "cannot record a payment against a cancelled obligation",
        ));
    }
    validate_amount_against_remaining(input.amount, payable.remaining_amount())?;
    check_payment_method(&txn, tenant, input.payment_method_id).await?;

    let now = Utc::now();
    let payment = payable_payment::ActiveModel {
        tenant_id: Set(tenant.id()),
        account_payable_id: Set(payable.id),
        payment_date: Set(input.payment_date),
        amount: Set(input.amount),
        payment_method_id: Set(input.payment_method_id),
        notes: Set(input.notes),
        bank_account: Set(input.bank_account),
        transaction_number: Set(input.transaction_number),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let reconciled = reconcile_payable(&txn, tenant, payable.id, today).await?;
    txn.commit().await?;

    Ok((payment, reconciled))
}

async fn get_payment<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
) -> Result<payable_payment::Model> {
    PayablePayment::find_by_id(id)
        .filter(payable_payment::Column::TenantId.eq(tenant.id()))
        .one(db)
        .await?
        .ok_or(Error::not_found("payment"))
}

/// Updates a payment and reconciles the parent, atomically.
///
/// The amount check excludes the payment being edited from the remaining
/// balance, so raising a payment toward the full amount is legal.
pub async fn update_payment<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
    update: UpdatePayment,
    today: NaiveDate,
) -> Result<(payable_payment::Model, account_payable::Model)> {
    let txn = db.begin().await?;

    let existing = get_payment(&txn, tenant, id).await?;
    let payable = get_payable(&txn, tenant, existing.account_payable_id).await?;

    let amount = update.amount.unwrap_or(existing.amount);
    let remaining_excluding_self = payable.remaining_amount() + existing.amount;
    validate_amount_against_remaining(amount, remaining_excluding_self)?;

    if let Some(method_id) = update.payment_method_id {
        check_payment_method(&txn, tenant, method_id).await?;
    }

    let payable_id = existing.account_payable_id;
    let mut active: payable_payment::ActiveModel = existing.into();
    active.amount = Set(amount);
    if let Some(date) = update.payment_date {
        active.payment_date = Set(date);
    }
    if let Some(method_id) = update.payment_method_id {
        active.payment_method_id = Set(method_id);
    }
    if let Some(notes) = update.notes {
        active.notes = Set(notes);
    }
    if let Some(bank_account) = update.bank_account {
        active.bank_account = Set(bank_account);
    }
    if let Some(transaction_number) = update.transaction_number {
        active.transaction_number = Set(transaction_number);
    }
    active.updated_at = Set(Utc::now());
    let payment = active.update(&txn).await?;

    let reconciled = reconcile_payable(&txn, tenant, payable_id, today).await?;
    txn.commit().await?;

    Ok((payment, reconciled))
}

/// Physically deletes a payment and reconciles the parent, atomically.
pub async fn delete_payment<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
    today: NaiveDate,
) -> Result<account_payable::Model> {
    let txn = db.begin().await?;

    let existing = get_payment(&txn, tenant, id).await?;
    let payable_id = existing.account_payable_id;
    existing.delete(&txn).await?;

    let reconciled = reconcile_payable(&txn, tenant, payable_id, today).await?;
    txn.commit().await?;

    Ok(reconciled)
}

/// Lists the payments applied to one obligation, oldest payment date first.
pub async fn list_payments_for_payable<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    payable_id: i64,
) -> Result<Vec<payable_payment::Model>> {
    // Confirm the parent is visible within the tenant first
    get_payable(db, tenant, payable_id).await?;

    PayablePayment::find()
        .filter(payable_payment::Column::TenantId.eq(tenant.id()))
        .filter(payable_payment::Column::AccountPayableId.eq(payable_id))
        .order_by_asc(payable_payment::Column::PaymentDate)
        .order_by_asc(payable_payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
