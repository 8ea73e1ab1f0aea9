//! Account payable operations - create, query, update and lifecycle
//! transitions.
//!
//! All writes funnel through the status recompute rule in `core::status`, so
//! callers can never persist a status that disagrees with the monetary
//! fields. Reads filter by tenant and skip soft-deleted rows; a by-id lookup
//! outside the caller's tenant reports not-found.

use crate::{
    core::{
        recurrence::{self, RecurrenceOutcome},
        status::recompute_status,
        TenantScope,
    },
    entities::{
        account_payable, AccountPayable, Branch, Category, PaymentMethod, Supplier,
        types::{PayableStatus, RecurrenceFrequency},
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Input for creating an account payable.
#[derive(Debug, Clone)]
pub struct CreatePayable {
    pub branch_id: i64,
    pub supplier_id: i64,
    pub category_id: i64,
    pub payment_method_id: Option<i64>,
    pub description: String,
    pub original_amount: Decimal,
    pub discount: Decimal,
    pub interest: Decimal,
    pub fine: Decimal,
    /// Pre-existing paid amount, carried over by the bulk importer.
    /// Interactive creation leaves this at zero and records payments instead.
    pub paid_amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    /// Initial status before recompute; defaults to `Pending`.
    pub status: PayableStatus,
    pub is_recurring: bool,
    pub recurrence_frequency: Option<RecurrenceFrequency>,
    /// Total number of occurrences including this one, 1 to 60.
    pub recurrence_count: Option<u32>,
    pub invoice_numbers: String,
    pub bank_slip_number: String,
    pub notes: String,
}

impl CreatePayable {
    /// A minimal non-recurring input; optional fields start empty.
    #[must_use]
    pub fn new(
        branch_id: i64,
        supplier_id: i64,
        category_id: i64,
        description: impl Into<String>,
        original_amount: Decimal,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            branch_id,
            supplier_id,
            category_id,
            payment_method_id: None,
            description: description.into(),
            original_amount,
            discount: Decimal::ZERO,
            interest: Decimal::ZERO,
            fine: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            issue_date,
            due_date,
            payment_date: None,
            status: PayableStatus::Pending,
            is_recurring: false,
            recurrence_frequency: None,
            recurrence_count: None,
            invoice_numbers: String::new(),
            bank_slip_number: String::new(),
            notes: String::new(),
        }
    }
}

/// Result of a create: the persisted obligation plus the outcome of
/// recurrence generation when the input asked for it.
#[derive(Debug, Clone)]
pub struct CreatedPayable {
    pub payable: account_payable::Model,
    pub recurrence: Option<RecurrenceOutcome>,
}

/// Mutable attributes of an existing obligation. `None` leaves a field
/// untouched. Status, paid amount and payment date are derived and have no
/// entry here.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayable {
    pub branch_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<Option<i64>>,
    pub description: Option<String>,
    pub original_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub fine: Option<Decimal>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub invoice_numbers: Option<String>,
    pub bank_slip_number: Option<String>,
    pub notes: Option<String>,
}

/// Query filter for listing obligations. All criteria are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct PayableFilter {
    pub status: Option<PayableStatus>,
    pub branch_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub category_id: Option<i64>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
}

fn validate_amounts(
    original: Decimal,
    discount: Decimal,
    interest: Decimal,
    fine: Decimal,
) -> Result<()> {
    if original <= Decimal::ZERO {
        return Err(Error::validation(
            "original_amount",
            "original amount must be greater than zero",
        ));
    }
    if discount < Decimal::ZERO {
        return Err(Error::validation("discount", "discount cannot be negative"));
    }
    if interest < Decimal::ZERO {
        return Err(Error::validation("interest", "interest cannot be negative"));
    }
    if fine < Decimal::ZERO {
        return Err(Error::validation("fine", "fine cannot be negative"));
    }
    if discount > original {
        return Err(Error::validation(
            "discount",
            "discount cannot exceed the original amount",
        ));
    }
    Ok(())
}

fn validate_invoice_numbers(value: &str) -> Result<()> {
    if value
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c == ' ')
    {
        Ok(())
    } else {
        Err(Error::validation(
            "invoice_numbers",
            "invoice numbers may contain only digits, commas and spaces",
        ))
    }
}

fn validate_bank_slip_number(value: &str) -> Result<()> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::validation(
            "bank_slip_number",
            "bank slip number may contain only digits",
        ))
    }
}

async fn check_references<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    branch_id: i64,
    supplier_id: i64,
    category_id: i64,
    payment_method_id: Option<i64>,
) -> Result<()> {
    let branch = Branch::find_by_id(branch_id)
        .filter(crate::entities::branch::Column::TenantId.eq(tenant.id()))
        .filter(crate::entities::branch::Column::IsActive.eq(true))
        .one(db)
        .await?;
    if branch.is_none() {
        return Err(Error::not_found("branch"));
    }

    let supplier = Supplier::find_by_id(supplier_id)
        .filter(crate::entities::supplier::Column::TenantId.eq(tenant.id()))
        .filter(crate::entities::supplier::Column::IsActive.eq(true))
        .one(db)
        .await?;
    if supplier.is_none() {
        return Err(Error::not_found("supplier"));
    }

    let category = Category::find_by_id(category_id)
        .filter(crate::entities::category::Column::TenantId.eq(tenant.id()))
        .filter(crate::entities::category::Column::IsActive.eq(true))
        .one(db)
        .await?;
    if category.is_none() {
        return Err(Error::not_found("category"));
    }

    if let Some(method_id) = payment_method_id {
        let method = PaymentMethod::find_by_id(method_id)
            .filter(crate::entities::payment_method::Column::TenantId.eq(tenant.id()))
            .filter(crate::entities::payment_method::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if method.is_none() {
            return Err(Error::not_found("payment method"));
        }
    }

    Ok(())
}

/// Creates an obligation and, when requested, its recurrence occurrences.
///
/// `today` anchors the overdue check so callers (and tests) control the
/// clock. Recurrence generation runs after the parent is persisted; a
/// failed occurrence never rolls the parent back.
pub async fn create_payable<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    input: CreatePayable,
    today: NaiveDate,
) -> Result<CreatedPayable> {
    let description = input.description.trim().to_uppercase();
    if description.is_empty() {
        return Err(Error::validation(
            "description",
            "description cannot be empty",
        ));
    }

    validate_amounts(input.original_amount, input.discount, input.interest, input.fine)?;
    if input.paid_amount < Decimal::ZERO {
        return Err(Error::validation(
            "paid_amount",
            "paid amount cannot be negative",
        ));
    }
    validate_invoice_numbers(&input.invoice_numbers)?;
    validate_bank_slip_number(&input.bank_slip_number)?;

    if input.is_recurring && input.recurrence_frequency.is_none() {
        return Err(Error::validation(
            "recurrence_frequency",
            "recurring obligations must specify a frequency",
        ));
    }
    if let Some(count) = input.recurrence_count {
        if !(1..=60).contains(&count) {
            return Err(Error::validation(
                "recurrence_count",
                "recurrence count must be between 1 and 60",
            ));
        }
    }

    check_references(
        db,
        tenant,
        input.branch_id,
        input.supplier_id,
        input.category_id,
        input.payment_method_id,
    )
    .await?;

    let final_amount = input.original_amount - input.discount + input.interest + input.fine;
    let outcome = recompute_status(
        input.status,
        input.paid_amount,
        final_amount,
        input.payment_date.is_some(),
        input.due_date,
        today,
    );
    let payment_date = if outcome.stamp_payment_date {
        Some(today)
    } else {
        input.payment_date
    };

    let now = Utc::now();
    let parent = account_payable::ActiveModel {
        tenant_id: Set(tenant.id()),
        branch_id: Set(input.branch_id),
        supplier_id: Set(input.supplier_id),
        category_id: Set(input.category_id),
        payment_method_id: Set(input.payment_method_id),
        recurring_parent_id: Set(None),
        description: Set(description),
        original_amount: Set(input.original_amount),
        discount: Set(input.discount),
        interest: Set(input.interest),
        fine: Set(input.fine),
        paid_amount: Set(input.paid_amount),
        issue_date: Set(input.issue_date),
        due_date: Set(input.due_date),
        payment_date: Set(payment_date),
        status: Set(outcome.status),
        is_recurring: Set(input.is_recurring),
        recurrence_frequency: Set(input.recurrence_frequency),
        invoice_numbers: Set(input.invoice_numbers),
        bank_slip_number: Set(input.bank_slip_number),
        notes: Set(input.notes.to_uppercase()),
        is_active: Set(true),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let recurrence = match (input.is_recurring, input.recurrence_count) {
        (true, Some(count)) if count > 1 => {
            Some(recurrence::generate_occurrences(db, tenant, &parent, count, today).await?)
        }
        _ => None,
    };

    Ok(CreatedPayable {
        payable: parent,
        recurrence,
    })
}

/// Fetches an obligation by id within the tenant; soft-deleted rows and
/// other tenants' rows both report not-found.
pub async fn get_payable<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
) -> Result<account_payable::Model> {
    AccountPayable::find_by_id(id)
        .filter(account_payable::Column::TenantId.eq(tenant.id()))
        .filter(account_payable::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(Error::not_found("account payable"))
}

/// Lists obligations matching the filter, most distant due date first.
pub async fn list_payables<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    filter: &PayableFilter,
) -> Result<Vec<account_payable::Model>> {
    let mut query = AccountPayable::find()
        .filter(account_payable::Column::TenantId.eq(tenant.id()))
        .filter(account_payable::Column::IsActive.eq(true));

    if let Some(status) = filter.status {
        query = query.filter(account_payable::Column::Status.eq(status));
    }
    if let Some(branch_id) = filter.branch_id {
        query = query.filter(account_payable::Column::BranchId.eq(branch_id));
    }
    if let Some(supplier_id) = filter.supplier_id {
        query = query.filter(account_payable::Column::SupplierId.eq(supplier_id));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(account_payable::Column::CategoryId.eq(category_id));
    }
    if let Some(from) = filter.due_from {
        query = query.filter(account_payable::Column::DueDate.gte(from));
    }
    if let Some(to) = filter.due_to {
        query = query.filter(account_payable::Column::DueDate.lte(to));
    }

    query
        .order_by_desc(account_payable::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists open obligations whose due date has passed, oldest first.
pub async fn list_overdue_payables<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    today: NaiveDate,
) -> Result<Vec<account_payable::Model>> {
    AccountPayable::find()
        .filter(account_payable::Column::TenantId.eq(tenant.id()))
        .filter(account_payable::Column::IsActive.eq(true))
        .filter(account_payable::Column::DueDate.lt(today))
        .filter(account_payable::Column::Status.is_in([
            PayableStatus::Pending,
            PayableStatus::Due,
            PayableStatus::Overdue,
        ]))
        .order_by_asc(account_payable::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update and recomputes the status.
///
/// The derived fields (`status`, `paid_amount`, `payment_date`) cannot be
/// set here; they move only through payments, reconciliation and the
/// explicit lifecycle transitions.
pub async fn update_payable<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
    update: UpdatePayable,
    today: NaiveDate,
) -> Result<account_payable::Model> {
    let existing = get_payable(db, tenant, id).await?;

    let branch_id = update.branch_id.unwrap_or(existing.branch_id);
    let supplier_id = update.supplier_id.unwrap_or(existing.supplier_id);
    let category_id = update.category_id.unwrap_or(existing.category_id);
    let payment_method_id = update
        .payment_method_id
        .unwrap_or(existing.payment_method_id);
    check_references(db, tenant, branch_id, supplier_id, category_id, payment_method_id).await?;

    let description = match update.description {
        Some(d) => {
            let d = d.trim().to_uppercase();
            if d.is_empty() {
                return Err(Error::validation(
                    "description",
                    "description cannot be empty",
                ));
            }
            d
        }
        None => existing.description.clone(),
    };

    let original_amount = update.original_amount.unwrap_or(existing.original_amount);
    let discount = update.discount.unwrap_or(existing.discount);
    let interest = update.interest.unwrap_or(existing.interest);
    let fine = update.fine.unwrap_or(existing.fine);
    validate_amounts(original_amount, discount, interest, fine)?;

    let invoice_numbers = update
        .invoice_numbers
        .unwrap_or_else(|| existing.invoice_numbers.clone());
    validate_invoice_numbers(&invoice_numbers)?;
    let bank_slip_number = update
        .bank_slip_number
        .unwrap_or_else(|| existing.bank_slip_number.clone());
    validate_bank_slip_number(&bank_slip_number)?;

    let due_date = update.due_date.unwrap_or(existing.due_date);
    let final_amount = original_amount - discount + interest + fine;
    let outcome = recompute_status(
        existing.status,
        existing.paid_amount,
        final_amount,
        existing.payment_date.is_some(),
        due_date,
        today,
    );
    let payment_date = if outcome.stamp_payment_date {
        Some(today)
    } else {
        existing.payment_date
    };

    let notes = update
        .notes
        .map_or(existing.notes.clone(), |n| n.to_uppercase());

    let mut active: account_payable::ActiveModel = existing.into();
    active.branch_id = Set(branch_id);
    active.supplier_id = Set(supplier_id);
    active.category_id = Set(category_id);
    active.payment_method_id = Set(payment_method_id);
    active.description = Set(description);
    active.original_amount = Set(original_amount);
    active.discount = Set(discount);
    active.interest = Set(interest);
    active.fine = Set(fine);
    if let Some(issue_date) = update.issue_date {
        active.issue_date = Set(issue_date);
    }
    active.due_date = Set(due_date);
    active.payment_date = Set(payment_date);
    active.status = Set(outcome.status);
    active.invoice_numbers = Set(invoice_numbers);
    active.bank_slip_number = Set(bank_slip_number);
    active.notes = Set(notes);
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Marks an obligation fully paid: paid amount snaps to the final amount
/// and the payment date is stamped. An optional payment method records how
/// it was settled. Idempotent on amounts: repeat calls leave the paid
/// amount alone but still re-apply a supplied date or method. Cancelled
/// obligations are rejected.
pub async fn mark_as_paid<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
    payment_date: Option<NaiveDate>,
    payment_method_id: Option<i64>,
    today: NaiveDate,
) -> Result<account_payable::Model> {
    let existing = get_payable(db, tenant, id).await?;

    if existing.status == PayableStatus::Cancelled {
        return Err(Error::conflict(
            "cannot mark a cancelled obligation as paid",
        ));
    }

    if let Some(method_id) = payment_method_id {
        let method = PaymentMethod::find_by_id(method_id)
            .filter(crate::entities::payment_method::Column::TenantId.eq(tenant.id()))
            .filter(crate::entities::payment_method::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if method.is_none() {
            return Err(Error::not_found("payment method"));
        }
    }

    let final_amount = existing.final_amount();
    let stamped = payment_date.or(existing.payment_date).unwrap_or(today);
    let method = payment_method_id.or(existing.payment_method_id);

    let mut active: account_payable::ActiveModel = existing.into();
    active.paid_amount = Set(final_amount);
    active.payment_date = Set(Some(stamped));
    active.payment_method_id = Set(method);
    active.status = Set(PayableStatus::Paid);
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Cancels an obligation. Cancellation is terminal: no recompute path ever
/// moves a cancelled obligation elsewhere. Idempotent.
pub async fn cancel_payable<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
) -> Result<account_payable::Model> {
    let existing = get_payable(db, tenant, id).await?;

    if existing.status == PayableStatus::Cancelled {
        return Ok(existing);
    }

    let mut active: account_payable::ActiveModel = existing.into();
    active.status = Set(PayableStatus::Cancelled);
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Soft-deletes an obligation: the row stays but vanishes from every query.
pub async fn delete_payable<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    id: i64,
    deleted_by: Option<i64>,
) -> Result<()> {
    let existing = get_payable(db, tenant, id).await?;

    let now = Utc::now();
    let mut active: account_payable::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.deleted_at = Set(Some(now));
    active.deleted_by = Set(deleted_by);
    active.updated_at = Set(now);

    active.update(db).await?;
    Ok(())
}
