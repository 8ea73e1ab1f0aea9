//! Recurrence projection and occurrence generation.
//!
//! A recurring obligation with a count of N keeps its own row as occurrence
//! one and generates N-1 siblings, each a copy of the template with a
//! projected due date and a numbered description. Projection is calendar
//! aware: month-based frequencies clamp to the last day of shorter months.

use crate::{
    core::{status::recompute_status, TenantScope},
    entities::{
        account_payable,
        types::{PayableStatus, RecurrenceFrequency},
    },
    errors::Result,
};
use chrono::{Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Set, prelude::*};
use tracing::warn;

/// Projects the due date of occurrence `index` (1-based among the generated
/// siblings) from the template's due date. Returns `None` when the date
/// falls outside the representable calendar range.
#[must_use]
pub fn project_date(
    due_date: NaiveDate,
    frequency: RecurrenceFrequency,
    index: u32,
) -> Option<NaiveDate> {
    match frequency {
        RecurrenceFrequency::Weekly => due_date.checked_add_days(Days::new(u64::from(index) * 7)),
        RecurrenceFrequency::Biweekly => {
            due_date.checked_add_days(Days::new(u64::from(index) * 14))
        }
        RecurrenceFrequency::Monthly => due_date.checked_add_months(Months::new(index)),
        RecurrenceFrequency::Bimonthly => due_date.checked_add_months(Months::new(index * 2)),
        RecurrenceFrequency::Quarterly => due_date.checked_add_months(Months::new(index * 3)),
        RecurrenceFrequency::Semiannual => due_date.checked_add_months(Months::new(index * 6)),
        RecurrenceFrequency::Annual => due_date.checked_add_months(Months::new(index * 12)),
    }
}

/// Outcome of generating occurrences for one template obligation.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceOutcome {
    /// Siblings persisted, in occurrence order.
    pub created: Vec<account_payable::Model>,
    /// Occurrences that could not be generated: (occurrence number, reason).
    pub failed: Vec<(u32, String)>,
}

/// Generates occurrences 2..=count from a persisted template.
///
/// Each occurrence inserts independently; one failure is recorded in the
/// outcome and never blocks the rest. Generated siblings always start
/// unpaid regardless of the template's monetary state; their status goes
/// through the usual recompute, so a backdated template yields overdue
/// occurrences.
pub async fn generate_occurrences<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    template: &account_payable::Model,
    count: u32,
    today: NaiveDate,
) -> Result<RecurrenceOutcome> {
    let mut outcome = RecurrenceOutcome::default();
    let Some(frequency) = template.recurrence_frequency else {
        return Ok(outcome);
    };
    if count <= 1 {
        return Ok(outcome);
    }

    for occurrence in 2..=count {
        let index = occurrence - 1;
        let Some(due_date) = project_date(template.due_date, frequency, index) else {
            warn!(
                template_id = template.id,
                occurrence, "recurrence date out of calendar range"
            );
            outcome
                .failed
                .push((occurrence, "projected due date out of range".to_string()));
            continue;
        };
        let issue_date =
            project_date(template.issue_date, frequency, index).unwrap_or(template.issue_date);
        let final_amount =
            template.original_amount - template.discount + template.interest + template.fine;
        let status = recompute_status(
            PayableStatus::Due,
            Decimal::ZERO,
            final_amount,
            false,
            due_date,
            today,
        )
        .status;

        let now = Utc::now();
        let sibling = account_payable::ActiveModel {
            tenant_id: Set(tenant.id()),
            branch_id: Set(template.branch_id),
            supplier_id: Set(template.supplier_id),
            category_id: Set(template.category_id),
            payment_method_id: Set(template.payment_method_id),
            recurring_parent_id: Set(Some(template.id)),
            description: Set(format!(
                "{} ({occurrence}/{count})",
                template.description
            )),
            original_amount: Set(template.original_amount),
            discount: Set(template.discount),
            interest: Set(template.interest),
            fine: Set(template.fine),
            paid_amount: Set(Decimal::ZERO),
            issue_date: Set(issue_date),
            due_date: Set(due_date),
            payment_date: Set(None),
            status: Set(status),
            is_recurring: Set(true),
            recurrence_frequency: Set(Some(frequency)),
            invoice_numbers: Set(template.invoice_numbers.clone()),
            bank_slip_number: Set(template.bank_slip_number.clone()),
            notes: Set(template.notes.clone()),
            is_active: Set(true),
            deleted_at: Set(None),
            deleted_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match sibling.insert(db).await {
            Ok(model) => outcome.created.push(model),
            Err(err) => {
                warn!(
                    template_id = template.id,
                    occurrence,
                    error = %err,
                    "failed to persist recurrence occurrence"
                );
                outcome.failed.push((occurrence, err.to_string()));
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::payable::{create_payable, CreatePayable},
        entities::types::PayableStatus,
        test_utils::{dec, seed_refs, setup_test_db, tenant, today},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_and_biweekly_projection() {
        let base = date(2025, 1, 6);
        assert_eq!(
            project_date(base, RecurrenceFrequency::Weekly, 1),
            Some(date(2025, 1, 13))
        );
        assert_eq!(
            project_date(base, RecurrenceFrequency::Biweekly, 2),
            Some(date(2025, 2, 3))
        );
    }

    #[test]
    fn monthly_projection_clamps_month_end() {
        let base = date(2025, 1, 31);
        assert_eq!(
            project_date(base, RecurrenceFrequency::Monthly, 1),
            Some(date(2025, 2, 28))
        );
        assert_eq!(
            project_date(base, RecurrenceFrequency::Monthly, 2),
            Some(date(2025, 3, 31))
        );
        // Leap year
        assert_eq!(
            project_date(date(2024, 1, 31), RecurrenceFrequency::Monthly, 1),
            Some(date(2024, 2, 29))
        );
    }

    #[test]
    fn longer_frequencies_project_in_months_and_years() {
        let base = date(2025, 3, 15);
        assert_eq!(
            project_date(base, RecurrenceFrequency::Quarterly, 2),
            Some(date(2025, 9, 15))
        );
        assert_eq!(
            project_date(base, RecurrenceFrequency::Semiannual, 1),
            Some(date(2025, 9, 15))
        );
        assert_eq!(
            project_date(base, RecurrenceFrequency::Annual, 3),
            Some(date(2028, 3, 15))
        );
    }

    #[tokio::test]
    async fn generates_numbered_unpaid_siblings() -> Result<()> {
        let db = setup_test_db().await?;
        let refs = seed_refs(&db, tenant()).await?;

        let mut input = CreatePayable::new(
            refs.branch.id,
            refs.supplier.id,
            refs.category.id,
            "Rent",
            dec("1000.00"),
            date(2025, 1, 31),
            date(2025, 1, 31),
        );
        input.is_recurring = true;
        input.recurrence_frequency = Some(RecurrenceFrequency::Monthly);
        input.recurrence_count = Some(3);
        input.paid_amount = dec("1000.00");

        let created = create_payable(&db, tenant(), input, date(2025, 1, 15)).await?;
        let outcome = created.recurrence.unwrap();
        assert_eq!(outcome.created.len(), 2);
        assert!(outcome.failed.is_empty());

        let second = &outcome.created[0];
        assert_eq!(second.description, "RENT (2/3)");
        assert_eq!(second.due_date, date(2025, 2, 28));
        assert_eq!(second.paid_amount, Decimal::ZERO);
        assert_eq!(second.status, PayableStatus::Due);
        assert_eq!(second.recurring_parent_id, Some(created.payable.id));

        let third = &outcome.created[1];
        assert_eq!(third.description, "RENT (3/3)");
        assert_eq!(third.due_date, date(2025, 3, 31));
        Ok(())
    }

    #[tokio::test]
    async fn count_of_one_generates_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let refs = seed_refs(&db, tenant()).await?;

        let mut input = CreatePayable::new(
            refs.branch.id,
            refs.supplier.id,
            refs.category.id,
            "RENT",
            dec("100.00"),
            today(),
            today(),
        );
        input.is_recurring = true;
        input.recurrence_frequency = Some(RecurrenceFrequency::Weekly);
        input.recurrence_count = Some(1);

        let created = create_payable(&db, tenant(), input, today()).await?;
        assert!(created.recurrence.is_none());
        Ok(())
    }
}
