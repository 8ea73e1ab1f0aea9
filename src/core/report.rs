//! Dashboard-style rollup of a tenant's obligations.

use crate::{
    core::{payable::get_payable, TenantScope},
    entities::{account_payable, AccountPayable, types::PayableStatus},
    errors::Result,
};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, prelude::*};
use tracing::instrument;

/// Counts and totals over a tenant's active obligations, all relative to
/// the supplied date. "Amounts" are final amounts except the paid bucket,
/// which sums what was actually paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayablesSummary {
    pub open_count: usize,
    pub open_amount: Decimal,
    pub overdue_count: usize,
    pub overdue_amount: Decimal,
    pub paid_this_month_count: usize,
    pub paid_this_month_amount: Decimal,
    pub due_next_week_count: usize,
    pub due_next_week_amount: Decimal,
}

/// Builds the rollup by folding the tenant's active obligations in memory.
#[instrument(skip(db), fields(tenant = %tenant))]
pub async fn payables_summary<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    today: NaiveDate,
) -> Result<PayablesSummary> {
    let payables = AccountPayable::find()
        .filter(account_payable::Column::TenantId.eq(tenant.id()))
        .filter(account_payable::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let week_end = today
        .checked_add_days(Days::new(7))
        .unwrap_or(NaiveDate::MAX);
    let mut summary = PayablesSummary::default();

    for payable in &payables {
        let final_amount = payable.final_amount();

        if payable.status.is_open() {
            summary.open_count += 1;
            summary.open_amount += final_amount;

            if payable.due_date < today {
                summary.overdue_count += 1;
                summary.overdue_amount += final_amount;
            } else if payable.due_date <= week_end {
                summary.due_next_week_count += 1;
                summary.due_next_week_amount += final_amount;
            }
        }

        if matches!(
            payable.status,
            PayableStatus::Paid | PayableStatus::PartiallyPaid
        ) {
            let paid_this_month = payable.payment_date.is_some_and(|date| {
                date.year() == today.year() && date.month() == today.month()
            });
            if paid_this_month {
                summary.paid_this_month_count += 1;
                summary.paid_this_month_amount += payable.paid_amount;
            }
        }
    }

    Ok(summary)
}

/// Count of occurrences generated from one recurring template.
pub async fn count_generated_occurrences<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    template_id: i64,
) -> Result<u64> {
    // Visibility check doubles as tenant scoping
    get_payable(db, tenant, template_id).await?;

    AccountPayable::find()
        .filter(account_payable::Column::TenantId.eq(tenant.id()))
        .filter(account_payable::Column::RecurringParentId.eq(template_id))
        .filter(account_payable::Column::IsActive.eq(true))
        .count(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::payable::{cancel_payable, create_payable, mark_as_paid, CreatePayable},
        test_utils::{dec, seed_refs, setup_test_db, tenant, today},
    };

    #[tokio::test]
    async fn summary_buckets_are_disjoint_and_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let refs = seed_refs(&db, tenant()).await?;

        let make = |desc: &str, due: NaiveDate| {
            let mut input = CreatePayable::new(
                refs.branch.id,
                refs.supplier.id,
                refs.category.id,
                desc,
                dec("100.00"),
                today(),
                due,
            );
            input.status = crate::entities::types::PayableStatus::Due;
            input
        };

        // Overdue, due soon, due far out, paid this month, cancelled
        create_payable(&db, tenant(), make("A", today() - Days::new(5)), today()).await?;
        create_payable(&db, tenant(), make("B", today() + Days::new(3)), today()).await?;
        create_payable(&db, tenant(), make("C", today() + Days::new(30)), today()).await?;
        let paid = create_payable(&db, tenant(), make("D", today() + Days::new(2)), today())
            .await?;
        mark_as_paid(&db, tenant(), paid.payable.id, Some(today()), None, today()).await?;
        let cancelled =
            create_payable(&db, tenant(), make("E", today() + Days::new(2)), today()).await?;
        cancel_payable(&db, tenant(), cancelled.payable.id).await?;

        let summary = payables_summary(&db, tenant(), today()).await?;
        assert_eq!(summary.open_count, 3);
        assert_eq!(summary.open_amount, dec("300.00"));
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.overdue_amount, dec("100.00"));
        assert_eq!(summary.due_next_week_count, 1);
        assert_eq!(summary.due_next_week_amount, dec("100.00"));
        assert_eq!(summary.paid_this_month_count, 1);
        assert_eq!(summary.paid_this_month_amount, dec("100.00"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_tenant_summary_is_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let summary = payables_summary(&db, tenant(), today()).await?;
        assert_eq!(summary, PayablesSummary::default());
        Ok(())
    }
}
