//! Status recompute rule and derived monetary fields.
//!
//! The status of an account payable is never stored by callers; it is
//! recomputed from the current field values on every persist. Keeping the
//! rule as a pure function makes it testable without a database and
//! guarantees every write path (create, update, reconcile, import,
//! recurrence generation) applies exactly the same transitions.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::entities::{account_payable, types::PayableStatus};

/// Result of applying the recompute rule: the status to persist and whether
/// the payment date should be stamped with today's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOutcome {
    pub status: PayableStatus,
    pub stamp_payment_date: bool,
}

/// Recomputes the status of an obligation from its current field values.
///
/// Rule order, evaluated on every save:
/// 1. A positive paid amount forces `paid` (covering the final amount,
///    stamping the payment date if unset) or `partially_paid`.
/// 2. Otherwise an open `pending`/`due` obligation past its due date
///    becomes `overdue`.
/// 3. Otherwise the caller-supplied status stands.
///
/// `cancelled` is sticky: it is never recomputed away, only `cancel` and an
/// explicit reset can leave it.
#[must_use]
pub fn recompute_status(
    current: PayableStatus,
    paid_amount: Decimal,
    final_amount: Decimal,
    has_payment_date: bool,
    due_date: NaiveDate,
    today: NaiveDate,
) -> StatusOutcome {
    if current == PayableStatus::Cancelled {
        return StatusOutcome {
            status: PayableStatus::Cancelled,
            stamp_payment_date: false,
        };
    }

    if paid_amount > Decimal::ZERO {
        if paid_amount >= final_amount {
            return StatusOutcome {
                status: PayableStatus::Paid,
                stamp_payment_date: !has_payment_date,
            };
        }
        return StatusOutcome {
            status: PayableStatus::PartiallyPaid,
            stamp_payment_date: false,
        };
    }

    if matches!(current, PayableStatus::Pending | PayableStatus::Due) && due_date < today {
        return StatusOutcome {
            status: PayableStatus::Overdue,
            stamp_payment_date: false,
        };
    }

    StatusOutcome {
        status: current,
        stamp_payment_date: false,
    }
}

impl account_payable::Model {
    /// Original amount minus discount plus interest plus fine.
    #[must_use]
    pub fn final_amount(&self) -> Decimal {
        self.original_amount - self.discount + self.interest + self.fine
    }

    /// Amount still owed, never negative.
    #[must_use]
    pub fn remaining_amount(&self) -> Decimal {
        (self.final_amount() - self.paid_amount).max(Decimal::ZERO)
    }

    /// Whether the obligation is open and past its due date.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.status, PayableStatus::Pending | PayableStatus::Due)
            && self.due_date < today
    }

    /// Days until the due date; negative when already past.
    #[must_use]
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    /// Percentage of the final amount already paid, 0 when the final
    /// amount is not positive.
    #[must_use]
    pub fn payment_percentage(&self) -> Decimal {
        let final_amount = self.final_amount();
        if final_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.paid_amount / final_amount * Decimal::from(100)
    }
}
