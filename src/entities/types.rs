//! Shared active enums used across the ledger entities.
//!
//! All enums are stored as their lowercase wire tokens so that database
//! contents match the status/frequency vocabulary accepted on import.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an account payable.
///
/// `Paid` and `PartiallyPaid` are derived states reached only through the
/// paid-amount recompute path; `Cancelled` is terminal under normal flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PayableStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "due")]
    Due,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl PayableStatus {
    /// Parses a wire-level status token, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "due" => Some(Self::Due),
            "overdue" => Some(Self::Overdue),
            "paid" => Some(Self::Paid),
            "partially_paid" => Some(Self::PartiallyPaid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the obligation still awaits payment.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Due | Self::Overdue)
    }
}

/// How often a recurring obligation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "biweekly")]
    Biweekly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "bimonthly")]
    Bimonthly,
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    #[sea_orm(string_value = "semiannual")]
    Semiannual,
    #[sea_orm(string_value = "annual")]
    Annual,
}

impl RecurrenceFrequency {
    /// Parses a wire-level frequency token, case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            "bimonthly" => Some(Self::Bimonthly),
            "quarterly" => Some(Self::Quarterly),
            "semiannual" => Some(Self::Semiannual),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

/// Which entity kind an attachment row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum AttachmentOwner {
    #[sea_orm(string_value = "account_payable")]
    AccountPayable,
    #[sea_orm(string_value = "payable_payment")]
    PayablePayment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tokens_parse_case_insensitively() {
        assert_eq!(PayableStatus::from_token("PAID"), Some(PayableStatus::Paid));
        assert_eq!(
            PayableStatus::from_token(" Partially_Paid "),
            Some(PayableStatus::PartiallyPaid)
        );
        assert_eq!(PayableStatus::from_token("unknown"), None);
    }

    #[test]
    fn frequency_tokens_parse_case_insensitively() {
        assert_eq!(
            RecurrenceFrequency::from_token("Monthly"),
            Some(RecurrenceFrequency::Monthly)
        );
        assert_eq!(RecurrenceFrequency::from_token("fortnightly"), None);
    }

    #[test]
    fn open_statuses() {
        assert!(PayableStatus::Pending.is_open());
        assert!(PayableStatus::Due.is_open());
        assert!(PayableStatus::Overdue.is_open());
        assert!(!PayableStatus::Paid.is_open());
        assert!(!PayableStatus::Cancelled.is_open());
    }
}
