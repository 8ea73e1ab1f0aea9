//! Bulk spreadsheet-style import of account payable rows.
//!
//! Rows arrive as 21 loosely-typed cells per record. Each row resolves its
//! branch, supplier, category and payment method by lookup-or-create, then
//! builds the obligation through the normal create path, so every validation
//! and the status recompute apply identically to imported data. A bad row is
//! reported and skipped; the batch always runs to the end.

use crate::{
    core::{
        payable::{create_payable, CreatePayable},
        registry::{
            create_branch, create_supplier, find_branch_by_name, find_branch_by_tax_id,
            find_supplier_by_name, find_supplier_by_tax_id, get_or_create_category,
            get_or_create_payment_method, normalize_tax_id, CreateBranch, CreateSupplier,
        },
        TenantScope,
    },
    entities::types::{PayableStatus, RecurrenceFrequency},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// One import row, cells in the fixed column order. Blank cells are `None`.
#[derive(Debug, Clone, Default)]
pub struct ImportRow {
    pub branch_name: Option<String>,
    pub branch_tax_id: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_tax_id: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub original_amount: Option<String>,
    pub discount: Option<String>,
    pub interest: Option<String>,
    pub fine: Option<String>,
    pub paid_amount: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub payment_date: Option<String>,
    pub status: Option<String>,
    pub invoice_numbers: Option<String>,
    pub bank_slip_number: Option<String>,
    pub notes: Option<String>,
    pub is_recurring: Option<String>,
    pub recurrence_frequency: Option<String>,
}

impl ImportRow {
    /// Builds a row from raw cells in column order; missing or blank cells
    /// become `None`.
    #[must_use]
    pub fn from_cells(cells: &[&str]) -> Self {
        fn cell(cells: &[&str], index: usize) -> Option<String> {
            cells
                .get(index)
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(ToString::to_string)
        }

        Self {
            branch_name: cell(cells, 0),
            branch_tax_id: cell(cells, 1),
            supplier_name: cell(cells, 2),
            supplier_tax_id: cell(cells, 3),
            category: cell(cells, 4),
            payment_method: cell(cells, 5),
            description: cell(cells, 6),
            original_amount: cell(cells, 7),
            discount: cell(cells, 8),
            interest: cell(cells, 9),
            fine: cell(cells, 10),
            paid_amount: cell(cells, 11),
            issue_date: cell(cells, 12),
            due_date: cell(cells, 13),
            payment_date: cell(cells, 14),
            status: cell(cells, 15),
            invoice_numbers: cell(cells, 16),
            bank_slip_number: cell(cells, 17),
            notes: cell(cells, 18),
            is_recurring: cell(cells, 19),
            recurrence_frequency: cell(cells, 20),
        }
    }

    /// Whether every cell is blank; fully blank rows are skipped silently.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branch_name.is_none()
            && self.branch_tax_id.is_none()
            && self.supplier_name.is_none()
            && self.supplier_tax_id.is_none()
            && self.category.is_none()
            && self.payment_method.is_none()
            && self.description.is_none()
            && self.original_amount.is_none()
            && self.due_date.is_none()
    }
}

/// Names of the reference records a batch created along the way, grouped
/// by kind, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedEntities {
    pub branches: Vec<String>,
    pub suppliers: Vec<String>,
    pub categories: Vec<String>,
    pub payment_methods: Vec<String>,
}

/// Outcome of an import batch. Row numbers match the source spreadsheet,
/// where data starts on row 2 under a header row.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub succeeded: usize,
    pub errors: Vec<(usize, String)>,
    pub warnings: Vec<(usize, String)>,
    pub created: CreatedEntities,
}

/// A placeholder 14-digit tax id for records imported without one, derived
/// from a microsecond timestamp. Monotonic so two creates in the same
/// microsecond cannot collide.
fn synthetic_tax_id() -> String {
    static LAST: AtomicU64 = AtomicU64::new(0);

    let now = u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or(0);
    let mut prev = LAST.load(Ordering::Relaxed);
    let stamp = loop {
        let candidate = now.max(prev + 1);
        match LAST.compare_exchange(prev, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break candidate,
            Err(observed) => prev = observed,
        }
    };

    let digits = stamp.to_string();
    let tail: String = digits
        .chars()
        .rev()
        .take(14)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{tail:0>14}")
}

fn parse_decimal(raw: Option<&String>, default: Decimal) -> std::result::Result<Decimal, String> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .replace(',', ".")
            .parse()
            .map_err(|_| format!("invalid amount `{value}`")),
    }
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| format!("invalid date `{raw}`, expected DD/MM/YYYY"))
}

fn is_affirmative(raw: &str) -> bool {
    matches!(
        raw.trim().to_uppercase().as_str(),
        "SIM" | "YES" | "S" | "Y" | "TRUE" | "1"
    )
}

struct RowContext {
    warnings: Vec<String>,
    created: CreatedEntities,
}

async fn resolve_branch<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
    tax_id: Option<&String>,
    ctx: &mut RowContext,
) -> std::result::Result<i64, String> {
    if let Some(raw) = tax_id {
        let normalized = normalize_tax_id(raw).map_err(|e| e.to_string())?;
        if let Some(existing) = find_branch_by_tax_id(db, tenant, &normalized)
            .await
            .map_err(|e| e.to_string())?
        {
            if existing.name != name.trim().to_uppercase() {
                ctx.warnings.push(format!(
                    "branch tax id {normalized} matched `{}`, row says `{name}`",
                    existing.name
                ));
            }
            return Ok(existing.id);
        }
        let created = create_branch(
            db,
            tenant,
            CreateBranch {
                name: name.to_string(),
                tax_id: Some(normalized),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| e.to_string())?;
        ctx.created.branches.push(created.name);
        return Ok(created.id);
    }

    if let Some(existing) = find_branch_by_name(db, tenant, name)
        .await
        .map_err(|e| e.to_string())?
    {
        ctx.warnings
            .push(format!("branch `{}` matched by name only", existing.name));
        return Ok(existing.id);
    }
    let created = create_branch(
        db,
        tenant,
        CreateBranch {
            name: name.to_string(),
            tax_id: Some(synthetic_tax_id()),
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.to_string())?;
    ctx.warnings.push(format!(
        "branch `{}` created with a temporary placeholder tax id",
        created.name
    ));
    ctx.created.branches.push(created.name);
    Ok(created.id)
}

async fn resolve_supplier<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
    tax_id: Option<&String>,
    ctx: &mut RowContext,
) -> std::result::Result<i64, String> {
    if let Some(raw) = tax_id {
        let normalized = normalize_tax_id(raw).map_err(|e| e.to_string())?;
        if let Some(existing) = find_supplier_by_tax_id(db, tenant, &normalized)
            .await
            .map_err(|e| e.to_string())?
        {
            if existing.name != name.trim().to_uppercase() {
                ctx.warnings.push(format!(
                    "supplier tax id {normalized} matched `{}`, row says `{name}`",
                    existing.name
                ));
            }
            return Ok(existing.id);
        }
        let created = create_supplier(
            db,
            tenant,
            CreateSupplier {
                name: name.to_string(),
                tax_id: Some(normalized),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| e.to_string())?;
        ctx.created.suppliers.push(created.name);
        return Ok(created.id);
    }

    if let Some(existing) = find_supplier_by_name(db, tenant, name)
        .await
        .map_err(|e| e.to_string())?
    {
        ctx.warnings
            .push(format!("supplier `{}` matched by name only", existing.name));
        return Ok(existing.id);
    }
    let created = create_supplier(
        db,
        tenant,
        CreateSupplier {
            name: name.to_string(),
            tax_id: Some(synthetic_tax_id()),
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.to_string())?;
    ctx.warnings.push(format!(
        "supplier `{}` created with a temporary placeholder tax id",
        created.name
    ));
    ctx.created.suppliers.push(created.name);
    Ok(created.id)
}

async fn import_row<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    row: &ImportRow,
    today: NaiveDate,
    ctx: &mut RowContext,
) -> std::result::Result<(), String> {
    let branch_name = row.branch_name.as_deref().ok_or("missing branch name")?;
    let supplier_name = row.supplier_name.as_deref().ok_or("missing supplier name")?;
    let category_name = row.category.as_deref().ok_or("missing category")?;
    let method_name = row.payment_method.as_deref().ok_or("missing payment method")?;
    let description = row.description.as_deref().ok_or("missing description")?;
    let original_raw = row
        .original_amount
        .as_ref()
        .ok_or("missing original amount")?;
    let due_raw = row.due_date.as_ref().ok_or("missing due date")?;

    let branch_id =
        resolve_branch(db, tenant, branch_name, row.branch_tax_id.as_ref(), ctx).await?;
    let supplier_id =
        resolve_supplier(db, tenant, supplier_name, row.supplier_tax_id.as_ref(), ctx).await?;

    let (category, created) = get_or_create_category(db, tenant, category_name)
        .await
        .map_err(|e| e.to_string())?;
    if created {
        ctx.created.categories.push(category.name.clone());
    }

    let (method, created) = get_or_create_payment_method(db, tenant, method_name)
        .await
        .map_err(|e| e.to_string())?;
    if created {
        ctx.created.payment_methods.push(method.name);
    }
    let payment_method_id = Some(method.id);

    let original_amount = parse_decimal(Some(original_raw), Decimal::ZERO)?;
    let discount = parse_decimal(row.discount.as_ref(), Decimal::ZERO)?;
    let interest = parse_decimal(row.interest.as_ref(), Decimal::ZERO)?;
    let fine = parse_decimal(row.fine.as_ref(), Decimal::ZERO)?;
    let paid_amount = parse_decimal(row.paid_amount.as_ref(), Decimal::ZERO)?;

    let due_date = parse_date(due_raw)?;
    let issue_date = match row.issue_date.as_ref() {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    let payment_date = match row.payment_date.as_ref() {
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };

    let status = match row.status.as_deref() {
        None => PayableStatus::Due,
        Some(token) => PayableStatus::from_token(token).unwrap_or_else(|| {
            ctx.warnings
                .push(format!("unknown status `{token}`, defaulting to due"));
            PayableStatus::Due
        }),
    };

    let mut is_recurring = row.is_recurring.as_deref().is_some_and(is_affirmative);
    let recurrence_frequency = if is_recurring {
        match row.recurrence_frequency.as_deref() {
            Some(token) => match RecurrenceFrequency::from_token(token) {
                Some(frequency) => Some(frequency),
                None => {
                    ctx.warnings.push(format!(
                        "unknown recurrence frequency `{token}`, importing as non-recurring"
                    ));
                    is_recurring = false;
                    None
                }
            },
            None => {
                ctx.warnings
                    .push("recurring row without a frequency, importing as non-recurring".into());
                is_recurring = false;
                None
            }
        }
    } else {
        None
    };

    let input = CreatePayable {
        branch_id,
        supplier_id,
        category_id: category.id,
        payment_method_id,
        description: description.to_string(),
        original_amount,
        discount,
        interest,
        fine,
        paid_amount,
        issue_date,
        due_date,
        payment_date,
        status,
        is_recurring,
        recurrence_frequency,
        recurrence_count: None,
        invoice_numbers: row.invoice_numbers.clone().unwrap_or_default(),
        bank_slip_number: row.bank_slip_number.clone().unwrap_or_default(),
        notes: row.notes.clone().unwrap_or_default(),
    };

    create_payable(db, tenant, input, today)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Imports a batch of rows for one tenant. Row numbering starts at 2 to
/// match a spreadsheet with a header row. Never aborts: each row succeeds,
/// warns or errors on its own.
#[instrument(skip(db, rows), fields(tenant = %tenant, rows = rows.len()))]
pub async fn import_rows<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    rows: &[ImportRow],
    today: NaiveDate,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 2;
        if row.is_empty() {
            continue;
        }

        let mut ctx = RowContext {
            warnings: Vec::new(),
            created: CreatedEntities::default(),
        };
        match import_row(db, tenant, row, today, &mut ctx).await {
            Ok(()) => {
                report.succeeded += 1;
                report.created.branches.extend(ctx.created.branches);
                report.created.suppliers.extend(ctx.created.suppliers);
                report.created.categories.extend(ctx.created.categories);
                report
                    .created
                    .payment_methods
                    .extend(ctx.created.payment_methods);
            }
            Err(message) => report.errors.push((row_number, message)),
        }
        for warning in ctx.warnings {
            report.warnings.push((row_number, warning));
        }
    }

    info!(
        succeeded = report.succeeded,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "import batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            payable::{list_payables, PayableFilter},
            registry::{create_branch, create_supplier, find_supplier_by_name, CreateBranch, CreateSupplier},
        },
        test_utils::{setup_test_db, tenant, today},
    };

    fn full_row() -> ImportRow {
        ImportRow::from_cells(&[
            "Main Office",
            "12.345.678/0001-90",
            "Acme Ltda",
            "98765432000110",
            "Utilities",
            "Bank Slip",
            "Electricity bill",
            "1500.00",
            "50.00",
            "0",
            "0",
            "0",
            "01/03/2025",
            "25/03/2025",
            "",
            "due",
            "12345, 67890",
            "23790000001234567890",
            "march invoice",
            "NO",
            "",
        ])
    }

    #[tokio::test]
    async fn full_row_imports_and_creates_references() -> Result<()> {
        let db = setup_test_db().await?;

        let report = import_rows(&db, tenant(), &[full_row()], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert!(report.errors.is_empty());
        assert_eq!(report.created.branches, vec!["MAIN OFFICE"]);
        assert_eq!(report.created.suppliers, vec!["ACME LTDA"]);
        assert_eq!(report.created.categories, vec!["UTILITIES"]);
        assert_eq!(report.created.payment_methods, vec!["BANK SLIP"]);

        let payables = list_payables(&db, tenant(), &PayableFilter::default()).await?;
        assert_eq!(payables.len(), 1);
        let payable = &payables[0];
        assert_eq!(payable.description, "ELECTRICITY BILL");
        assert_eq!(
            payable.due_date,
            NaiveDate::from_ymd_opt(2025, 3, 25).unwrap()
        );
        assert_eq!(payable.invoice_numbers, "12345, 67890");
        Ok(())
    }

    #[tokio::test]
    async fn second_batch_reuses_references() -> Result<()> {
        let db = setup_test_db().await?;

        import_rows(&db, tenant(), &[full_row()], today()).await?;
        let report = import_rows(&db, tenant(), &[full_row()], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.created, CreatedEntities::default());
        Ok(())
    }

    #[tokio::test]
    async fn missing_due_date_errors_but_later_rows_succeed() -> Result<()> {
        let db = setup_test_db().await?;

        let mut bad = full_row();
        bad.due_date = None;

        let report = import_rows(&db, tenant(), &[bad, full_row()], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, 2);
        assert!(report.errors[0].1.contains("due date"));
        Ok(())
    }

    #[tokio::test]
    async fn name_only_supplier_match_warns() -> Result<()> {
        let db = setup_test_db().await?;

        create_supplier(
            &db,
            tenant(),
            CreateSupplier {
                name: "Acme Ltda".to_string(),
                ..Default::default()
            },
        )
        .await?;

        let mut row = full_row();
        row.supplier_tax_id = None;

        let report = import_rows(&db, tenant(), &[row], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert!(report.created.suppliers.is_empty());
        assert!(report
            .warnings
            .iter()
            .any(|(_, w)| w.contains("matched by name only")));
        Ok(())
    }

    #[tokio::test]
    async fn missing_supplier_tax_id_gets_synthetic_one() -> Result<()> {
        let db = setup_test_db().await?;

        let mut row = full_row();
        row.supplier_tax_id = None;

        let report = import_rows(&db, tenant(), &[row], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.created.suppliers.len(), 1);

        let supplier = find_supplier_by_name(&db, tenant(), "Acme Ltda")
            .await?
            .unwrap();
        let tax_id = supplier.tax_id.unwrap();
        assert_eq!(tax_id.len(), 14);
        assert!(tax_id.chars().all(|c| c.is_ascii_digit()));

        // The placeholder is flagged so the caller knows it is not real
        assert!(report
            .warnings
            .iter()
            .any(|(_, w)| w.contains("temporary placeholder tax id")));
        Ok(())
    }

    #[tokio::test]
    async fn untagged_branch_and_supplier_both_flag_placeholder_ids() -> Result<()> {
        let db = setup_test_db().await?;

        let mut row = full_row();
        row.branch_tax_id = None;
        row.supplier_tax_id = None;

        let report = import_rows(&db, tenant(), &[row], today()).await?;
        assert_eq!(report.succeeded, 1);
        let placeholder_notes = report
            .warnings
            .iter()
            .filter(|(_, w)| w.contains("temporary placeholder tax id"))
            .count();
        assert_eq!(placeholder_notes, 2);
        Ok(())
    }

    #[tokio::test]
    async fn name_only_branch_match_warns_instead_of_duplicating() -> Result<()> {
        let db = setup_test_db().await?;

        create_branch(
            &db,
            tenant(),
            CreateBranch {
                name: "Main Office".to_string(),
                ..Default::default()
            },
        )
        .await?;

        let mut row = full_row();
        row.branch_tax_id = None;

        let report = import_rows(&db, tenant(), &[row], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert!(report.created.branches.is_empty());
        assert!(report
            .warnings
            .iter()
            .any(|(_, w)| w.contains("branch `MAIN OFFICE` matched by name only")));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_frequency_imports_as_non_recurring() -> Result<()> {
        let db = setup_test_db().await?;

        let mut row = full_row();
        row.is_recurring = Some("SIM".to_string());
        row.recurrence_frequency = Some("fortnightly".to_string());

        let report = import_rows(&db, tenant(), &[row], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert!(report
            .warnings
            .iter()
            .any(|(_, w)| w.contains("unknown recurrence frequency")));

        let payables = list_payables(&db, tenant(), &PayableFilter::default()).await?;
        assert!(!payables[0].is_recurring);
        assert!(payables[0].recurrence_frequency.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_status_defaults_to_due_with_warning() -> Result<()> {
        let db = setup_test_db().await?;

        let mut row = full_row();
        row.status = Some("whatever".to_string());

        let report = import_rows(&db, tenant(), &[row], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert!(report
            .warnings
            .iter()
            .any(|(_, w)| w.contains("unknown status")));
        Ok(())
    }

    #[tokio::test]
    async fn blank_rows_are_skipped_silently() -> Result<()> {
        let db = setup_test_db().await?;

        let report =
            import_rows(&db, tenant(), &[ImportRow::default(), full_row()], today()).await?;
        assert_eq!(report.succeeded, 1);
        assert!(report.errors.is_empty());
        Ok(())
    }

    #[test]
    fn synthetic_tax_ids_are_distinct_14_digit_strings() {
        let a = synthetic_tax_id();
        let b = synthetic_tax_id();
        assert_eq!(a.len(), 14);
        assert_eq!(b.len(), 14);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn affirmative_tokens() {
        for token in ["SIM", "sim", "YES", "s", "Y", "1"] {
            assert!(is_affirmative(token));
        }
        for token in ["NO", "nao", "false", ""] {
            assert!(!is_affirmative(token));
        }
    }
}
