//! Shared test utilities for the ledger.
//!
//! This module provides common helper functions for setting up test
//! databases and seeding the reference records a payable needs.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        registry::{
            create_branch, create_category, create_payment_method, create_supplier,
            CreateBranch, CreateSupplier,
        },
        TenantScope,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The tenant most tests operate under.
pub fn tenant() -> TenantScope {
    TenantScope::new(1)
}

/// A second tenant for isolation tests.
pub fn other_tenant() -> TenantScope {
    TenantScope::new(2)
}

/// The fixed "today" tests anchor date arithmetic on.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

/// Parses a decimal literal.
pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// The reference records an account payable points at.
pub struct TestRefs {
    pub branch: entities::branch::Model,
    pub supplier: entities::supplier::Model,
    pub category: entities::category::Model,
    pub payment_method: entities::payment_method::Model,
}

/// Seeds one branch, supplier, category and payment method for a tenant.
pub async fn seed_refs(db: &DatabaseConnection, scope: TenantScope) -> Result<TestRefs> {
    let branch = create_branch(
        db,
        scope,
        CreateBranch {
            name: "Test Branch".to_string(),
            tax_id: Some("11222333000181".to_string()),
            ..Default::default()
        },
    )
    .await?;
    let supplier = create_supplier(
        db,
        scope,
        CreateSupplier {
            name: "Test Supplier".to_string(),
            tax_id: Some("99888777000166".to_string()),
            ..Default::default()
        },
    )
    .await?;
    let category = create_category(db, scope, "Test Category", "", "#3366ff").await?;
    let payment_method = create_payment_method(db, scope, "Test Method", "").await?;

    Ok(TestRefs {
        branch,
        supplier,
        category,
        payment_method,
    })
}
