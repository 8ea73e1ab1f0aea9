//! Reference-entity registry - suppliers, branches, categories and payment
//! methods.
//!
//! Names are normalized to uppercase on every create, so the case-insensitive
//! lookups required by the bulk importer reduce to plain equality against the
//! upper-cased input. All lookups skip soft-deleted rows, and every creation
//! guards uniqueness with a lookup first so conflicts only surface on racing
//! direct creates.

use crate::{
    core::TenantScope,
    entities::{branch, category, payment_method, supplier, Branch, Category, PaymentMethod, Supplier},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Normalizes a raw tax id to its digits and requires exactly 14 of them.
pub fn normalize_tax_id(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 14 {
        return Err(Error::validation(
            "tax_id",
            format!("invalid tax id `{raw}`: must contain exactly 14 digits"),
        ));
    }
    Ok(digits)
}

/// Input for creating a branch.
#[derive(Debug, Clone, Default)]
pub struct CreateBranch {
    pub name: String,
    pub tax_id: Option<String>,
    pub notes: String,
    pub bank_account_name: String,
    pub bank_account_description: String,
}

/// Input for creating a supplier.
#[derive(Debug, Clone, Default)]
pub struct CreateSupplier {
    pub name: String,
    pub tax_id: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
}

pub async fn find_branch_by_tax_id<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    tax_id: &str,
) -> Result<Option<branch::Model>> {
    Branch::find()
        .filter(branch::Column::TenantId.eq(tenant.id()))
        .filter(branch::Column::TaxId.eq(tax_id))
        .filter(branch::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn find_branch_by_name<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
) -> Result<Option<branch::Model>> {
    Branch::find()
        .filter(branch::Column::TenantId.eq(tenant.id()))
        .filter(branch::Column::Name.eq(name.trim().to_uppercase()))
        .filter(branch::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a branch, validating the tax id when given and rejecting
/// duplicates within the tenant.
pub async fn create_branch<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    input: CreateBranch,
) -> Result<branch::Model> {
    let name = input.name.trim().to_uppercase();
    if name.is_empty() {
        return Err(Error::validation("name", "branch name cannot be empty"));
    }

    let tax_id = match input.tax_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let normalized = normalize_tax_id(raw)?;
            if find_branch_by_tax_id(db, tenant, &normalized).await?.is_some() {
                return Err(Error::conflict(format!(
                    "branch with tax id {normalized} already exists"
                )));
            }
            Some(normalized)
        }
        _ => None,
    };

    let now = Utc::now();
    let model = branch::ActiveModel {
        tenant_id: Set(tenant.id()),
        name: Set(name),
        tax_id: Set(tax_id),
        notes: Set(input.notes.to_uppercase()),
        bank_account_name: Set(input.bank_account_name.to_uppercase()),
        bank_account_description: Set(input.bank_account_description),
        is_active: Set(true),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

pub async fn find_supplier_by_tax_id<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    tax_id: &str,
) -> Result<Option<supplier::Model>> {
    Supplier::find()
        .filter(supplier::Column::TenantId.eq(tenant.id()))
        .filter(supplier::Column::TaxId.eq(tax_id))
        .filter(supplier::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn find_supplier_by_name<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
) -> Result<Option<supplier::Model>> {
    Supplier::find()
        .filter(supplier::Column::TenantId.eq(tenant.id()))
        .filter(supplier::Column::Name.eq(name.trim().to_uppercase()))
        .filter(supplier::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a supplier, validating the tax id when given and rejecting
/// duplicates within the tenant.
pub async fn create_supplier<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    input: CreateSupplier,
) -> Result<supplier::Model> {
    let name = input.name.trim().to_uppercase();
    if name.is_empty() {
        return Err(Error::validation("name", "supplier name cannot be empty"));
    }

    let tax_id = match input.tax_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let normalized = normalize_tax_id(raw)?;
            if find_supplier_by_tax_id(db, tenant, &normalized).await?.is_some() {
                return Err(Error::conflict(format!(
                    "supplier with tax id {normalized} already exists"
                )));
            }
            Some(normalized)
        }
        _ => None,
    };

    let now = Utc::now();
    let model = supplier::ActiveModel {
        tenant_id: Set(tenant.id()),
        name: Set(name),
        tax_id: Set(tax_id),
        email: Set(input.email),
        phone: Set(input.phone),
        address: Set(input.address.to_uppercase()),
        notes: Set(input.notes.to_uppercase()),
        is_active: Set(true),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

pub async fn find_category_by_name<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::TenantId.eq(tenant.id()))
        .filter(category::Column::Name.eq(name.trim().to_uppercase()))
        .filter(category::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category; the (tenant, name) pair must be free.
pub async fn create_category<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
    description: &str,
    color: &str,
) -> Result<category::Model> {
    let normalized = name.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(Error::validation("name", "category name cannot be empty"));
    }
    if find_category_by_name(db, tenant, &normalized).await?.is_some() {
        return Err(Error::conflict(format!(
            "category `{normalized}` already exists"
        )));
    }

    let now = Utc::now();
    let model = category::ActiveModel {
        tenant_id: Set(tenant.id()),
        name: Set(normalized),
        description: Set(description.to_uppercase()),
        color: Set(color.to_string()),
        is_active: Set(true),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Looks a category up by name, creating it when absent. Returns the model
/// and whether it was created by this call.
pub async fn get_or_create_category<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
) -> Result<(category::Model, bool)> {
    if let Some(existing) = find_category_by_name(db, tenant, name).await? {
        return Ok((existing, false));
    }
    let created = create_category(db, tenant, name, "", "").await?;
    Ok((created, true))
}

pub async fn find_payment_method_by_name<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
) -> Result<Option<payment_method::Model>> {
    PaymentMethod::find()
        .filter(payment_method::Column::TenantId.eq(tenant.id()))
        .filter(payment_method::Column::Name.eq(name.trim().to_uppercase()))
        .filter(payment_method::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a payment method; the (tenant, name) pair must be free.
pub async fn create_payment_method<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
    description: &str,
) -> Result<payment_method::Model> {
    let normalized = name.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(Error::validation("name", "payment method name cannot be empty"));
    }
    if find_payment_method_by_name(db, tenant, &normalized).await?.is_some() {
        return Err(Error::conflict(format!(
            "payment method `{normalized}` already exists"
        )));
    }

    let now = Utc::now();
    let model = payment_method::ActiveModel {
        tenant_id: Set(tenant.id()),
        name: Set(normalized),
        description: Set(description.to_uppercase()),
        is_active: Set(true),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Looks a payment method up by name, creating it when absent. Returns the
/// model and whether it was created by this call.
pub async fn get_or_create_payment_method<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    name: &str,
) -> Result<(payment_method::Model, bool)> {
    if let Some(existing) = find_payment_method_by_name(db, tenant, name).await? {
        return Ok((existing, false));
    }
    let created = create_payment_method(db, tenant, name, "").await?;
    Ok((created, true))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{setup_test_db, tenant, other_tenant};

    #[test]
    fn tax_id_normalization() {
        assert_eq!(
            normalize_tax_id("12.345.678/0001-90").unwrap(),
            "12345678000190"
        );
        assert_eq!(normalize_tax_id("12345678000190").unwrap(), "12345678000190");
        assert!(matches!(
            normalize_tax_id("123"),
            Err(Error::Validation { field: "tax_id", .. })
        ));
    }

    #[tokio::test]
    async fn create_branch_uppercases_and_stores_tax_id() -> Result<()> {
        let db = setup_test_db().await?;

        let branch = create_branch(
            &db,
            tenant(),
            CreateBranch {
                name: "Main Office".to_string(),
                tax_id: Some("12.345.678/0001-90".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(branch.name, "MAIN OFFICE");
        assert_eq!(branch.tax_id.as_deref(), Some("12345678000190"));
        assert!(branch.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_branch_tax_id_conflicts() -> Result<()> {
        let db = setup_test_db().await?;

        create_branch(
            &db,
            tenant(),
            CreateBranch {
                name: "Main".to_string(),
                tax_id: Some("12345678000190".to_string()),
                ..Default::default()
            },
        )
        .await?;

        let err = create_branch(
            &db,
            tenant(),
            CreateBranch {
                name: "Other".to_string(),
                tax_id: Some("12345678000190".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        // Same tax id under another tenant is fine
        create_branch(
            &db,
            other_tenant(),
            CreateBranch {
                name: "Main".to_string(),
                tax_id: Some("12345678000190".to_string()),
                ..Default::default()
            },
        )
        .await?;

        Ok(())
    }

    #[tokio::test]
    async fn name_lookups_are_case_insensitive() -> Result<()> {
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

        let found = find_supplier_by_name(&db, tenant(), "acme ltda").await?;
        assert!(found.is_some());

        let other = find_supplier_by_name(&db, other_tenant(), "acme ltda").await?;
        assert!(other.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_or_create_category_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let (first, created) = get_or_create_category(&db, tenant(), "Services").await?;
        assert!(created);
        let (second, created) = get_or_create_category(&db, tenant(), "SERVICES").await?;
        assert!(!created);
        assert_eq!(first.id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_payment_method_name_conflicts() -> Result<()> {
        let db = setup_test_db().await?;

        create_payment_method(&db, tenant(), "Bank Slip", "").await?;
        let err = create_payment_method(&db, tenant(), "bank slip", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        Ok(())
    }
}
