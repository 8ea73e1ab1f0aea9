//! Database configuration module.
//!
//! Handles database connection and table creation using `SeaORM`. Table
//! creation uses `Schema::create_table_from_entity` so the schema always
//! matches the entity definitions, plus a handful of raw index statements
//! for the per-tenant uniqueness rules SQLite cannot express through the
//! entity macros (partial unique indexes on optional tax ids).

use crate::entities::{
    AccountPayable, Attachment, Branch, Category, PayablePayment, PaymentMethod, Supplier,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default
/// local `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/payables.sqlite".to_string())
}

/// Establishes a connection using `DATABASE_URL`, falling back to a local
/// `SQLite` file when the variable is unset.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all ledger tables and uniqueness indexes.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    db.execute(builder.build(&schema.create_table_from_entity(Branch)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Supplier)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Category)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(PaymentMethod)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(AccountPayable)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(PayablePayment)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Attachment)))
        .await?;

    // Tax ids are unique per tenant only when present; names are stored
    // upper-cased, so the plain name indexes double as case-insensitive ones.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_unique_branch_tax_id
             ON branches(tenant_id, tax_id)
             WHERE tax_id IS NOT NULL AND tax_id <> '';
         CREATE UNIQUE INDEX IF NOT EXISTS idx_unique_supplier_tax_id
             ON suppliers(tenant_id, tax_id)
             WHERE tax_id IS NOT NULL AND tax_id <> '';
         CREATE UNIQUE INDEX IF NOT EXISTS idx_unique_category_name
             ON categories(tenant_id, name);
         CREATE UNIQUE INDEX IF NOT EXISTS idx_unique_payment_method_name
             ON payment_methods(tenant_id, name);
         CREATE INDEX IF NOT EXISTS idx_payable_tenant_status_due
             ON accounts_payable(tenant_id, status, due_date);
         CREATE INDEX IF NOT EXISTS idx_payment_tenant_payable
             ON payable_payments(tenant_id, account_payable_id);",
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AccountPayableModel, BranchModel, SupplierModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist if querying them succeeds
        let _: Vec<BranchModel> = Branch::find().limit(1).all(&db).await?;
        let _: Vec<SupplierModel> = Supplier::find().limit(1).all(&db).await?;
        let _: Vec<AccountPayableModel> = AccountPayable::find().limit(1).all(&db).await?;
        let _: Vec<crate::entities::PayablePaymentModel> =
            PayablePayment::find().limit(1).all(&db).await?;
        let _: Vec<crate::entities::AttachmentModel> =
            Attachment::find().limit(1).all(&db).await?;

        Ok(())
    }
}
