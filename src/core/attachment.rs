//! Attachment metadata for obligations and payments.
//!
//! The ledger stores metadata only (filename, type, size, position); the
//! bytes live wherever the caller keeps them. One attachment table serves
//! both owner kinds through the `Attachable` seam.

use crate::{
    core::{payable::get_payable, TenantScope},
    entities::{
        account_payable, attachment, payable_payment, Attachment, PayablePayment,
        types::AttachmentOwner,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// A record attachments can hang off.
pub trait Attachable {
    const OWNER_KIND: AttachmentOwner;

    fn owner_id(&self) -> i64;
}

impl Attachable for account_payable::Model {
    const OWNER_KIND: AttachmentOwner = AttachmentOwner::AccountPayable;

    fn owner_id(&self) -> i64 {
        self.id
    }
}

impl Attachable for payable_payment::Model {
    const OWNER_KIND: AttachmentOwner = AttachmentOwner::PayablePayment;

    fn owner_id(&self) -> i64 {
        self.id
    }
}

/// Input for attaching a file's metadata to a record.
#[derive(Debug, Clone)]
pub struct AddAttachment {
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub description: String,
    pub uploaded_by: Option<i64>,
}

async fn check_owner_visible<C: ConnectionTrait>(
    db: &C,
    tenant: TenantScope,
    owner_kind: AttachmentOwner,
    owner_id: i64,
) -> Result<()> {
    match owner_kind {
        AttachmentOwner::AccountPayable => {
            get_payable(db, tenant, owner_id).await?;
        }
        AttachmentOwner::PayablePayment => {
            PayablePayment::find_by_id(owner_id)
                .filter(payable_payment::Column::TenantId.eq(tenant.id()))
                .one(db)
                .await?
                .ok_or(Error::not_found("payment"))?;
        }
    }
    Ok(())
}

/// Attaches metadata to a record, appending at the end of its list.
pub async fn add_attachment<C: ConnectionTrait, A: Attachable>(
    db: &C,
    tenant: TenantScope,
    owner: &A,
    input: AddAttachment,
) -> Result<attachment::Model> {
    if input.original_filename.trim().is_empty() {
        return Err(Error::validation(
            "original_filename",
            "filename cannot be empty",
        ));
    }
    if input.file_size < 0 {
        return Err(Error::validation("file_size", "file size cannot be negative"));
    }
    check_owner_visible(db, tenant, A::OWNER_KIND, owner.owner_id()).await?;

    let position = count_attachments(db, tenant, owner).await?;

    let now = Utc::now();
    attachment::ActiveModel {
        tenant_id: Set(tenant.id()),
        owner_kind: Set(A::OWNER_KIND),
        owner_id: Set(owner.owner_id()),
        original_filename: Set(input.original_filename),
        file_type: Set(input.file_type),
        file_size: Set(input.file_size),
        description: Set(input.description),
        position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        uploaded_by: Set(input.uploaded_by),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Counts the attachments on one record.
pub async fn count_attachments<C: ConnectionTrait, A: Attachable>(
    db: &C,
    tenant: TenantScope,
    owner: &A,
) -> Result<u64> {
    Attachment::find()
        .filter(attachment::Column::TenantId.eq(tenant.id()))
        .filter(attachment::Column::OwnerKind.eq(A::OWNER_KIND))
        .filter(attachment::Column::OwnerId.eq(owner.owner_id()))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Lists a record's attachments in upload order.
pub async fn list_attachments<C: ConnectionTrait, A: Attachable>(
    db: &C,
    tenant: TenantScope,
    owner: &A,
) -> Result<Vec<attachment::Model>> {
    Attachment::find()
        .filter(attachment::Column::TenantId.eq(tenant.id()))
        .filter(attachment::Column::OwnerKind.eq(A::OWNER_KIND))
        .filter(attachment::Column::OwnerId.eq(owner.owner_id()))
        .order_by_asc(attachment::Column::Position)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a record's attachments whose file type contains the given
/// fragment, e.g. `"pdf"` or `"image"`.
pub async fn attachments_by_type<C: ConnectionTrait, A: Attachable>(
    db: &C,
    tenant: TenantScope,
    owner: &A,
    type_fragment: &str,
) -> Result<Vec<attachment::Model>> {
    Attachment::find()
        .filter(attachment::Column::TenantId.eq(tenant.id()))
        .filter(attachment::Column::OwnerKind.eq(A::OWNER_KIND))
        .filter(attachment::Column::OwnerId.eq(owner.owner_id()))
        .filter(attachment::Column::FileType.contains(type_fragment))
        .order_by_asc(attachment::Column::Position)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::payable::{create_payable, CreatePayable},
        test_utils::{dec, other_tenant, seed_refs, setup_test_db, tenant, today},
    };

    fn pdf(name: &str) -> AddAttachment {
        AddAttachment {
            original_filename: name.to_string(),
            file_type: "application/pdf".to_string(),
            file_size: 1024,
            description: String::new(),
            uploaded_by: None,
        }
    }

    async fn seeded_payable(
        db: &sea_orm::DatabaseConnection,
    ) -> Result<account_payable::Model> {
        let refs = seed_refs(db, tenant()).await?;
        Ok(create_payable(
            db,
            tenant(),
            CreatePayable::new(
                refs.branch.id,
                refs.supplier.id,
                refs.category.id,
                "RENT",
                dec("100.00"),
                today(),
                today(),
            ),
            today(),
        )
        .await?
        .payable)
    }

    #[tokio::test]
    async fn attachments_append_in_positional_order() -> Result<()> {
        let db = setup_test_db().await?;
        let payable = seeded_payable(&db).await?;

        add_attachment(&db, tenant(), &payable, pdf("invoice.pdf")).await?;
        let mut image = pdf("receipt.png");
        image.file_type = "image/png".to_string();
        add_attachment(&db, tenant(), &payable, image).await?;

        let all = list_attachments(&db, tenant(), &payable).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].position, 0);
        assert_eq!(all[0].original_filename, "invoice.pdf");
        assert_eq!(all[1].position, 1);

        assert_eq!(count_attachments(&db, tenant(), &payable).await?, 2);

        let pdfs = attachments_by_type(&db, tenant(), &payable, "pdf").await?;
        assert_eq!(pdfs.len(), 1);
        let images = attachments_by_type(&db, tenant(), &payable, "image").await?;
        assert_eq!(images.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn attaching_across_tenants_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let payable = seeded_payable(&db).await?;

        let err = add_attachment(&db, other_tenant(), &payable, pdf("invoice.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn empty_filename_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let payable = seeded_payable(&db).await?;

        let err = add_attachment(&db, tenant(), &payable, pdf("  "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation { field: "original_filename", .. }
        ));
        Ok(())
    }
}
