//! Attachment entity - file metadata linked to an owning ledger record.
//!
//! The attachment store itself (bytes, URLs) lives outside this crate; the
//! ledger only tracks metadata keyed by (owner kind, owner id) so it can
//! count attachments and filter them by file type.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::AttachmentOwner;

/// Attachment metadata database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    /// Unique identifier for the attachment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant
    pub tenant_id: i64,
    /// Which entity kind owns this attachment
    pub owner_kind: AttachmentOwner,
    /// Primary key of the owning record
    pub owner_id: i64,
    pub original_filename: String,
    /// Lowercase file type/extension, e.g. "pdf"
    pub file_type: String,
    /// Size in bytes as reported by the external store
    pub file_size: i64,
    pub description: String,
    /// Display order within the owner's attachment list
    pub position: i32,
    /// User who uploaded the file, if known
    pub uploaded_by: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
