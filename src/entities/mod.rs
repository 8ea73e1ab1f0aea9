//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account_payable;
pub mod attachment;
pub mod branch;
pub mod category;
pub mod payable_payment;
pub mod payment_method;
pub mod supplier;
pub mod types;

// Re-export specific types to avoid conflicts
pub use account_payable::{Entity as AccountPayable, Model as AccountPayableModel};
pub use attachment::{Entity as Attachment, Model as AttachmentModel};
pub use branch::{Entity as Branch, Model as BranchModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use payable_payment::{Entity as PayablePayment, Model as PayablePaymentModel};
pub use payment_method::{Entity as PaymentMethod, Model as PaymentMethodModel};
pub use supplier::{Entity as Supplier, Model as SupplierModel};
pub use types::{AttachmentOwner, PayableStatus, RecurrenceFrequency};
