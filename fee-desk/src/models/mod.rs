//! Domain models for fee collection.

mod discount;
mod draft;
mod fee_group;
mod fee_record;
mod role;
pub mod wire;

pub use discount::{DiscountRule, DiscountType};
pub use draft::PaymentDraft;
pub use fee_group::{FeeGroup, FeeStatus};
pub use fee_record::{FeeRecord, Payment};
pub use role::{Role, UnknownRole};
