pub mod collection;
pub mod discount;
pub mod draft_validator;
pub mod due_status;
pub mod fee_api;
pub mod fee_cache;
pub mod metrics;
pub mod normalizer;
pub mod submission;
pub mod totals;

pub use collection::{CollectionRules, CollectionSession};
pub use discount::DiscountMode;
pub use draft_validator::{DraftError, DraftErrors, DraftField};
pub use fee_api::{FeeApiClient, FeeApiError, FeeLedger, LedgerAck, RevertPaymentRequest};
pub use fee_cache::FeeCache;
pub use submission::{CollectFeeRequest, SubmissionPolicy};
