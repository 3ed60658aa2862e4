pub mod app;
pub mod collection;
pub mod discounts;
pub mod fees;
pub mod metrics;

/// The operator's calendar date. Due dates are compared against it.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
