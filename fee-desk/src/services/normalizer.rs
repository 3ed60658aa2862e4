//! Fee record to fee group normalization.

use crate::models::{FeeGroup, FeeRecord, FeeStatus};
use rust_decimal::Decimal;

const MISSING_PART: &str = "N/A";

/// Map fee records to fee groups, preserving order.
///
/// An empty slice means "no fee groups", never an error.
pub fn normalize(records: &[FeeRecord]) -> Vec<FeeGroup> {
    records.iter().map(normalize_record).collect()
}

pub fn normalize_record(record: &FeeRecord) -> FeeGroup {
    let (discount, fine) = record
        .payment_history
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(discount, fine), p| {
            (
                discount.saturating_add(p.discount_amount),
                fine.saturating_add(p.fine),
            )
        });

    FeeGroup {
        id: record.id.clone(),
        name: group_name(record),
        amount: record.total_fee,
        paid: record.paid_amount,
        balance: record.pending_amount,
        discount,
        fine,
        status: FeeStatus::classify(record.paid_amount, record.total_fee),
        next_payment_due_date: record.next_payment_due_date,
        payments: record.payment_history.clone(),
    }
}

/// `"class - course - batch"`, with `N/A` for each missing part.
fn group_name(record: &FeeRecord) -> String {
    [&record.class_name, &record.course_name, &record.batch_name]
        .iter()
        .map(|part| {
            part.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(MISSING_PART)
        })
        .collect::<Vec<_>>()
        .join(" - ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Payment;
    use chrono::NaiveDate;

    fn record(total: i64, paid: i64) -> FeeRecord {
        FeeRecord {
            id: "fee-1".to_string(),
            student_id: "stu-1".to_string(),
            course_id: Some("course-1".to_string()),
            batch_id: Some("batch-1".to_string()),
            class_name: Some("Class 10".to_string()),
            course_name: Some("Mathematics".to_string()),
            batch_name: Some("Morning".to_string()),
            total_fee: Decimal::from(total),
            paid_amount: Decimal::from(paid),
            pending_amount: Decimal::from(total - paid),
            next_payment_due_date: None,
            payment_history: vec![],
        }
    }

    fn payment(receipt: &str, amount: i64, discount: i64, fine: i64) -> Payment {
        Payment {
            id: format!("pay-{}", receipt),
            receipt_no: receipt.to_string(),
            payment_mode: "cash".to_string(),
            payment_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            amount: Decimal::from(amount),
            discount_amount: Decimal::from(discount),
            fine: Decimal::from(fine),
            transaction_id: None,
            remarks: None,
        }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(normalize_record(&record(1000, 1000)).status, FeeStatus::Paid);
        assert_eq!(normalize_record(&record(1000, 1200)).status, FeeStatus::Paid);
        assert_eq!(normalize_record(&record(1000, 400)).status, FeeStatus::Partial);
        assert_eq!(normalize_record(&record(1000, 0)).status, FeeStatus::Pending);
    }

    #[test]
    fn test_discount_and_fine_accumulate_over_history() {
        let mut rec = record(5000, 3000);
        rec.payment_history = vec![
            payment("R1", 1000, 100, 0),
            payment("R2", 1000, 50, 20),
            payment("R3", 1000, 0, 5),
        ];

        let group = normalize_record(&rec);
        assert_eq!(group.discount, Decimal::from(150));
        assert_eq!(group.fine, Decimal::from(25));
        assert_eq!(group.payments.len(), 3);
    }

    #[test]
    fn test_balance_is_taken_from_server() {
        let mut rec = record(1000, 400);
        rec.pending_amount = Decimal::from(550);

        let group = normalize_record(&rec);
        assert_eq!(group.balance, Decimal::from(550));
        assert_ne!(group.paid + group.balance, group.amount);
    }

    #[test]
    fn test_name_falls_back_per_part() {
        let mut rec = record(1000, 0);
        rec.class_name = None;
        rec.batch_name = Some("  ".to_string());

        assert_eq!(normalize_record(&rec).name, "N/A - Mathematics - N/A");
        assert_eq!(normalize_record(&record(1, 0)).name, "Class 10 - Mathematics - Morning");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&[]).is_empty());
    }
}
