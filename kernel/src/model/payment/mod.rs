use crate::model::id::{BookingId, PaymentId};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

pub mod event;
pub mod notification;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentKind {
    Full,
    Prepayment,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    WaitingForCapture,
    Succeeded,
    Canceled,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Canceled)
    }

    // 終端状態からは遷移しない。同じ状態への更新も遷移とはみなさない
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        match (self, next) {
            (current, _) if current.is_terminal() => false,
            (current, next) if current == next => false,
            (Self::WaitingForCapture, Self::Pending) => false,
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub booking_id: BookingId,
    pub amount: Decimal,
    pub kind: PaymentKind,
    pub status: PaymentStatus,
    pub gateway_payment_id: Option<String>,
    pub idempotence_key: Uuid,
    pub created_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
}

// 支払い種別ごとの請求額。前払いは通貨の最小単位（小数点以下2桁）で四捨五入する
pub fn amount_due(total_cost: Decimal, kind: PaymentKind, prepayment_percent: u32) -> Decimal {
    match kind {
        PaymentKind::Full => total_cost,
        PaymentKind::Prepayment => (total_cost * Decimal::from(prepayment_percent)
            / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    pub full_amount: Decimal,
    pub prepayment_amount: Decimal,
    pub remaining_amount: Decimal,
    pub prepayment_percent: u32,
    pub refund_days: u32,
}

impl PaymentSummary {
    pub fn new(total_cost: Decimal, prepayment_percent: u32, refund_days: u32) -> Self {
        let prepayment_amount = amount_due(total_cost, PaymentKind::Prepayment, prepayment_percent);
        Self {
            full_amount: total_cost,
            prepayment_amount,
            remaining_amount: total_cost - prepayment_amount,
            prepayment_percent,
            refund_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_percent_prepayment_of_15000() {
        let summary = PaymentSummary::new(Decimal::from(15000), 30, 3);
        assert_eq!(summary.full_amount, Decimal::from(15000));
        assert_eq!(summary.prepayment_amount, Decimal::from(4500));
        assert_eq!(summary.remaining_amount, Decimal::from(10500));
    }

    #[test]
    fn full_payment_is_the_exact_total() {
        let total = Decimal::new(1234567, 2);
        assert_eq!(amount_due(total, PaymentKind::Full, 30), total);
    }

    #[test]
    fn prepayment_is_rounded_to_kopecks() {
        // 100.05 * 0.3 = 30.015 -> 30.02
        let amount = amount_due(Decimal::new(10005, 2), PaymentKind::Prepayment, 30);
        assert_eq!(amount, Decimal::new(3002, 2));
        // 333.33 * 0.3 = 99.999 -> 100.00
        let amount = amount_due(Decimal::new(33333, 2), PaymentKind::Prepayment, 30);
        assert_eq!(amount, Decimal::from(100));
    }

    #[test]
    fn terminal_states_do_not_transition() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Succeeded));
        assert!(Pending.can_transition_to(Canceled));
        assert!(Pending.can_transition_to(WaitingForCapture));
        assert!(WaitingForCapture.can_transition_to(Succeeded));
        assert!(!WaitingForCapture.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        for next in [Pending, WaitingForCapture, Succeeded, Canceled] {
            assert!(!Succeeded.can_transition_to(next));
            assert!(!Canceled.can_transition_to(next));
        }
    }

    #[test]
    fn status_strings_match_gateway_vocabulary() {
        assert_eq!(
            "waiting_for_capture".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::WaitingForCapture
        );
        assert_eq!(PaymentStatus::Succeeded.as_ref(), "succeeded");
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }
}
