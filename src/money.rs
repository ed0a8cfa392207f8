// Rupee rendering and rounding helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Largest single catalogue or add-on price accepted: ₹1 crore
pub const MAX_UNIT_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 2);

/// Largest amount a booking column (`NUMERIC(12, 2)`) can hold
pub const MAX_STORED_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 232, 0, false, 2);

/// Round a money amount to paise, half away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render an amount in Indian rupees with lakh/crore digit grouping,
/// e.g. `₹1,23,456.50` or `-₹500.00`
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let plain = format!("{:.2}", rounded.abs());
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    format!("{}₹{}.{}", sign, group_indian(whole), fraction)
}

/// Last three digits form one group, every two digits before that another.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
