pub mod assignment;
pub mod courier;
pub mod ledger;
pub mod loyalty;
pub mod notification;
pub mod order;
pub mod remittance;

/// Monetary amount in minor currency units.
pub type Money = i64;

/// Largest amount accepted at intake. Sums and percentages of amounts below
/// this bound stay well inside `i64`.
pub const MAX_AMOUNT: Money = 1_000_000_000_000;

/// Integer percentage of `amount`, rounded half-up. Saturates at the `i64`
/// bounds instead of overflowing.
pub fn percent_of(amount: Money, percent: i64) -> Money {
    let scaled = i128::from(amount) * i128::from(percent);
    let rounded = if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    };
    Money::try_from(rounded).unwrap_or(if rounded > 0 { Money::MAX } else { Money::MIN })
}
