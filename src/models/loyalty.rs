use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Money;

const MONEY_PER_POINT: Money = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
}

impl LoyaltyTier {
    pub fn from_points(points: u64) -> Self {
        match points {
            0..=100 => LoyaltyTier::Bronze,
            101..=500 => LoyaltyTier::Silver,
            _ => LoyaltyTier::Gold,
        }
    }
}

/// Points earned for an order total; partial points are dropped.
pub fn points_for_total(total: Money) -> u64 {
    if total <= 0 {
        return 0;
    }
    (total / MONEY_PER_POINT) as u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    pub customer_id: Uuid,
    pub points: u64,
    pub updated_at: DateTime<Utc>,
}

impl LoyaltyAccount {
    pub fn new(customer_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            customer_id,
            points: 0,
            updated_at: now,
        }
    }

    pub fn tier(&self) -> LoyaltyTier {
        LoyaltyTier::from_points(self.points)
    }
}

/// Read model returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltySummary {
    pub customer_id: Uuid,
    pub points: u64,
    pub tier: LoyaltyTier,
}

impl From<&LoyaltyAccount> for LoyaltySummary {
    fn from(account: &LoyaltyAccount) -> Self {
        Self {
            customer_id: account.customer_id,
            points: account.points,
            tier: account.tier(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{points_for_total, LoyaltyTier};

    #[test]
    fn tier_boundaries() {
        assert_eq!(LoyaltyTier::from_points(0), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::from_points(100), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::from_points(101), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::from_points(500), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::from_points(501), LoyaltyTier::Gold);
    }

    #[test]
    fn points_are_floored() {
        assert_eq!(points_for_total(10_000), 100);
        assert_eq!(points_for_total(199), 1);
        assert_eq!(points_for_total(99), 0);
        assert_eq!(points_for_total(-5), 0);
    }
}
