//! Append-only financial records.
//!
//! Amounts are signed from the point of view of the non-platform party:
//! a courier earning is positive, a courier penalty is negative. Summing every
//! entry that involves a courier therefore yields that courier's balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Party {
    Platform,
    Merchant(Uuid),
    Courier(Uuid),
    Customer(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    MerchantCredit,
    CourierEarning,
    DailyGoalBonus,
    LatePenalty,
    CancellationPenalty,
    LoyaltyPoints,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryKind::MerchantCredit => "merchant_credit",
            LedgerEntryKind::CourierEarning => "courier_earning",
            LedgerEntryKind::DailyGoalBonus => "daily_goal_bonus",
            LedgerEntryKind::LatePenalty => "late_penalty",
            LedgerEntryKind::CancellationPenalty => "cancellation_penalty",
            LedgerEntryKind::LoyaltyPoints => "loyalty_points",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryStatus {
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    /// Append position, assigned by the store.
    pub seq: u64,
    pub order_id: Option<Uuid>,
    pub kind: LedgerEntryKind,
    pub amount: Money,
    pub source: Party,
    pub destination: Party,
    pub status: LedgerEntryStatus,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn completed(
        order_id: Option<Uuid>,
        kind: LedgerEntryKind,
        amount: Money,
        source: Party,
        destination: Party,
        metadata: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq: 0,
            order_id,
            kind,
            amount,
            source,
            destination,
            status: LedgerEntryStatus::Completed,
            metadata,
            created_at,
        }
    }

    pub fn involves(&self, party: Party) -> bool {
        self.source == party || self.destination == party
    }
}
