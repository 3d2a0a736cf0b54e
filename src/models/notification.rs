use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::loyalty::LoyaltyTier;
use crate::models::order::OrderStatus;
use crate::models::remittance::RemittanceStatus;
use crate::models::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    Customer(Uuid),
    Merchant(Uuid),
    Courier(Uuid),
    Admin,
}

impl Recipient {
    pub fn notify(self, event: NotificationEvent, now: DateTime<Utc>) -> Notification {
        Notification {
            recipient: self,
            event,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    OrderStatusChanged {
        order_id: Uuid,
        status: OrderStatus,
    },
    OrderProposed {
        order_id: Uuid,
        expires_at: DateTime<Utc>,
    },
    OrderAssigned {
        order_id: Uuid,
        courier_id: Uuid,
    },
    OrderReleased {
        order_id: Uuid,
    },
    MerchantCredited {
        order_id: Uuid,
        amount: Money,
    },
    EarningsCredited {
        order_id: Uuid,
        amount: Money,
    },
    DailyGoalReached {
        deliveries: usize,
        bonus: Money,
    },
    LatePenaltyApplied {
        order_id: Uuid,
        delay_minutes: f64,
        amount: Money,
    },
    CancellationPenaltyApplied {
        order_id: Uuid,
        amount: Money,
    },
    LoyaltyPointsAwarded {
        order_id: Uuid,
        points: u64,
        total_points: u64,
    },
    LoyaltyTierChanged {
        from: LoyaltyTier,
        to: LoyaltyTier,
    },
    RemittanceSubmitted {
        remittance_id: Uuid,
        courier_id: Uuid,
        amount: Money,
    },
    RemittanceReviewed {
        remittance_id: Uuid,
        status: RemittanceStatus,
    },
}

impl NotificationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NotificationEvent::OrderStatusChanged { .. } => "order_status_changed",
            NotificationEvent::OrderProposed { .. } => "order_proposed",
            NotificationEvent::OrderAssigned { .. } => "order_assigned",
            NotificationEvent::OrderReleased { .. } => "order_released",
            NotificationEvent::MerchantCredited { .. } => "merchant_credited",
            NotificationEvent::EarningsCredited { .. } => "earnings_credited",
            NotificationEvent::DailyGoalReached { .. } => "daily_goal_reached",
            NotificationEvent::LatePenaltyApplied { .. } => "late_penalty_applied",
            NotificationEvent::CancellationPenaltyApplied { .. } => "cancellation_penalty_applied",
            NotificationEvent::LoyaltyPointsAwarded { .. } => "loyalty_points_awarded",
            NotificationEvent::LoyaltyTierChanged { .. } => "loyalty_tier_changed",
            NotificationEvent::RemittanceSubmitted { .. } => "remittance_submitted",
            NotificationEvent::RemittanceReviewed { .. } => "remittance_reviewed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub event: NotificationEvent,
    pub created_at: DateTime<Utc>,
}
