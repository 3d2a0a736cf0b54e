use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::courier::GeoPoint;
use crate::models::Money;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Merchant,
    DirectPickup,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Accepted,
    Preparing,
    Ready,
    PickedUp,
    Delivering,
    DriverAtCustomer,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Wallet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// A time-boxed exclusive right for one courier to accept the order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub courier_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl Proposal {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderTimestamps {
    pub created_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub delivering_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cash_reconciled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOrder {
    pub id: Uuid,
    pub kind: OrderKind,
    pub customer_id: Uuid,
    pub merchant_id: Option<Uuid>,
    /// Merchant location, or the direct-pickup address.
    pub pickup: Option<GeoPoint>,
    pub dropoff: Option<GeoPoint>,
    pub status: OrderStatus,
    pub assigned_courier: Option<Uuid>,
    pub proposal: Option<Proposal>,
    /// Couriers that declined, let an offer lapse or cancelled after accepting.
    pub excluded_couriers: Vec<Uuid>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub commission_rate_percent: i64,
    pub commission: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub merchant_prepaid_by_courier: bool,
    pub estimated_total_minutes: Option<u32>,
    pub timestamps: OrderTimestamps,
}

impl DeliveryOrder {
    /// Proposal that has not yet expired at `now`.
    pub fn active_proposal(&self, now: DateTime<Utc>) -> Option<&Proposal> {
        self.proposal.as_ref().filter(|p| p.is_active(now))
    }

    pub fn has_expired_proposal(&self, now: DateTime<Utc>) -> bool {
        self.proposal.as_ref().is_some_and(|p| !p.is_active(now))
    }

    pub fn is_ready_and_unassigned(&self) -> bool {
        self.status == OrderStatus::Ready && self.assigned_courier.is_none()
    }

    pub fn exclude_courier(&mut self, courier_id: Uuid) {
        if !self.excluded_couriers.contains(&courier_id) {
            self.excluded_couriers.push(courier_id);
        }
    }

    /// Drops the current proposal, excluding its courier from later offers.
    pub fn withdraw_proposal(&mut self) -> Option<Proposal> {
        let proposal = self.proposal.take()?;
        self.exclude_courier(proposal.courier_id);
        Some(proposal)
    }

    /// Moves to `status` and stamps the matching timestamp.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        let slot = match status {
            OrderStatus::New => &mut self.timestamps.created_at,
            OrderStatus::Accepted => &mut self.timestamps.accepted_at,
            OrderStatus::Preparing => &mut self.timestamps.preparing_at,
            OrderStatus::Ready => &mut self.timestamps.ready_at,
            OrderStatus::PickedUp => &mut self.timestamps.picked_up_at,
            OrderStatus::Delivering => &mut self.timestamps.delivering_at,
            OrderStatus::DriverAtCustomer => &mut self.timestamps.arrived_at,
            OrderStatus::Delivered => &mut self.timestamps.delivered_at,
            OrderStatus::Cancelled => &mut self.timestamps.cancelled_at,
        };
        *slot = Some(now);
    }
}
