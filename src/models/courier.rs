use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Money;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Operational standing of a courier account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourierStatus {
    Active,
    Pending,
    Suspended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Busy,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    pub id: Uuid,
    pub name: String,
    pub status: CourierStatus,
    pub availability: Availability,
    pub location: Option<GeoPoint>,
    pub total_earnings: Money,
    pub available_balance: Money,
    pub total_penalties: Money,
    pub total_distance_km: f64,
    pub delivery_count: u32,
    /// Cash collected on delivery and not yet covered by a completed remittance.
    pub cash_on_hand: Money,
    pub updated_at: DateTime<Utc>,
}

impl Courier {
    pub fn new(name: String, location: Option<GeoPoint>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            status: CourierStatus::Pending,
            availability: Availability::Offline,
            location,
            total_earnings: 0,
            available_balance: 0,
            total_penalties: 0,
            total_distance_km: 0.0,
            delivery_count: 0,
            cash_on_hand: 0,
            updated_at: now,
        }
    }

    /// Whether the courier may receive a new offer.
    pub fn can_receive_offers(&self) -> bool {
        self.status == CourierStatus::Active && self.availability == Availability::Available
    }

    pub fn credit(&mut self, amount: Money) {
        self.total_earnings += amount;
        self.available_balance += amount;
    }

    /// Deducts up to `amount` from earnings and balance, each floored at zero.
    /// Returns what was actually taken from the balance.
    pub fn deduct(&mut self, amount: Money) -> Money {
        let taken = amount.min(self.available_balance).max(0);
        self.available_balance -= taken;
        self.total_earnings = (self.total_earnings - amount).max(0);
        self.total_penalties += taken;
        taken
    }
}
