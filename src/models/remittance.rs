use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Money;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemittanceMethod {
    BankTransfer,
    CashDeposit,
    MobileMoney,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemittanceStatus {
    Pending,
    Completed,
    Rejected,
}

/// Link between a remittance and one order, with the total captured at claim time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemittanceOrder {
    pub order_id: Uuid,
    pub order_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashRemittance {
    pub id: Uuid,
    pub courier_id: Uuid,
    pub amount: Money,
    pub method: RemittanceMethod,
    pub status: RemittanceStatus,
    pub orders: Vec<RemittanceOrder>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl CashRemittance {
    pub fn linked_total(&self) -> Money {
        self.orders.iter().map(|o| o.order_total).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Complete,
    Reject { reason: String },
}
