use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binding result of a successful acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub order_id: Uuid,
    pub courier_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

/// Outcome of a proposal attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalOutcome {
    pub proposed: bool,
    pub courier_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProposalOutcome {
    pub fn skipped() -> Self {
        Self {
            proposed: false,
            courier_id: None,
            expires_at: None,
        }
    }
}
