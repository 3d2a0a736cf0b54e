use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ledger::{LedgerEntry, Party};
use crate::models::loyalty::{LoyaltyAccount, LoyaltySummary};
use crate::models::Money;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CourierLedger {
    pub courier_id: Uuid,
    pub balance: Money,
    pub entries: Vec<LedgerEntry>,
}

/// Every entry the courier is party to, oldest first.
pub fn courier_ledger(state: &AppState, courier_id: Uuid) -> Result<CourierLedger, AppError> {
    state.store.courier(courier_id)?;
    let party = Party::Courier(courier_id);

    Ok(CourierLedger {
        courier_id,
        balance: state.store.courier_ledger_balance(courier_id),
        entries: state.store.ledger_entries(|entry| entry.involves(party)),
    })
}

pub fn ledger_for_order(state: &AppState, order_id: Uuid) -> Result<Vec<LedgerEntry>, AppError> {
    state.store.order(order_id)?;
    Ok(state
        .store
        .ledger_entries(|entry| entry.order_id == Some(order_id)))
}

/// Unknown customers read as an empty bronze account.
pub fn loyalty_account(state: &AppState, customer_id: Uuid) -> LoyaltySummary {
    match state.store.loyalty.get(&customer_id) {
        Some(account) => LoyaltySummary::from(account.value()),
        None => LoyaltySummary::from(&LoyaltyAccount::new(customer_id, state.store.now())),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{courier_ledger, ledger_for_order, loyalty_account};
    use crate::config::Rules;
    use crate::engine::settlement::confirm_delivery;
    use crate::engine::test_support::{merchant_order, Harness};
    use crate::models::ledger::LedgerEntryKind;
    use crate::models::loyalty::LoyaltyTier;
    use crate::models::order::PaymentMethod;

    #[test]
    fn order_ledger_lists_settlement_entries_in_order() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let order_id = h.delivering_order(courier_id, merchant_order(Uuid::new_v4(), PaymentMethod::Card));
        confirm_delivery(&h.state, order_id, courier_id).unwrap();

        let kinds: Vec<LedgerEntryKind> = ledger_for_order(&h.state, order_id)
            .unwrap()
            .into_iter()
            .map(|entry| entry.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                LedgerEntryKind::MerchantCredit,
                LedgerEntryKind::CourierEarning,
                LedgerEntryKind::LoyaltyPoints,
            ]
        );
    }

    #[test]
    fn courier_ledger_balance_matches_courier() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let order_id = h.delivering_order(courier_id, merchant_order(Uuid::new_v4(), PaymentMethod::Card));
        confirm_delivery(&h.state, order_id, courier_id).unwrap();

        let ledger = courier_ledger(&h.state, courier_id).unwrap();

        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.balance, 700);
        assert_eq!(
            ledger.balance,
            h.state.store.courier(courier_id).unwrap().available_balance
        );
    }

    #[test]
    fn unknown_customer_has_empty_bronze_account() {
        let h = Harness::new(Rules::default());

        let summary = loyalty_account(&h.state, Uuid::new_v4());

        assert_eq!(summary.points, 0);
        assert_eq!(summary.tier, LoyaltyTier::Bronze);
    }
}
