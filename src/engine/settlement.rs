//! Delivery confirmation and its financial consequences.
//!
//! Everything happens inside one unit of work on the order: the status change,
//! the merchant credit, courier earnings and counters, the daily goal bonus,
//! the late penalty and loyalty points. Either all of it commits or none of it
//! does.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, ReasonCode};
use crate::geo::distance_km;
use crate::models::courier::Availability;
use crate::models::ledger::{LedgerEntry, LedgerEntryKind, LedgerEntryStatus, Party};
use crate::models::loyalty::points_for_total;
use crate::models::notification::{NotificationEvent, Recipient};
use crate::models::order::{DeliveryOrder, OrderStatus, PaymentMethod, PaymentStatus};
use crate::models::{percent_of, Money};
use crate::state::AppState;
use crate::store::{CourierOp, Store, UnitOfWork};

/// Shortest delivery leg the lateness check will assume.
const MIN_DELIVERY_LEG_MINUTES: f64 = 15.0;

#[derive(Debug, Clone, Serialize)]
pub struct LatePenalty {
    pub delay_minutes: f64,
    pub deducted: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    pub order_id: Uuid,
    pub courier_id: Uuid,
    pub merchant_credit: Option<Money>,
    pub courier_earnings: Money,
    pub daily_goal_bonus: Option<Money>,
    pub late_penalty: Option<LatePenalty>,
    pub loyalty_points: u64,
    pub entries: Vec<LedgerEntry>,
}

pub fn confirm_delivery(
    state: &AppState,
    order_id: Uuid,
    courier_id: Uuid,
) -> Result<SettlementReport, AppError> {
    let start = Instant::now();
    let result = settle(state, order_id, courier_id);

    let outcome = match &result {
        Ok(_) => "settled",
        Err(AppError::Conflict { .. }) => "conflict",
        Err(_) => "error",
    };
    state
        .metrics
        .settlement_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .settlements_total
        .with_label_values(&[outcome])
        .inc();

    result
}

fn settle(state: &AppState, order_id: Uuid, courier_id: Uuid) -> Result<SettlementReport, AppError> {
    let rules = &state.rules;

    let (late_delay, committed) = state
        .store
        .transact(order_id, |store, uow| {
            check_deliverable(&uow.order, courier_id)?;
            // Fails the unit before anything is staged if the courier vanished.
            store.courier(courier_id)?;

            let now = uow.now;
            uow.order.set_status(OrderStatus::Delivered, now);
            if uow.order.payment_method == PaymentMethod::Cash {
                uow.order.payment_status = PaymentStatus::Paid;
            }

            credit_merchant(store, uow);

            let earnings = percent_of(uow.order.delivery_fee, rules.courier_share_percent);
            uow.courier(
                courier_id,
                CourierOp::Credit {
                    kind: LedgerEntryKind::CourierEarning,
                    amount: earnings,
                    metadata: json!({
                        "delivery_fee": uow.order.delivery_fee,
                        "share_percent": rules.courier_share_percent,
                    }),
                },
            );
            let cash_collected = match uow.order.payment_method {
                PaymentMethod::Cash => uow.order.total,
                PaymentMethod::Card | PaymentMethod::Wallet => 0,
            };
            uow.courier(
                courier_id,
                CourierOp::RecordDelivery {
                    distance_km: distance_km(uow.order.pickup.as_ref(), uow.order.dropoff.as_ref())
                        .unwrap_or(0.0),
                    cash_collected,
                },
            );
            uow.courier(courier_id, CourierOp::SetAvailability(Availability::Available));
            uow.notify(
                Recipient::Courier(courier_id),
                NotificationEvent::EarningsCredited {
                    order_id,
                    amount: earnings,
                },
            );

            uow.courier(
                courier_id,
                CourierOp::DailyGoal {
                    target: rules.daily_goal_target,
                    bonus: rules.daily_goal_bonus_amount,
                },
            );

            let late_delay = delay_minutes(&uow.order, now)
                .filter(|delay| *delay > rules.late_penalty_threshold_minutes);
            if let Some(delay) = late_delay {
                uow.courier(
                    courier_id,
                    CourierOp::Deduct {
                        kind: LedgerEntryKind::LatePenalty,
                        amount: rules.late_penalty_amount,
                        metadata: json!({
                            "delay_minutes": delay,
                            "threshold_minutes": rules.late_penalty_threshold_minutes,
                        }),
                    },
                );
                uow.notify(
                    Recipient::Courier(courier_id),
                    NotificationEvent::LatePenaltyApplied {
                        order_id,
                        delay_minutes: delay,
                        amount: rules.late_penalty_amount,
                    },
                );
            }

            uow.award_points(uow.order.customer_id, points_for_total(uow.order.total));

            let delivered = NotificationEvent::OrderStatusChanged {
                order_id,
                status: OrderStatus::Delivered,
            };
            uow.notify(Recipient::Customer(uow.order.customer_id), delivered.clone());
            if let Some(merchant_id) = uow.order.merchant_id {
                uow.notify(Recipient::Merchant(merchant_id), delivered);
            }

            Ok(late_delay)
        })
        .inspect_err(|err| {
            warn!(order_id = %order_id, courier_id = %courier_id, error = %err, "settlement rejected")
        })?;
    state.publish(&committed);

    let amount_of = |kind: LedgerEntryKind| {
        committed
            .entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.amount)
    };

    let report = SettlementReport {
        order_id,
        courier_id,
        merchant_credit: amount_of(LedgerEntryKind::MerchantCredit),
        courier_earnings: amount_of(LedgerEntryKind::CourierEarning).unwrap_or(0),
        daily_goal_bonus: amount_of(LedgerEntryKind::DailyGoalBonus),
        late_penalty: late_delay.map(|delay_minutes| LatePenalty {
            delay_minutes,
            deducted: -amount_of(LedgerEntryKind::LatePenalty).unwrap_or(0),
        }),
        loyalty_points: amount_of(LedgerEntryKind::LoyaltyPoints).unwrap_or(0) as u64,
        entries: committed.entries,
    };

    info!(
        order_id = %order_id,
        courier_id = %courier_id,
        earnings = report.courier_earnings,
        bonus = ?report.daily_goal_bonus,
        late = report.late_penalty.is_some(),
        "delivery settled"
    );
    Ok(report)
}

fn check_deliverable(order: &DeliveryOrder, courier_id: Uuid) -> Result<(), AppError> {
    if order.status == OrderStatus::Delivered {
        return Err(AppError::conflict(
            ReasonCode::AlreadySettled,
            format!("order {} is already delivered", order.id),
        ));
    }
    if order.assigned_courier != Some(courier_id) {
        return Err(AppError::conflict(
            ReasonCode::NotPermitted,
            format!("order {} is not assigned to courier {courier_id}", order.id),
        ));
    }
    if !matches!(
        order.status,
        OrderStatus::Delivering | OrderStatus::DriverAtCustomer
    ) {
        return Err(AppError::conflict(
            ReasonCode::InvalidTransition,
            format!("order {} cannot be delivered from {:?}", order.id, order.status),
        ));
    }
    Ok(())
}

/// Credits the merchant's net revenue unless it was prepaid by the courier,
/// the order is unpaid, or a completed credit already exists for this order.
fn credit_merchant(store: &Store, uow: &mut UnitOfWork) {
    let Some(merchant_id) = uow.order.merchant_id else {
        return;
    };
    let order_id = uow.order.id;
    let commission = percent_of(uow.order.subtotal, uow.order.commission_rate_percent);
    uow.order.commission = commission;

    if uow.order.payment_status != PaymentStatus::Paid || uow.order.merchant_prepaid_by_courier {
        return;
    }

    let merchant = Party::Merchant(merchant_id);
    let already_credited = !store
        .ledger_entries(|entry| {
            entry.order_id == Some(order_id)
                && entry.kind == LedgerEntryKind::MerchantCredit
                && entry.status == LedgerEntryStatus::Completed
                && entry.destination == merchant
        })
        .is_empty();
    if already_credited {
        warn!(order_id = %order_id, merchant_id = %merchant_id, "merchant already credited");
        return;
    }

    let net = uow.order.subtotal - commission;
    uow.append(LedgerEntry::completed(
        Some(order_id),
        LedgerEntryKind::MerchantCredit,
        net,
        Party::Platform,
        merchant,
        json!({
            "subtotal": uow.order.subtotal,
            "commission": commission,
            "commission_rate_percent": uow.order.commission_rate_percent,
        }),
        uow.now,
    ));
    uow.notify(
        Recipient::Merchant(merchant_id),
        NotificationEvent::MerchantCredited {
            order_id,
            amount: net,
        },
    );
}

/// Minutes beyond the expected delivery leg, when the order carries both an
/// estimate and a pickup time.
pub fn delay_minutes(order: &DeliveryOrder, now: DateTime<Utc>) -> Option<f64> {
    let estimated = order.estimated_total_minutes?;
    let picked_up_at = order.timestamps.picked_up_at?;

    let actual = (now - picked_up_at).num_seconds() as f64 / 60.0;
    let expected_leg = (0.5 * f64::from(estimated)).max(MIN_DELIVERY_LEG_MINUTES);

    Some(actual - expected_leg)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::confirm_delivery;
    use crate::config::Rules;
    use crate::engine::lifecycle::{transition, Actor};
    use crate::engine::test_support::{direct_order, merchant_order, Harness};
    use crate::error::ReasonCode;
    use crate::models::courier::Availability;
    use crate::models::ledger::{LedgerEntryKind, Party};
    use crate::models::loyalty::LoyaltyTier;
    use crate::models::MAX_AMOUNT;
    use crate::models::notification::{Notification, NotificationEvent, Recipient};
    use crate::models::order::{OrderStatus, PaymentMethod, PaymentStatus};
    use crate::notify::{NotificationDispatcher, NotifyError};

    #[test]
    fn courier_keeps_configured_share_of_delivery_fee() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let order_id = h.delivering_order(courier_id, merchant_order(Uuid::new_v4(), PaymentMethod::Card));

        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert_eq!(report.courier_earnings, 700);
        let courier = h.state.store.courier(courier_id).unwrap();
        assert_eq!(courier.total_earnings, 700);
        assert_eq!(courier.available_balance, 700);
        assert_eq!(courier.delivery_count, 1);
        assert!(courier.total_distance_km > 0.0);
        assert_eq!(courier.availability, Availability::Available);
    }

    #[test]
    fn merchant_receives_subtotal_minus_commission() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let merchant_id = Uuid::new_v4();
        let order_id = h.delivering_order(courier_id, merchant_order(merchant_id, PaymentMethod::Card));

        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert_eq!(report.merchant_credit, Some(7_650));
        let order = h.state.store.order(order_id).unwrap();
        assert_eq!(order.commission, 1_350);
        assert_eq!(order.status, OrderStatus::Delivered);
        let credits = h.state.store.ledger_entries(|e| e.destination == Party::Merchant(merchant_id));
        assert_eq!(credits.len(), 1);
    }

    #[test]
    fn largest_accepted_order_settles() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let mut request = merchant_order(Uuid::new_v4(), PaymentMethod::Card);
        request.subtotal = MAX_AMOUNT;
        let order_id = h.delivering_order(courier_id, request);

        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert_eq!(report.merchant_credit, Some(850_000_000_000));
        assert_eq!(h.state.store.order(order_id).unwrap().commission, 150_000_000_000);
    }

    #[test]
    fn merchant_prepaid_by_courier_gets_no_platform_credit() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let mut request = merchant_order(Uuid::new_v4(), PaymentMethod::Card);
        request.merchant_prepaid_by_courier = true;
        let order_id = h.delivering_order(courier_id, request);

        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert!(report.merchant_credit.is_none());
    }

    #[test]
    fn cash_order_is_marked_paid_and_tracked_on_courier() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let order_id = h.delivering_order(courier_id, merchant_order(Uuid::new_v4(), PaymentMethod::Cash));

        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        let order = h.state.store.order(order_id).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(report.merchant_credit.is_some());
        assert_eq!(h.state.store.courier(courier_id).unwrap().cash_on_hand, 10_000);
    }

    #[test]
    fn second_confirmation_credits_nothing() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let order_id = h.delivering_order(courier_id, merchant_order(Uuid::new_v4(), PaymentMethod::Card));

        confirm_delivery(&h.state, order_id, courier_id).unwrap();
        let entries_after_first = h.state.store.ledger.len();
        let err = confirm_delivery(&h.state, order_id, courier_id).unwrap_err();

        assert_eq!(err.code(), Some(ReasonCode::AlreadySettled));
        assert_eq!(h.state.store.ledger.len(), entries_after_first);
        assert_eq!(h.state.store.courier(courier_id).unwrap().available_balance, 700);
    }

    #[test]
    fn only_the_assigned_courier_may_confirm() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let stranger = h.courier();
        let order_id = h.delivering_order(courier_id, merchant_order(Uuid::new_v4(), PaymentMethod::Card));

        let err = confirm_delivery(&h.state, order_id, stranger).unwrap_err();

        assert_eq!(err.code(), Some(ReasonCode::NotPermitted));
        assert_eq!(h.state.store.order(order_id).unwrap().status, OrderStatus::Delivering);
        assert!(h.state.store.ledger.is_empty());
    }

    #[test]
    fn late_delivery_is_penalized() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let mut request = merchant_order(Uuid::new_v4(), PaymentMethod::Card);
        request.estimated_total_minutes = Some(30);
        let order_id = h.delivering_order(courier_id, request);

        h.clock.advance(Duration::minutes(40));
        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        let penalty = report.late_penalty.unwrap();
        assert!((penalty.delay_minutes - 25.0).abs() < 1e-9);
        assert_eq!(penalty.deducted, 200);
        let courier = h.state.store.courier(courier_id).unwrap();
        assert_eq!(courier.available_balance, 500);
        assert_eq!(courier.total_penalties, 200);
    }

    #[test]
    fn delivery_within_threshold_is_not_penalized() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let mut request = merchant_order(Uuid::new_v4(), PaymentMethod::Card);
        request.estimated_total_minutes = Some(30);
        let order_id = h.delivering_order(courier_id, request);

        h.clock.advance(Duration::minutes(30));
        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert!(report.late_penalty.is_none());
    }

    #[test]
    fn order_without_estimate_is_never_late() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let request = merchant_order(Uuid::new_v4(), PaymentMethod::Card);
        assert!(request.estimated_total_minutes.is_none());
        let order_id = h.delivering_order(courier_id, request);

        h.clock.advance(Duration::hours(3));
        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert!(report.late_penalty.is_none());
        assert!(h
            .state
            .store
            .ledger_entries(|e| e.kind == LedgerEntryKind::LatePenalty)
            .is_empty());
        assert_eq!(h.state.store.courier(courier_id).unwrap().available_balance, 700);
    }

    #[test]
    fn penalty_amount_does_not_grow_with_delay() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let mut request = merchant_order(Uuid::new_v4(), PaymentMethod::Card);
        request.estimated_total_minutes = Some(60);
        let order_id = h.delivering_order(courier_id, request);

        h.clock.advance(Duration::hours(5));
        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert_eq!(report.late_penalty.unwrap().deducted, 200);
    }

    #[test]
    fn daily_goal_bonus_fires_once_at_target() {
        let rules = Rules {
            daily_goal_target: 3,
            ..Rules::default()
        };
        let h = Harness::new(rules);
        let courier_id = h.courier();

        let mut bonuses = Vec::new();
        for _ in 0..4 {
            let order_id = h.delivering_order(courier_id, direct_order(3_000, PaymentMethod::Card));
            let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();
            bonuses.push(report.daily_goal_bonus);
        }

        assert_eq!(bonuses, vec![None, None, Some(2_000), None]);
        let courier = h.state.store.courier(courier_id).unwrap();
        assert_eq!(courier.available_balance, 4 * 350 + 2_000);
    }

    #[test]
    fn daily_goal_count_resets_on_a_new_day() {
        let rules = Rules {
            daily_goal_target: 1,
            ..Rules::default()
        };
        let h = Harness::new(rules);
        let courier_id = h.courier();

        h.clock.set(Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap());
        let first = h.delivering_order(courier_id, direct_order(3_000, PaymentMethod::Card));
        assert!(confirm_delivery(&h.state, first, courier_id).unwrap().daily_goal_bonus.is_some());

        h.clock.set(Utc.with_ymd_and_hms(2024, 5, 2, 0, 1, 0).unwrap());
        let second = h.delivering_order(courier_id, direct_order(3_000, PaymentMethod::Card));
        assert!(confirm_delivery(&h.state, second, courier_id).unwrap().daily_goal_bonus.is_some());
    }

    #[test]
    fn loyalty_points_accumulate_and_tier_is_derived() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let customer_id = Uuid::new_v4();

        let mut request = direct_order(20_000, PaymentMethod::Card);
        request.customer_id = customer_id;
        let order_id = h.delivering_order(courier_id, request);
        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert_eq!(report.loyalty_points, 200);
        let account = h.state.store.loyalty.get(&customer_id).unwrap().clone();
        assert_eq!(account.points, 200);
        assert_eq!(account.tier(), LoyaltyTier::Silver);
    }

    #[test]
    fn ledger_sum_matches_courier_balance() {
        let rules = Rules {
            daily_goal_target: 2,
            ..Rules::default()
        };
        let h = Harness::new(rules);
        let courier_id = h.courier();

        for minutes in [10, 60, 5] {
            let mut request = direct_order(4_000, PaymentMethod::Cash);
            request.estimated_total_minutes = Some(20);
            let order_id = h.delivering_order(courier_id, request);
            h.clock.advance(Duration::minutes(minutes));
            confirm_delivery(&h.state, order_id, courier_id).unwrap();
        }

        let courier = h.state.store.courier(courier_id).unwrap();
        assert_eq!(
            h.state.store.courier_ledger_balance(courier_id),
            courier.available_balance
        );
        let kinds: Vec<LedgerEntryKind> = h
            .state
            .store
            .ledger_entries(|e| e.involves(Party::Courier(courier_id)))
            .into_iter()
            .map(|e| e.kind)
            .collect();
        assert!(kinds.contains(&LedgerEntryKind::LatePenalty));
        assert!(kinds.contains(&LedgerEntryKind::DailyGoalBonus));
    }

    #[test]
    fn arrival_step_is_optional() {
        let h = Harness::new(Rules::default());
        let courier_id = h.courier();
        let order_id = h.delivering_order(courier_id, direct_order(3_000, PaymentMethod::Card));
        transition(
            &h.state,
            order_id,
            Actor::Courier(courier_id),
            OrderStatus::DriverAtCustomer,
        )
        .unwrap();

        assert!(confirm_delivery(&h.state, order_id, courier_id).is_ok());
    }

    struct FailingDispatcher;

    impl NotificationDispatcher for FailingDispatcher {
        fn dispatch(&self, _notification: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Dispatch("gateway down".to_string()))
        }
    }

    #[derive(Default)]
    struct CapturingDispatcher {
        sent: Mutex<Vec<Notification>>,
    }

    impl CapturingDispatcher {
        fn tier_changes(&self) -> Vec<(Recipient, NotificationEvent)> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|n| matches!(n.event, NotificationEvent::LoyaltyTierChanged { .. }))
                .map(|n| (n.recipient, n.event.clone()))
                .collect()
        }
    }

    impl NotificationDispatcher for CapturingDispatcher {
        fn dispatch(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    #[test]
    fn crossing_a_tier_boundary_notifies_the_customer() {
        let mut h = Harness::new(Rules::default());
        let capture = Arc::new(CapturingDispatcher::default());
        h.state = h.state.with_dispatcher(capture.clone());
        let courier_id = h.courier();
        let customer_id = Uuid::new_v4();

        let mut first = direct_order(10_000, PaymentMethod::Card);
        first.customer_id = customer_id;
        let order_id = h.delivering_order(courier_id, first);
        assert_eq!(confirm_delivery(&h.state, order_id, courier_id).unwrap().loyalty_points, 100);
        assert!(capture.tier_changes().is_empty());

        let mut second = direct_order(600, PaymentMethod::Card);
        second.customer_id = customer_id;
        second.subtotal = 0;
        second.delivery_fee = 100;
        let order_id = h.delivering_order(courier_id, second);
        assert_eq!(confirm_delivery(&h.state, order_id, courier_id).unwrap().loyalty_points, 1);

        assert_eq!(
            capture.tier_changes(),
            vec![(
                Recipient::Customer(customer_id),
                NotificationEvent::LoyaltyTierChanged {
                    from: LoyaltyTier::Bronze,
                    to: LoyaltyTier::Silver,
                },
            )]
        );
        assert_eq!(h.state.store.loyalty.get(&customer_id).unwrap().points, 101);
    }

    #[test]
    fn award_within_a_tier_sends_no_tier_notification() {
        let mut h = Harness::new(Rules::default());
        let capture = Arc::new(CapturingDispatcher::default());
        h.state = h.state.with_dispatcher(capture.clone());
        let courier_id = h.courier();
        let customer_id = Uuid::new_v4();

        let mut first = direct_order(15_000, PaymentMethod::Card);
        first.customer_id = customer_id;
        let order_id = h.delivering_order(courier_id, first);
        confirm_delivery(&h.state, order_id, courier_id).unwrap();
        capture.sent.lock().unwrap().clear();

        let mut second = direct_order(20_000, PaymentMethod::Card);
        second.customer_id = customer_id;
        let order_id = h.delivering_order(courier_id, second);
        confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert_eq!(h.state.store.loyalty.get(&customer_id).unwrap().points, 350);
        assert!(capture.tier_changes().is_empty());
        let awarded = capture
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| matches!(n.event, NotificationEvent::LoyaltyPointsAwarded { points: 200, .. }))
            .count();
        assert_eq!(awarded, 1);
    }

    #[test]
    fn notification_failures_do_not_abort_settlement() {
        let mut h = Harness::new(Rules::default());
        h.state = h.state.with_dispatcher(Arc::new(FailingDispatcher));
        let courier_id = h.courier();
        let order_id = h.delivering_order(courier_id, merchant_order(Uuid::new_v4(), PaymentMethod::Card));

        let report = confirm_delivery(&h.state, order_id, courier_id).unwrap();

        assert_eq!(report.courier_earnings, 700);
        assert_eq!(h.state.store.order(order_id).unwrap().status, OrderStatus::Delivered);
    }
}
