//! Backing store and the order-scoped unit of work.
//!
//! Every table is a [`DashMap`]. The exclusive hold on an order is the write
//! guard returned by `orders.get_mut`; a [`UnitOfWork`] stages changes against
//! a copy of the order and only touches shared state in [`Store::transact`]'s
//! commit step. While the order guard is held, commit takes at most one other
//! guard at a time: each courier in turn, then each loyalty account.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::courier::{Availability, Courier};
use crate::models::ledger::{LedgerEntry, LedgerEntryKind, Party};
use crate::models::loyalty::{LoyaltyAccount, LoyaltyTier};
use crate::models::notification::{Notification, NotificationEvent, Recipient};
use crate::models::order::DeliveryOrder;
use crate::models::remittance::CashRemittance;
use crate::models::Money;

pub struct Store {
    pub couriers: DashMap<Uuid, Courier>,
    pub orders: DashMap<Uuid, DeliveryOrder>,
    pub ledger: DashMap<Uuid, LedgerEntry>,
    pub loyalty: DashMap<Uuid, LoyaltyAccount>,
    pub remittances: DashMap<Uuid, CashRemittance>,
    /// Order id to the pending or completed remittance that claims it.
    pub remittance_claims: DashMap<Uuid, Uuid>,
    clock: Arc<dyn Clock>,
    ledger_seq: AtomicU64,
}

/// Change to a courier record, applied under the courier's guard at commit.
#[derive(Debug, Clone)]
pub enum CourierOp {
    Credit {
        kind: LedgerEntryKind,
        amount: Money,
        metadata: Value,
    },
    /// Floored at zero; the ledger records what was actually taken.
    Deduct {
        kind: LedgerEntryKind,
        amount: Money,
        metadata: Value,
    },
    RecordDelivery {
        distance_km: f64,
        cash_collected: Money,
    },
    /// Awards `bonus` when today's delivery count equals `target`.
    DailyGoal {
        target: usize,
        bonus: Money,
    },
    SetAvailability(Availability),
}

#[derive(Debug, Clone)]
struct LoyaltyAward {
    customer_id: Uuid,
    points: u64,
}

pub struct UnitOfWork {
    pub order: DeliveryOrder,
    pub now: DateTime<Utc>,
    courier_ops: Vec<(Uuid, CourierOp)>,
    entries: Vec<LedgerEntry>,
    awards: Vec<LoyaltyAward>,
    notifications: Vec<Notification>,
}

impl UnitOfWork {
    fn new(order: DeliveryOrder, now: DateTime<Utc>) -> Self {
        Self {
            order,
            now,
            courier_ops: Vec::new(),
            entries: Vec::new(),
            awards: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn courier(&mut self, courier_id: Uuid, op: CourierOp) {
        self.courier_ops.push((courier_id, op));
    }

    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    pub fn award_points(&mut self, customer_id: Uuid, points: u64) {
        if points > 0 {
            self.awards.push(LoyaltyAward {
                customer_id,
                points,
            });
        }
    }

    pub fn notify(&mut self, recipient: Recipient, event: NotificationEvent) {
        self.notifications.push(recipient.notify(event, self.now));
    }
}

/// What a unit of work wrote once it committed.
#[derive(Debug, Clone)]
pub struct Committed {
    pub order: DeliveryOrder,
    pub entries: Vec<LedgerEntry>,
    pub notifications: Vec<Notification>,
}

impl Store {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            couriers: DashMap::new(),
            orders: DashMap::new(),
            ledger: DashMap::new(),
            loyalty: DashMap::new(),
            remittances: DashMap::new(),
            remittance_claims: DashMap::new(),
            clock,
            ledger_seq: AtomicU64::new(0),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn order(&self, order_id: Uuid) -> Result<DeliveryOrder, AppError> {
        self.orders
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))
    }

    pub fn courier(&self, courier_id: Uuid) -> Result<Courier, AppError> {
        self.couriers
            .get(&courier_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("courier {courier_id} not found")))
    }

    /// Ledger entries matching `filter`, in append order.
    pub fn ledger_entries(&self, filter: impl Fn(&LedgerEntry) -> bool) -> Vec<LedgerEntry> {
        let mut entries: Vec<LedgerEntry> = self
            .ledger
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
    }

    /// Sum of every signed ledger amount involving the courier.
    pub fn courier_ledger_balance(&self, courier_id: Uuid) -> Money {
        let party = Party::Courier(courier_id);
        self.ledger
            .iter()
            .filter(|entry| entry.involves(party))
            .map(|entry| entry.amount)
            .sum()
    }

    fn count_deliveries_on(&self, courier_id: Uuid, day: chrono::NaiveDate) -> usize {
        let party = Party::Courier(courier_id);
        self.ledger
            .iter()
            .filter(|entry| {
                entry.kind == LedgerEntryKind::CourierEarning
                    && entry.destination == party
                    && entry.created_at.date_naive() == day
            })
            .count()
    }

    fn append_ledger(&self, mut entry: LedgerEntry) -> LedgerEntry {
        entry.seq = self.ledger_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.ledger.insert(entry.id, entry.clone());
        entry
    }

    /// Runs `work` while holding the order's exclusive guard and commits its
    /// staged changes only if it returns `Ok`.
    ///
    /// `work` may read couriers, ledger and loyalty tables but must not touch
    /// `orders`: the guard is held for its whole duration.
    pub fn transact<T>(
        &self,
        order_id: Uuid,
        work: impl FnOnce(&Store, &mut UnitOfWork) -> Result<T, AppError>,
    ) -> Result<(T, Committed), AppError> {
        let mut guard = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

        let mut uow = UnitOfWork::new(guard.value().clone(), self.now());
        let value = work(self, &mut uow)?;

        let committed = self.commit(uow)?;
        *guard = committed.order.clone();

        Ok((value, committed))
    }

    fn commit(&self, uow: UnitOfWork) -> Result<Committed, AppError> {
        let UnitOfWork {
            order,
            now,
            courier_ops,
            entries,
            awards,
            mut notifications,
        } = uow;

        let mut ops_by_courier: BTreeMap<Uuid, Vec<CourierOp>> = BTreeMap::new();
        for (courier_id, op) in courier_ops {
            ops_by_courier.entry(courier_id).or_default().push(op);
        }
        // Couriers are never removed, so a courier present here is still
        // present when its guard is taken below.
        if let Some(missing) = ops_by_courier
            .keys()
            .find(|courier_id| !self.couriers.contains_key(*courier_id))
        {
            return Err(AppError::NotFound(format!("courier {missing} not found")));
        }

        // Nothing below can fail.
        let mut committed_entries: Vec<LedgerEntry> = entries
            .into_iter()
            .map(|entry| self.append_ledger(entry))
            .collect();

        // One courier guard at a time: two guards on the same map can share a
        // shard. Each courier's entries are in the ledger before its guard is
        // released.
        for (courier_id, ops) in ops_by_courier {
            let Some(mut courier) = self.couriers.get_mut(&courier_id) else {
                continue;
            };
            let mut pending = Vec::new();
            for op in ops {
                self.apply_courier_op(
                    courier.value_mut(),
                    op,
                    order.id,
                    now,
                    &mut pending,
                    &mut notifications,
                );
            }
            courier.updated_at = now;
            committed_entries.extend(pending.into_iter().map(|entry| self.append_ledger(entry)));
        }

        let mut pending = Vec::new();
        for award in awards {
            let mut account = self
                .loyalty
                .entry(award.customer_id)
                .or_insert_with(|| LoyaltyAccount::new(award.customer_id, now));
            let before: LoyaltyTier = account.tier();
            account.points += award.points;
            account.updated_at = now;
            let after = account.tier();

            let recipient = Recipient::Customer(award.customer_id);
            pending.push(LedgerEntry::completed(
                Some(order.id),
                LedgerEntryKind::LoyaltyPoints,
                award.points as Money,
                Party::Platform,
                Party::Customer(award.customer_id),
                json!({ "total_points": account.points, "tier": after }),
                now,
            ));
            notifications.push(recipient.notify(
                NotificationEvent::LoyaltyPointsAwarded {
                    order_id: order.id,
                    points: award.points,
                    total_points: account.points,
                },
                now,
            ));
            if before != after {
                notifications.push(
                    recipient.notify(NotificationEvent::LoyaltyTierChanged { from: before, to: after }, now),
                );
            }
        }

        committed_entries.extend(pending.into_iter().map(|entry| self.append_ledger(entry)));

        Ok(Committed {
            order,
            entries: committed_entries,
            notifications,
        })
    }

    fn apply_courier_op(
        &self,
        courier: &mut Courier,
        op: CourierOp,
        order_id: Uuid,
        now: DateTime<Utc>,
        pending: &mut Vec<LedgerEntry>,
        notifications: &mut Vec<Notification>,
    ) {
        let courier_id = courier.id;
        let party = Party::Courier(courier_id);

        match op {
            CourierOp::Credit {
                kind,
                amount,
                metadata,
            } => {
                courier.credit(amount);
                pending.push(LedgerEntry::completed(
                    Some(order_id),
                    kind,
                    amount,
                    Party::Platform,
                    party,
                    metadata,
                    now,
                ));
            }
            CourierOp::Deduct {
                kind,
                amount,
                metadata,
            } => {
                let taken = courier.deduct(amount);
                let mut metadata = metadata;
                if let Value::Object(map) = &mut metadata {
                    map.insert("requested_amount".to_string(), json!(amount));
                }
                pending.push(LedgerEntry::completed(
                    Some(order_id),
                    kind,
                    -taken,
                    party,
                    Party::Platform,
                    metadata,
                    now,
                ));
            }
            CourierOp::RecordDelivery {
                distance_km,
                cash_collected,
            } => {
                courier.delivery_count += 1;
                courier.total_distance_km += distance_km;
                courier.cash_on_hand += cash_collected;
            }
            CourierOp::DailyGoal { target, bonus } => {
                let today = now.date_naive();
                let staged = pending
                    .iter()
                    .filter(|e| e.kind == LedgerEntryKind::CourierEarning && e.destination == party)
                    .count();
                let deliveries = self.count_deliveries_on(courier_id, today) + staged;

                if deliveries == target {
                    courier.credit(bonus);
                    pending.push(LedgerEntry::completed(
                        Some(order_id),
                        LedgerEntryKind::DailyGoalBonus,
                        bonus,
                        Party::Platform,
                        party,
                        json!({ "deliveries": deliveries, "day": today.to_string() }),
                        now,
                    ));
                    notifications.push(Recipient::Courier(courier_id).notify(
                        NotificationEvent::DailyGoalReached { deliveries, bonus },
                        now,
                    ));
                }
            }
            CourierOp::SetAvailability(availability) => {
                courier.availability = availability;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::{CourierOp, Store};
    use crate::clock::ManualClock;
    use crate::error::AppError;
    use crate::models::courier::Courier;
    use crate::models::ledger::LedgerEntryKind;
    use crate::models::order::{
        DeliveryOrder, OrderKind, OrderStatus, OrderTimestamps, PaymentMethod, PaymentStatus,
    };

    fn store() -> Store {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Store::new(Arc::new(ManualClock::new(start)))
    }

    fn order() -> DeliveryOrder {
        DeliveryOrder {
            id: Uuid::new_v4(),
            kind: OrderKind::DirectPickup,
            customer_id: Uuid::new_v4(),
            merchant_id: None,
            pickup: None,
            dropoff: None,
            status: OrderStatus::Ready,
            assigned_courier: None,
            proposal: None,
            excluded_couriers: Vec::new(),
            subtotal: 1_000,
            delivery_fee: 100,
            commission_rate_percent: 15,
            commission: 0,
            total: 1_100,
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Paid,
            merchant_prepaid_by_courier: false,
            estimated_total_minutes: None,
            timestamps: OrderTimestamps::default(),
        }
    }

    #[test]
    fn failed_work_leaves_no_trace() {
        let store = store();
        let order = order();
        let order_id = order.id;
        store.orders.insert(order_id, order);

        let result: Result<((), _), AppError> = store.transact(order_id, |_, uow| {
            uow.order.status = OrderStatus::Delivered;
            uow.award_points(uow.order.customer_id, 10);
            Err(AppError::Internal("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.order(order_id).unwrap().status, OrderStatus::Ready);
        assert!(store.ledger.is_empty());
        assert!(store.loyalty.is_empty());
    }

    #[test]
    fn unknown_courier_aborts_commit() {
        let store = store();
        let order = order();
        let order_id = order.id;
        store.orders.insert(order_id, order);

        let result = store.transact(order_id, |_, uow| {
            uow.order.status = OrderStatus::Delivered;
            uow.courier(
                Uuid::new_v4(),
                CourierOp::Credit {
                    kind: LedgerEntryKind::CourierEarning,
                    amount: 700,
                    metadata: json!({}),
                },
            );
            Ok(())
        });

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.order(order_id).unwrap().status, OrderStatus::Ready);
        assert!(store.ledger.is_empty());
    }

    #[test]
    fn work_touching_many_couriers_commits() {
        let store = store();
        let order = order();
        let order_id = order.id;
        store.orders.insert(order_id, order);
        let courier_ids: Vec<Uuid> = (0..64)
            .map(|i| {
                let courier = Courier::new(format!("rider-{i}"), None, store.now());
                let id = courier.id;
                store.couriers.insert(id, courier);
                id
            })
            .collect();

        let (_, committed) = store
            .transact(order_id, |_, uow| {
                for courier_id in &courier_ids {
                    uow.courier(
                        *courier_id,
                        CourierOp::Credit {
                            kind: LedgerEntryKind::CourierEarning,
                            amount: 100,
                            metadata: json!({}),
                        },
                    );
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(committed.entries.len(), courier_ids.len());
        for courier_id in courier_ids {
            assert_eq!(store.courier(courier_id).unwrap().available_balance, 100);
            assert_eq!(store.courier_ledger_balance(courier_id), 100);
        }
    }

    #[test]
    fn ledger_sum_tracks_courier_balance() {
        let store = store();
        let order = order();
        let order_id = order.id;
        store.orders.insert(order_id, order);
        let courier = Courier::new("Cleo".to_string(), None, store.now());
        let courier_id = courier.id;
        store.couriers.insert(courier_id, courier);

        store
            .transact(order_id, |_, uow| {
                uow.courier(
                    courier_id,
                    CourierOp::Credit {
                        kind: LedgerEntryKind::CourierEarning,
                        amount: 300,
                        metadata: json!({}),
                    },
                );
                uow.courier(
                    courier_id,
                    CourierOp::Deduct {
                        kind: LedgerEntryKind::CancellationPenalty,
                        amount: 500,
                        metadata: json!({}),
                    },
                );
                Ok(())
            })
            .unwrap();

        let courier = store.courier(courier_id).unwrap();
        assert_eq!(courier.available_balance, 0);
        assert_eq!(store.courier_ledger_balance(courier_id), 0);

        let entries = store.ledger_entries(|_| true);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].amount, -300);
        assert_eq!(entries[1].metadata["requested_amount"], 500);
    }
}
