use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::clock::ManualClock;
use crate::config::Rules;
use crate::engine::acceptance::accept_order;
use crate::engine::couriers::{register_courier, RegisterCourier};
use crate::engine::lifecycle::{create_order, transition, Actor, CreateOrder};
use crate::models::courier::{Availability, CourierStatus, GeoPoint};
use crate::models::order::{OrderKind, OrderStatus, PaymentMethod};
use crate::state::AppState;

pub struct Harness {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    _ready_rx: mpsc::Receiver<Uuid>,
}

impl Harness {
    pub fn new(rules: Rules) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        let (state, ready_rx) = AppState::new(rules, 256, 256);

        Self {
            state: state.with_clock(clock.clone()),
            clock,
            _ready_rx: ready_rx,
        }
    }

    pub fn courier(&self) -> Uuid {
        register_courier(
            &self.state,
            RegisterCourier {
                name: "rider".to_string(),
                location: Some(GeoPoint {
                    lat: 52.521,
                    lng: 13.406,
                }),
                status: Some(CourierStatus::Active),
                availability: Some(Availability::Available),
            },
        )
        .unwrap()
        .id
    }

    /// Creates an order and moves it to ready.
    pub fn ready_order(&self, request: CreateOrder) -> Uuid {
        let order = create_order(&self.state, request).unwrap();
        transition(&self.state, order.id, Actor::Admin, OrderStatus::Ready).unwrap();
        order.id
    }

    /// Creates an order, has `courier_id` accept it and moves it to delivering.
    pub fn delivering_order(&self, courier_id: Uuid, request: CreateOrder) -> Uuid {
        let order_id = self.ready_order(request);
        accept_order(&self.state, order_id, courier_id).unwrap();
        let actor = Actor::Courier(courier_id);
        transition(&self.state, order_id, actor, OrderStatus::PickedUp).unwrap();
        transition(&self.state, order_id, actor, OrderStatus::Delivering).unwrap();
        order_id
    }
}

pub fn merchant_order(merchant_id: Uuid, payment_method: PaymentMethod) -> CreateOrder {
    CreateOrder {
        kind: OrderKind::Merchant,
        customer_id: Uuid::new_v4(),
        merchant_id: Some(merchant_id),
        pickup: Some(GeoPoint {
            lat: 52.52,
            lng: 13.405,
        }),
        dropoff: Some(GeoPoint {
            lat: 52.53,
            lng: 13.42,
        }),
        subtotal: 9_000,
        delivery_fee: 1_000,
        payment_method,
        merchant_prepaid_by_courier: false,
        estimated_total_minutes: None,
        commission_rate_percent: None,
    }
}

pub fn direct_order(total: i64, payment_method: PaymentMethod) -> CreateOrder {
    CreateOrder {
        kind: OrderKind::DirectPickup,
        customer_id: Uuid::new_v4(),
        merchant_id: None,
        pickup: None,
        dropoff: None,
        subtotal: total - 500,
        delivery_fee: 500,
        payment_method,
        merchant_prepaid_by_courier: false,
        estimated_total_minutes: None,
        commission_rate_percent: None,
    }
}
