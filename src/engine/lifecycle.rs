//! Order intake and the lifecycle state machine.
//!
//! Delivery itself is not a plain transition: it only happens through
//! [`crate::engine::settlement::confirm_delivery`].

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::engine::couriers::validate_location;
use crate::engine::queue::enqueue_ready_order;
use crate::error::{AppError, ReasonCode};
use crate::models::courier::{Availability, GeoPoint};
use crate::models::notification::{NotificationEvent, Recipient};
use crate::models::order::{
    DeliveryOrder, OrderKind, OrderStatus, OrderTimestamps, PaymentMethod, PaymentStatus,
};
use crate::models::{Money, MAX_AMOUNT};
use crate::state::AppState;
use crate::store::{CourierOp, UnitOfWork};

/// Who is asking for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Actor {
    Customer(Uuid),
    Merchant(Uuid),
    Courier(Uuid),
    Admin,
    System,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub kind: OrderKind,
    pub customer_id: Uuid,
    pub merchant_id: Option<Uuid>,
    pub pickup: Option<GeoPoint>,
    pub dropoff: Option<GeoPoint>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub merchant_prepaid_by_courier: bool,
    pub estimated_total_minutes: Option<u32>,
    pub commission_rate_percent: Option<i64>,
}

pub fn create_order(state: &AppState, request: CreateOrder) -> Result<DeliveryOrder, AppError> {
    if request.subtotal < 0 || request.delivery_fee < 0 {
        return Err(AppError::validation("amounts must be >= 0"));
    }
    if request.subtotal > MAX_AMOUNT || request.delivery_fee > MAX_AMOUNT {
        return Err(AppError::validation(format!("amounts must be <= {MAX_AMOUNT}")));
    }
    match (request.kind, request.merchant_id) {
        (OrderKind::Merchant, None) => {
            return Err(AppError::validation("merchant orders require a merchant_id"));
        }
        (OrderKind::DirectPickup, Some(_)) => {
            return Err(AppError::validation(
                "direct-pickup orders cannot reference a merchant",
            ));
        }
        _ => {}
    }
    let commission_rate_percent = request
        .commission_rate_percent
        .unwrap_or(state.rules.merchant_commission_percent);
    if !(0..=100).contains(&commission_rate_percent) {
        return Err(AppError::validation("commission rate must be within 0..=100"));
    }
    for point in [&request.pickup, &request.dropoff].into_iter().flatten() {
        validate_location(point)?;
    }

    let now = state.store.now();
    let payment_status = match request.payment_method {
        PaymentMethod::Cash => PaymentStatus::Pending,
        PaymentMethod::Card | PaymentMethod::Wallet => PaymentStatus::Paid,
    };

    let order = DeliveryOrder {
        id: Uuid::new_v4(),
        kind: request.kind,
        customer_id: request.customer_id,
        merchant_id: request.merchant_id,
        pickup: request.pickup,
        dropoff: request.dropoff,
        status: OrderStatus::New,
        assigned_courier: None,
        proposal: None,
        excluded_couriers: Vec::new(),
        subtotal: request.subtotal,
        delivery_fee: request.delivery_fee,
        commission_rate_percent,
        commission: 0,
        total: request.subtotal + request.delivery_fee,
        payment_method: request.payment_method,
        payment_status,
        merchant_prepaid_by_courier: request.merchant_prepaid_by_courier,
        estimated_total_minutes: request.estimated_total_minutes,
        timestamps: OrderTimestamps {
            created_at: Some(now),
            ..OrderTimestamps::default()
        },
    };

    state.store.orders.insert(order.id, order.clone());
    info!(order_id = %order.id, kind = ?order.kind, "order created");
    Ok(order)
}

/// Applies a guarded lifecycle transition.
pub fn transition(
    state: &AppState,
    order_id: Uuid,
    actor: Actor,
    target: OrderStatus,
) -> Result<DeliveryOrder, AppError> {
    let (from, committed) = state.store.transact(order_id, |_, uow| {
        let from = uow.order.status;
        check_transition(&uow.order, target)?;
        authorize(actor, &uow.order, target)?;

        apply_transition(uow, target);
        Ok(from)
    })?;
    state.publish(&committed);

    info!(
        order_id = %order_id,
        from = ?from,
        to = ?target,
        actor = ?actor,
        "order transitioned"
    );

    if target == OrderStatus::Ready {
        enqueue_ready_order(state, order_id);
    }

    Ok(committed.order)
}

fn check_transition(order: &DeliveryOrder, target: OrderStatus) -> Result<(), AppError> {
    let from = order.status;
    let allowed = match target {
        OrderStatus::Accepted => from == OrderStatus::New,
        OrderStatus::Preparing => from == OrderStatus::Accepted,
        OrderStatus::Ready => match order.kind {
            OrderKind::Merchant => from == OrderStatus::Preparing,
            OrderKind::DirectPickup => matches!(
                from,
                OrderStatus::New | OrderStatus::Accepted | OrderStatus::Preparing
            ),
        },
        OrderStatus::PickedUp => from == OrderStatus::Ready && order.assigned_courier.is_some(),
        OrderStatus::Delivering => from == OrderStatus::PickedUp,
        OrderStatus::DriverAtCustomer => from == OrderStatus::Delivering,
        OrderStatus::Cancelled => !from.is_terminal(),
        OrderStatus::New | OrderStatus::Delivered => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::conflict(
            ReasonCode::InvalidTransition,
            format!("order {} cannot move from {from:?} to {target:?}", order.id),
        ))
    }
}

fn authorize(actor: Actor, order: &DeliveryOrder, target: OrderStatus) -> Result<(), AppError> {
    let owns_merchant = |id: Uuid| order.merchant_id == Some(id);
    let is_assigned = |id: Uuid| order.assigned_courier == Some(id);

    let permitted = match (target, actor) {
        (_, Actor::Admin | Actor::System) => !matches!(
            target,
            OrderStatus::PickedUp | OrderStatus::Delivering | OrderStatus::DriverAtCustomer
        ),
        (
            OrderStatus::Accepted | OrderStatus::Preparing | OrderStatus::Ready,
            Actor::Merchant(id),
        ) => owns_merchant(id),
        (
            OrderStatus::PickedUp | OrderStatus::Delivering | OrderStatus::DriverAtCustomer,
            Actor::Courier(id),
        ) => is_assigned(id),
        (OrderStatus::Cancelled, Actor::Customer(id)) => {
            order.customer_id == id && order.status == OrderStatus::New
        }
        (OrderStatus::Cancelled, Actor::Merchant(id)) => {
            owns_merchant(id)
                && matches!(
                    order.status,
                    OrderStatus::New | OrderStatus::Accepted | OrderStatus::Preparing
                )
        }
        _ => false,
    };

    if permitted {
        Ok(())
    } else {
        Err(AppError::conflict(
            ReasonCode::NotPermitted,
            format!("{actor:?} may not move order {} to {target:?}", order.id),
        ))
    }
}

fn apply_transition(uow: &mut UnitOfWork, target: OrderStatus) {
    let now = uow.now;
    let order_id = uow.order.id;
    uow.order.set_status(target, now);

    let changed = NotificationEvent::OrderStatusChanged {
        order_id,
        status: target,
    };
    uow.notify(Recipient::Customer(uow.order.customer_id), changed.clone());

    match target {
        OrderStatus::PickedUp => {
            if let Some(merchant_id) = uow.order.merchant_id {
                uow.notify(Recipient::Merchant(merchant_id), changed);
            }
        }
        OrderStatus::Cancelled => {
            let offered_to = uow.order.proposal.take().map(|p| p.courier_id);
            if let Some(courier_id) = uow.order.assigned_courier {
                uow.courier(courier_id, CourierOp::SetAvailability(Availability::Available));
            }
            if let Some(courier_id) = uow.order.assigned_courier.or(offered_to) {
                uow.notify(Recipient::Courier(courier_id), changed.clone());
            }
            if let Some(merchant_id) = uow.order.merchant_id {
                uow.notify(Recipient::Merchant(merchant_id), changed);
            }
        }
        _ => {}
    }
}
