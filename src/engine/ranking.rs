use std::cmp::Ordering;

use uuid::Uuid;

use crate::geo::distance_km;
use crate::models::courier::{Courier, GeoPoint};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub courier_id: Uuid,
    pub distance_km: Option<f64>,
}

/// Eligible couriers ordered nearest first. Unknown distances sort last and
/// ties break on courier id.
pub fn rank_candidates<'a>(
    couriers: impl IntoIterator<Item = &'a Courier>,
    pickup: Option<&GeoPoint>,
    excluded: &[Uuid],
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = couriers
        .into_iter()
        .filter(|courier| courier.can_receive_offers() && !excluded.contains(&courier.id))
        .map(|courier| RankedCandidate {
            courier_id: courier.id,
            distance_km: distance_km(courier.location.as_ref(), pickup),
        })
        .collect();

    ranked.sort_by(compare_candidates);
    ranked
}

fn compare_candidates(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    let by_distance = match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_distance.then_with(|| a.courier_id.cmp(&b.courier_id))
}
