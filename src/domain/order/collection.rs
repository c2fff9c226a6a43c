use chrono::{Days, NaiveDate};

use super::eligibility::PickupArea;
use super::value_objects::{Address, OrderKind, ShippingMethod};

// ============================================================================
// Collection Scheduling
// ============================================================================

/// Number of days offered for a garland pickup, starting tomorrow
pub const PICKUP_WINDOW_DAYS: u64 = 7;

/// Dates a pickup can be booked on: the days following `today`
pub fn pickup_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (1..=PICKUP_WINDOW_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .collect()
}

pub fn is_offered_pickup_date(today: NaiveDate, date: NaiveDate) -> bool {
    date > today && pickup_dates(today).contains(&date)
}

/// "Check my address": the collection method an address implies.
/// Photos are always digital, so there is nothing to detect for them.
pub fn detect_collection_method(
    kind: OrderKind,
    address: &Address,
    area: &PickupArea,
) -> Option<ShippingMethod> {
    match kind {
        OrderKind::Photos => None,
        OrderKind::Garlands => {
            if area.covers(&address.city, &address.postal_code) {
                Some(ShippingMethod::Pickup)
            } else {
                Some(ShippingMethod::Courier)
            }
        }
    }
}
