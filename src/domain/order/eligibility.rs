// ============================================================================
// Pickup Eligibility
// ============================================================================
//
// Local approximation of the pickup area: an address qualifies when its city
// is on the allow-list OR its postal code starts with a served prefix.
// Either heuristic alone is sufficient. No geocoding.
//
// ============================================================================

pub const PICKUP_CITIES: [&str; 4] = ["New York", "Brooklyn", "Jersey City", "Hoboken"];
pub const PICKUP_POSTAL_PREFIXES: [&str; 4] = ["100", "101", "112", "073"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupArea {
    cities: Vec<String>,
    postal_prefixes: Vec<String>,
}

impl Default for PickupArea {
    fn default() -> Self {
        Self::new(PICKUP_CITIES, PICKUP_POSTAL_PREFIXES)
    }
}

impl PickupArea {
    pub fn new<C, P>(cities: C, postal_prefixes: P) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            cities: cities.into_iter().map(Into::into).collect(),
            postal_prefixes: postal_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn covers(&self, city: &str, postal_code: &str) -> bool {
        let city = city.trim();
        let eligible_city = self.cities.iter().any(|c| c == city);
        let eligible_postal = self
            .postal_prefixes
            .iter()
            .any(|prefix| postal_code.starts_with(prefix.as_str()));
        eligible_city || eligible_postal
    }
}

/// Whether an address qualifies for in-person pickup under the default area
pub fn is_pickup_eligible(city: &str, postal_code: &str) -> bool {
    PickupArea::default().covers(city, postal_code)
}
