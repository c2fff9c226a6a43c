use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Draft Value Objects
// ============================================================================

/// What the customer is framing. Drives the wizard's branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Photos,
    Garlands,
}

impl OrderKind {
    /// Seed the kind from an incoming `?kind=` query parameter.
    /// Only `"garlands"` selects garlands; anything else falls back to photos.
    pub fn from_query(param: Option<&str>) -> Self {
        match param {
            Some("garlands") => OrderKind::Garlands,
            _ => OrderKind::Photos,
        }
    }

    /// Collection method a freshly selected kind starts with
    pub fn default_shipping_method(self) -> ShippingMethod {
        match self {
            OrderKind::Photos => ShippingMethod::Digital,
            OrderKind::Garlands => ShippingMethod::Courier,
        }
    }

    /// Whether `method` is a valid collection method for this kind
    pub fn allows(self, method: ShippingMethod) -> bool {
        match self {
            OrderKind::Photos => method == ShippingMethod::Digital,
            OrderKind::Garlands => matches!(method, ShippingMethod::Pickup | ShippingMethod::Courier),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Photos => "photos",
            OrderKind::Garlands => "garlands",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderKind::Photos => "Photos / Prints",
            OrderKind::Garlands => "Garlands / Flowers",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// What a garlands customer is sending in.
///
/// `quantity` keeps the raw form input; it is coerced to an integer during
/// validation and when the order request is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub description: String,
    pub quantity: String,
    pub notes: Option<String>,
}

impl Default for ItemDetails {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: "1".to_string(),
            notes: None,
        }
    }
}

impl ItemDetails {
    /// Integer coercion of the quantity input. `None` when it is not a whole number.
    /// A blank input coerces to 0.
    pub fn parsed_quantity(&self) -> Option<i64> {
        let raw = self.quantity.trim();
        if raw.is_empty() {
            return Some(0);
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Some(n);
        }
        // "3.0" coerces, "2.5" does not
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
            _ => None,
        }
    }
}

/// Metadata of an image chosen for a photos order. The bytes never pass
/// through the order core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    pub file: Option<PhotoFile>,
    /// Preview URL allocated for `file`, revoked when the file goes away
    #[serde(skip)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    Pickup,
    Courier,
    Digital,
}

impl ShippingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ShippingMethod::Pickup => "pickup",
            ShippingMethod::Courier => "courier",
            ShippingMethod::Digital => "digital",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-hour collection windows offered for garland pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupSlot {
    #[serde(rename = "8-10 AM")]
    EightToTen,
    #[serde(rename = "10-12 PM")]
    TenToNoon,
    #[serde(rename = "12-2 PM")]
    NoonToTwo,
    #[serde(rename = "2-4 PM")]
    TwoToFour,
    #[serde(rename = "4-6 PM")]
    FourToSix,
}

impl PickupSlot {
    pub const ALL: [PickupSlot; 5] = [
        PickupSlot::EightToTen,
        PickupSlot::TenToNoon,
        PickupSlot::NoonToTwo,
        PickupSlot::TwoToFour,
        PickupSlot::FourToSix,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PickupSlot::EightToTen => "8-10 AM",
            PickupSlot::TenToNoon => "10-12 PM",
            PickupSlot::NoonToTwo => "12-2 PM",
            PickupSlot::TwoToFour => "2-4 PM",
            PickupSlot::FourToSix => "4-6 PM",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.label() == label)
    }
}

impl fmt::Display for PickupSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipping {
    pub method: ShippingMethod,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_slot: Option<PickupSlot>,
}

impl Shipping {
    pub fn for_kind(kind: OrderKind) -> Self {
        Self {
            method: kind.default_shipping_method(),
            pickup_date: None,
            pickup_slot: None,
        }
    }
}

/// The in-progress, unsubmitted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub kind: OrderKind,
    pub personal: PersonalInfo,
    pub address: Address,
    pub items: ItemDetails,
    pub photo: PhotoAttachment,
    pub shipping: Shipping,
}

impl OrderDraft {
    pub fn new(kind: OrderKind) -> Self {
        Self {
            kind,
            personal: PersonalInfo::default(),
            address: Address::default(),
            items: ItemDetails::default(),
            photo: PhotoAttachment::default(),
            shipping: Shipping::for_kind(kind),
        }
    }

    /// Change the kind. A real change resets the collection method to the
    /// new kind's default so no stale pickup selection survives.
    /// Returns whether anything changed.
    pub fn set_kind(&mut self, kind: OrderKind) -> bool {
        if self.kind == kind {
            return false;
        }
        self.kind = kind;
        self.shipping.method = kind.default_shipping_method();
        true
    }
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self::new(OrderKind::Photos)
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub next_steps: String,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_query() {
        assert_eq!(OrderKind::from_query(Some("garlands")), OrderKind::Garlands);
        assert_eq!(OrderKind::from_query(Some("photos")), OrderKind::Photos);
        assert_eq!(OrderKind::from_query(Some("GARLANDS")), OrderKind::Photos);
        assert_eq!(OrderKind::from_query(None), OrderKind::Photos);
    }

    #[test]
    fn test_new_draft_uses_kind_default_method() {
        assert_eq!(OrderDraft::new(OrderKind::Photos).shipping.method, ShippingMethod::Digital);
        assert_eq!(OrderDraft::new(OrderKind::Garlands).shipping.method, ShippingMethod::Courier);
    }

    #[test]
    fn test_set_kind_resets_method() {
        let mut draft = OrderDraft::new(OrderKind::Garlands);
        draft.shipping.method = ShippingMethod::Pickup;

        assert!(draft.set_kind(OrderKind::Photos));
        assert_eq!(draft.shipping.method, ShippingMethod::Digital);

        assert!(draft.set_kind(OrderKind::Garlands));
        assert_eq!(draft.shipping.method, ShippingMethod::Courier);
    }

    #[test]
    fn test_set_same_kind_is_not_a_change() {
        let mut draft = OrderDraft::new(OrderKind::Garlands);
        draft.shipping.method = ShippingMethod::Pickup;

        assert!(!draft.set_kind(OrderKind::Garlands));
        assert_eq!(draft.shipping.method, ShippingMethod::Pickup);
    }

    #[test]
    fn test_quantity_coercion() {
        let mut items = ItemDetails::default();
        assert_eq!(items.parsed_quantity(), Some(1));

        items.quantity = " 4 ".to_string();
        assert_eq!(items.parsed_quantity(), Some(4));

        items.quantity = "3.0".to_string();
        assert_eq!(items.parsed_quantity(), Some(3));

        items.quantity = "2.5".to_string();
        assert_eq!(items.parsed_quantity(), None);

        items.quantity = "many".to_string();
        assert_eq!(items.parsed_quantity(), None);

        items.quantity = "  ".to_string();
        assert_eq!(items.parsed_quantity(), Some(0));
    }

    #[test]
    fn test_pickup_slot_labels() {
        for slot in PickupSlot::ALL {
            assert_eq!(PickupSlot::from_label(slot.label()), Some(slot));
            let json = serde_json::to_string(&slot).unwrap();
            assert_eq!(json, format!("\"{}\"", slot.label()));
        }
        assert_eq!(PickupSlot::from_label("6-8 PM"), None);
    }

    #[test]
    fn test_kind_allows_methods() {
        assert!(OrderKind::Photos.allows(ShippingMethod::Digital));
        assert!(!OrderKind::Photos.allows(ShippingMethod::Pickup));
        assert!(OrderKind::Garlands.allows(ShippingMethod::Pickup));
        assert!(OrderKind::Garlands.allows(ShippingMethod::Courier));
        assert!(!OrderKind::Garlands.allows(ShippingMethod::Digital));
    }
}
