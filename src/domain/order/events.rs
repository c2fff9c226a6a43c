use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::Step;
use super::value_objects::{
    Address, ItemDetails, OrderConfirmation, OrderKind, PersonalInfo, PhotoFile, PickupSlot, ShippingMethod,
};

// ============================================================================
// Wizard Events - Facts the wizard has accepted
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WizardEvent {
    KindSelected {
        kind: OrderKind,
        shipping_method: ShippingMethod,
    },
    PersonalUpdated(PersonalInfo),
    AddressUpdated(Address),
    ItemsUpdated(ItemDetails),
    PhotoAttached(PhotoFile),
    PhotoRemoved,
    CollectionMethodChosen(ShippingMethod),
    PickupDateSelected(NaiveDate),
    PickupSlotSelected(PickupSlot),
    StepChanged {
        from: Step,
        to: Step,
    },
    SubmissionStarted,
    SubmissionSucceeded(OrderConfirmation),
    SubmissionFailed {
        reason: String,
    },
}

impl WizardEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            WizardEvent::KindSelected { .. } => "KindSelected",
            WizardEvent::PersonalUpdated(_) => "PersonalUpdated",
            WizardEvent::AddressUpdated(_) => "AddressUpdated",
            WizardEvent::ItemsUpdated(_) => "ItemsUpdated",
            WizardEvent::PhotoAttached(_) => "PhotoAttached",
            WizardEvent::PhotoRemoved => "PhotoRemoved",
            WizardEvent::CollectionMethodChosen(_) => "CollectionMethodChosen",
            WizardEvent::PickupDateSelected(_) => "PickupDateSelected",
            WizardEvent::PickupSlotSelected(_) => "PickupSlotSelected",
            WizardEvent::StepChanged { .. } => "StepChanged",
            WizardEvent::SubmissionStarted => "SubmissionStarted",
            WizardEvent::SubmissionSucceeded(_) => "SubmissionSucceeded",
            WizardEvent::SubmissionFailed { .. } => "SubmissionFailed",
        }
    }
}
