use chrono::NaiveDate;

use super::value_objects::{Address, ItemDetails, OrderKind, PersonalInfo, PhotoFile, PickupSlot, ShippingMethod};

// ============================================================================
// Wizard Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum WizardCommand {
    SelectKind(OrderKind),
    UpdatePersonal(PersonalInfo),
    UpdateAddress(Address),
    UpdateItems(ItemDetails),
    AttachPhoto(PhotoFile),
    RemovePhoto,
    ChooseCollectionMethod(ShippingMethod),
    /// "Check my address"
    DetectCollectionMethod,
    SetPickupDate(NaiveDate),
    SetPickupSlot(PickupSlot),
    Next,
    Back,
}

impl WizardCommand {
    /// Whether the command edits the draft (as opposed to navigating)
    pub fn mutates_draft(&self) -> bool {
        !matches!(self, WizardCommand::Next | WizardCommand::Back)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardCommand::SelectKind(_) => "SelectKind",
            WizardCommand::UpdatePersonal(_) => "UpdatePersonal",
            WizardCommand::UpdateAddress(_) => "UpdateAddress",
            WizardCommand::UpdateItems(_) => "UpdateItems",
            WizardCommand::AttachPhoto(_) => "AttachPhoto",
            WizardCommand::RemovePhoto => "RemovePhoto",
            WizardCommand::ChooseCollectionMethod(_) => "ChooseCollectionMethod",
            WizardCommand::DetectCollectionMethod => "DetectCollectionMethod",
            WizardCommand::SetPickupDate(_) => "SetPickupDate",
            WizardCommand::SetPickupSlot(_) => "SetPickupSlot",
            WizardCommand::Next => "Next",
            WizardCommand::Back => "Back",
        }
    }
}
