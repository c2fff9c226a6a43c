// ============================================================================
// Order Domain - The storefront order wizard
// ============================================================================
//
// This module contains ALL order-wizard code:
// - Value objects (OrderDraft, OrderKind, ShippingMethod, PickupSlot)
// - Validation rules and pickup eligibility
// - Collection scheduling and the review projection
// - Events and commands (WizardEvent, WizardCommand)
// - Errors (WizardError enum)
// - Aggregate (OrderWizard with the step state machine)
// - Command handler (WizardController, WizardHandle)
//
// ============================================================================

pub mod value_objects;
pub mod validation;
pub mod eligibility;
pub mod collection;
pub mod review;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod preview;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use validation::{
    fields, is_valid_email, photo_file_problems, validate_draft, validate_sections, Section, ValidationErrors,
    MAX_PHOTO_BYTES,
};
pub use eligibility::*;
pub use collection::*;
pub use review::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use preview::*;
pub use command_handler::*;
