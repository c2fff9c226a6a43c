// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// `aggregate` holds the generic command -> events -> state contract.
// `order` holds the order wizard built on top of it.
//
// ============================================================================

pub mod aggregate;
pub mod order;
