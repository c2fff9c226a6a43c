// ============================================================================
// Order Submission Gateway
// ============================================================================
//
// Adapts a validated draft into the order service's request shape, calls the
// external collaborator and maps the answer to an `OrderConfirmation`.
//
// ============================================================================

mod order_service;
mod simulated;

pub use order_service::{
    CreateOrderRequest, CreateOrderResponse, OrderItemsRequest, OrderService, SubmissionError, SubmissionGateway,
};
pub use simulated::{generate_order_id, next_steps_for, SimulatedOrderService, ORDER_ID_PREFIX};
