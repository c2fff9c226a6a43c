// ============================================================================
// Framing Storefront - Order core
// ============================================================================
//
// - domain:   the order wizard (draft, validation, steps, submission)
// - gateway:  order-service contract, timeout handling, simulated backend
// - session:  signed-in user, auth dialog, token refresh
// - catalog:  featured products and the cart
// - tracking: live status of placed orders
// - metrics:  Prometheus metrics and the /metrics endpoint
// - config:   environment-driven settings
//
// ============================================================================

pub mod catalog;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod metrics;
pub mod session;
pub mod tracking;
