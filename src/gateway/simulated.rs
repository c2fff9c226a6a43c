use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::order_service::{CreateOrderRequest, CreateOrderResponse, OrderService, SubmissionError};
use crate::domain::order::{OrderKind, ShippingMethod};

pub const ORDER_ID_PREFIX: &str = "MF-";

const ORDER_ID_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_ID_SUFFIX_LEN: usize = 8;

/// Opaque order id: fixed prefix plus 8 random uppercase alphanumerics
pub fn generate_order_id() -> String {
    // Low 62 bits of a v4 uuid are random, more than 36^8 needs
    let mut entropy = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(ORDER_ID_PREFIX.len() + ORDER_ID_SUFFIX_LEN);
    id.push_str(ORDER_ID_PREFIX);
    for _ in 0..ORDER_ID_SUFFIX_LEN {
        id.push(ORDER_ID_ALPHABET[(entropy % 36) as usize] as char);
        entropy /= 36;
    }
    id
}

/// What the customer should do once the order exists
pub fn next_steps_for(request: &CreateOrderRequest) -> &'static str {
    match (request.kind, request.shipping.method) {
        (OrderKind::Photos, _) => {
            "Upload your photos from the link in your email. We'll begin layout once we receive them."
        }
        (OrderKind::Garlands, ShippingMethod::Pickup) => {
            "We'll arrive at your selected time slot to collect your garland/flowers."
        }
        (OrderKind::Garlands, _) => "Please ship your garland/flowers to our studio with tracked delivery.",
    }
}

/// Stand-in order service: waits, then accepts every order
#[derive(Debug)]
pub struct SimulatedOrderService {
    latency: Duration,
    orders_created: AtomicU64,
}

impl Default for SimulatedOrderService {
    fn default() -> Self {
        Self::new(Duration::from_millis(800))
    }
}

impl SimulatedOrderService {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            orders_created: AtomicU64::new(0),
        }
    }

    pub fn orders_created(&self) -> u64 {
        self.orders_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderService for SimulatedOrderService {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreateOrderResponse, SubmissionError> {
        tokio::time::sleep(self.latency).await;

        let order_id = generate_order_id();
        self.orders_created.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(order_id = %order_id, kind = %request.kind, "Simulated order accepted");

        Ok(CreateOrderResponse {
            success: true,
            order_id,
            next_steps: next_steps_for(request).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderDraft;
    use regex::Regex;

    fn request(kind: OrderKind, method: ShippingMethod) -> CreateOrderRequest {
        let mut draft = OrderDraft::new(kind);
        draft.shipping.method = method;
        draft.items.quantity = "1".to_string();
        CreateOrderRequest::from_draft(&draft).unwrap()
    }

    #[test]
    fn test_order_id_format() {
        let pattern = Regex::new(r"^MF-[A-Z0-9]{8}$").unwrap();
        for _ in 0..100 {
            let id = generate_order_id();
            assert!(pattern.is_match(&id), "bad order id {id}");
        }
        assert_ne!(generate_order_id(), generate_order_id());
    }

    #[test]
    fn test_next_steps_rule() {
        assert!(next_steps_for(&request(OrderKind::Photos, ShippingMethod::Digital)).contains("Upload your photos"));
        assert!(next_steps_for(&request(OrderKind::Garlands, ShippingMethod::Pickup)).contains("time slot"));
        assert!(next_steps_for(&request(OrderKind::Garlands, ShippingMethod::Courier)).contains("tracked delivery"));
    }

    #[tokio::test]
    async fn test_simulated_service_accepts() {
        let service = SimulatedOrderService::new(Duration::from_millis(1));
        let response = service
            .create_order(&request(OrderKind::Garlands, ShippingMethod::Courier))
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.order_id.starts_with(ORDER_ID_PREFIX));
        assert_eq!(service.orders_created(), 1);
    }
}
