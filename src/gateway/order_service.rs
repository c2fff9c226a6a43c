use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::order::{Address, OrderConfirmation, OrderDraft, OrderKind, PersonalInfo, Shipping};

// ============================================================================
// Order Service Contract
// ============================================================================

/// What the order service receives. Mirrors the draft minus the photo:
/// images are uploaded out of band and no payment data is ever sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub kind: OrderKind,
    pub personal: PersonalInfo,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub items: Option<OrderItemsRequest>,
    pub shipping: Shipping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemsRequest {
    pub description: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn from_draft(draft: &OrderDraft) -> Result<Self, SubmissionError> {
        let items = match draft.kind {
            OrderKind::Photos => None,
            OrderKind::Garlands => {
                let quantity = draft
                    .items
                    .parsed_quantity()
                    .and_then(|n| u32::try_from(n).ok())
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| {
                        SubmissionError::InvalidRequest(format!("quantity '{}'", draft.items.quantity))
                    })?;
                Some(OrderItemsRequest {
                    description: draft.items.description.trim().to_string(),
                    quantity,
                    notes: draft
                        .items
                        .notes
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string),
                })
            }
        };

        Ok(Self {
            kind: draft.kind,
            personal: draft.personal.clone(),
            address: draft.address.clone(),
            items,
            shipping: draft.shipping.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub next_steps: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Order service unavailable: {0}")]
    Remote(String),

    #[error("Order service did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("Order service rejected the order")]
    Rejected,

    #[error("Order request could not be built: {0}")]
    InvalidRequest(String),
}

impl SubmissionError {
    /// Whether trying again with the same draft can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SubmissionError::InvalidRequest(_))
    }
}

/// External order-creation collaborator
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreateOrderResponse, SubmissionError>;
}

// ============================================================================
// Gateway
// ============================================================================

#[derive(Clone)]
pub struct SubmissionGateway {
    service: Arc<dyn OrderService>,
    timeout: Duration,
}

impl SubmissionGateway {
    pub fn new(service: Arc<dyn OrderService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a complete draft to the order service
    pub async fn submit(&self, draft: &OrderDraft) -> Result<OrderConfirmation, SubmissionError> {
        let request = CreateOrderRequest::from_draft(draft)?;

        tracing::debug!(
            kind = %request.kind,
            method = %request.shipping.method,
            timeout_ms = self.timeout.as_millis(),
            "Sending order to order service"
        );

        let response = match tokio::time::timeout(self.timeout, self.service.create_order(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::error!(timeout_ms = self.timeout.as_millis(), "Order service timed out");
                return Err(SubmissionError::TimedOut(self.timeout));
            }
        };

        if !response.success {
            tracing::warn!(order_id = %response.order_id, "Order service reported failure");
            return Err(SubmissionError::Rejected);
        }

        tracing::info!(order_id = %response.order_id, kind = %request.kind, "Order created");

        Ok(OrderConfirmation {
            order_id: response.order_id,
            next_steps: response.next_steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{PhotoFile, ShippingMethod};

    struct FixedService(Result<CreateOrderResponse, SubmissionError>);

    #[async_trait]
    impl OrderService for FixedService {
        async fn create_order(&self, _request: &CreateOrderRequest) -> Result<CreateOrderResponse, SubmissionError> {
            self.0.clone()
        }
    }

    struct SlowService;

    #[async_trait]
    impl OrderService for SlowService {
        async fn create_order(&self, _request: &CreateOrderRequest) -> Result<CreateOrderResponse, SubmissionError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(SubmissionError::Remote("unreachable".to_string()))
        }
    }

    fn ok_response() -> CreateOrderResponse {
        CreateOrderResponse {
            success: true,
            order_id: "MF-TEST0001".to_string(),
            next_steps: "Wait for our email".to_string(),
        }
    }

    #[test]
    fn test_photo_request_carries_no_items_or_photo() {
        let mut draft = OrderDraft::new(OrderKind::Photos);
        draft.photo.file = Some(PhotoFile::new("a.png", "image/png", 10));

        let request = CreateOrderRequest::from_draft(&draft).unwrap();
        assert!(request.items.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "photos");
        assert_eq!(json["shipping"]["method"], "digital");
        assert!(json.get("items").is_none());
        assert!(json.get("photo").is_none());
        assert_eq!(json["personal"]["firstName"], "");
    }

    #[test]
    fn test_garland_request_coerces_quantity() {
        let mut draft = OrderDraft::new(OrderKind::Garlands);
        draft.items.description = " Bouquet ".to_string();
        draft.items.quantity = "3".to_string();
        draft.items.notes = Some("  ".to_string());

        let request = CreateOrderRequest::from_draft(&draft).unwrap();
        let items = request.items.unwrap();
        assert_eq!(items.quantity, 3);
        assert_eq!(items.description, "Bouquet");
        assert_eq!(items.notes, None);
        assert_eq!(request.shipping.method, ShippingMethod::Courier);
    }

    #[test]
    fn test_bad_quantity_is_not_sent() {
        let mut draft = OrderDraft::new(OrderKind::Garlands);
        draft.items.quantity = "0".to_string();
        let err = CreateOrderRequest::from_draft(&draft).unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidRequest(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_gateway_maps_success() {
        let gateway = SubmissionGateway::new(Arc::new(FixedService(Ok(ok_response()))), Duration::from_secs(1));
        let confirmation = gateway.submit(&OrderDraft::new(OrderKind::Photos)).await.unwrap();
        assert_eq!(confirmation.order_id, "MF-TEST0001");
    }

    #[tokio::test]
    async fn test_gateway_maps_unsuccessful_response() {
        let mut response = ok_response();
        response.success = false;
        let gateway = SubmissionGateway::new(Arc::new(FixedService(Ok(response))), Duration::from_secs(1));

        let err = gateway.submit(&OrderDraft::new(OrderKind::Photos)).await.unwrap_err();
        assert_eq!(err, SubmissionError::Rejected);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_gateway_times_out() {
        let gateway = SubmissionGateway::new(Arc::new(SlowService), Duration::from_millis(20));
        let err = gateway.submit(&OrderDraft::new(OrderKind::Photos)).await.unwrap_err();
        assert_eq!(err, SubmissionError::TimedOut(Duration::from_millis(20)));
    }
}
