// ============================================================================
// Order Tracking - Live status of a placed order
// ============================================================================
//
// The tracking channel sends an auth frame once, then receives status frames
// as the studio works on the order. Frames arrive as raw JSON text; the
// transport that carries them is outside this crate.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Received,
    #[serde(rename = "In Progress")]
    InProgress,
    Ready,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Stages a normal order passes through, in order
    pub const TIMELINE: [OrderStatus; 5] = [
        OrderStatus::Received,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn title(self) -> &'static str {
        match self {
            OrderStatus::Received => "Order Received",
            OrderStatus::InProgress => "Order In Progress",
            OrderStatus::Ready => "Order Ready",
            OrderStatus::Shipped => "Order Shipped",
            OrderStatus::Delivered => "Order Delivered",
            OrderStatus::Cancelled => "Order Cancelled",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            OrderStatus::Received => "Your order has been received and is being processed.",
            OrderStatus::InProgress => "Your order is currently being processed.",
            OrderStatus::Ready => "Your order is ready for pickup.",
            OrderStatus::Shipped => "Your order has been shipped and is on its way.",
            OrderStatus::Delivered => "Your order has been delivered successfully.",
            OrderStatus::Cancelled => "Your order has been cancelled.",
        }
    }

    /// Position on the timeline; cancelled orders are off it
    pub fn stage(self) -> Option<usize> {
        Self::TIMELINE.iter().position(|s| *s == self)
    }

    /// Completion flag per timeline stage, `None` for cancelled orders
    pub fn progress(self) -> Option<[bool; 5]> {
        let current = self.stage()?;
        let mut done = [false; 5];
        for (i, flag) in done.iter_mut().enumerate() {
            *flag = i <= current;
        }
        Some(done)
    }
}

// ============================================================================
// Wire Frames
// ============================================================================

/// Sent once the channel opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "auth", rename_all = "camelCase")]
pub struct AuthFrame {
    pub user_id: String,
    pub order_id: String,
}

impl AuthFrame {
    pub fn new(user_id: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            order_id: order_id.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFrame {
    pub status: OrderStatus,
}

// ============================================================================
// Tracker
// ============================================================================

/// Follows one order: reads raw frames, publishes the latest status
pub struct OrderTracker {
    order_id: String,
    status: watch::Sender<Option<OrderStatus>>,
}

impl OrderTracker {
    pub fn new(order_id: impl Into<String>) -> Self {
        let (status, _rx) = watch::channel(None);
        Self {
            order_id: order_id.into(),
            status,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn latest(&self) -> Option<OrderStatus> {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<OrderStatus>> {
        self.status.subscribe()
    }

    /// Handle one raw frame. Malformed frames are logged and skipped.
    pub fn accept(&self, raw: &str) -> Option<OrderStatus> {
        match serde_json::from_str::<StatusFrame>(raw) {
            Ok(frame) => {
                tracing::info!(
                    order_id = %self.order_id,
                    status = ?frame.status,
                    "Order status update"
                );
                self.status.send_replace(Some(frame.status));
                Some(frame.status)
            }
            Err(e) => {
                tracing::warn!(order_id = %self.order_id, error = %e, "Ignoring malformed status frame");
                None
            }
        }
    }

    /// Drain frames until the channel closes
    pub async fn run(&self, mut frames: mpsc::Receiver<String>) {
        tracing::debug!(order_id = %self.order_id, "Tracking order");
        while let Some(raw) = frames.recv().await {
            self.accept(&raw);
        }
        tracing::debug!(order_id = %self.order_id, "Tracking channel closed");
    }
}
