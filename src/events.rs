use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{rental_order::RentalOrderStatus, vehicle::VehicleStatus};

/// Notifications emitted by the workflow for external delivery (dashboard
/// push, etc.). Delivery is fire-and-forget: a failed or dropped send is
/// logged and never fails the originating transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    RentalOrderCreated(Uuid),
    RentalOrderStatusChanged {
        order_id: Uuid,
        old_status: RentalOrderStatus,
        new_status: RentalOrderStatus,
    },
    RentalOrderCancelled {
        order_id: Uuid,
        reason: Option<String>,
    },
    VehicleStatusChanged {
        vehicle_id: Uuid,
        old_status: VehicleStatus,
        new_status: VehicleStatus,
    },
    InvoiceCreated {
        invoice_id: Uuid,
        rental_order_id: Uuid,
        total_amount: Decimal,
    },
    PaymentRecorded {
        payment_id: Uuid,
        invoice_id: Uuid,
        amount: Decimal,
        recorded_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Send an event without letting a sink failure reach the caller.
    pub async fn emit(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "failed to emit event");
        }
    }
}

/// Create a connected sender/receiver pair with the default channel depth.
pub fn channel() -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(1024);
    (EventSender::new(tx), rx)
}

/// Drains the event channel and hands each event to the notification sink.
/// Runs until every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::RentalOrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(
                %order_id, %old_status, %new_status,
                "notify: rental order status changed"
            ),
            Event::VehicleStatusChanged {
                vehicle_id,
                old_status,
                new_status,
            } => info!(
                %vehicle_id, %old_status, %new_status,
                "notify: vehicle status changed"
            ),
            other => info!(event = ?other, "notify"),
        }
    }
    warn!("event channel closed, notification processor exiting");
}
