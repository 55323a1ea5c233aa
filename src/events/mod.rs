use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// Events emitted after durable state changes commit.
///
/// Delivery is best-effort: a full or closed channel never affects the
/// outcome of the request that produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SalePosted {
        sale_id: i32,
        store_id: i32,
        total: Decimal,
        source: String,
        posted_at: DateTime<Utc>,
    },
    SaleReversed {
        sale_id: i32,
        store_id: i32,
        total: Decimal,
    },
    InvoiceIssued {
        sale_id: i32,
        serie: String,
        correlative: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events off the bus and logs them. Downstream consumers
/// (webhooks, reporting projections) hang off this loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match event {
            Event::SalePosted {
                sale_id,
                store_id,
                total,
                source,
                ..
            } => {
                info!(sale_id, store_id, total = %total, source = %source, "sale posted");
            }
            Event::SaleReversed {
                sale_id,
                store_id,
                total,
            } => {
                info!(sale_id, store_id, total = %total, "sale reversed");
            }
            Event::InvoiceIssued {
                sale_id,
                serie,
                correlative,
            } => {
                info!(sale_id, serie = %serie, correlative = %correlative, "invoice issued");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender
            .send(Event::SaleReversed {
                sale_id: 1,
                store_id: 1,
                total: dec!(10),
            })
            .await;
        assert!(result.is_err());
    }
}
