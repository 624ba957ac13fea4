use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outbound customer/operator emails. Dispatch is fire-and-forget; a lost
/// notification never blocks a lifecycle transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    BookingConfirmed,
    PaymentLink,
    QuoteRequestReceived,
    QuoteResponse,
    RefundProcessed,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        template: NotificationTemplate,
        data: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Logs instead of sending; the default wiring until a mail provider is
/// configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        recipient: &str,
        template: NotificationTemplate,
        data: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(recipient, ?template, %data, "notification dispatched");
        Ok(())
    }
}
