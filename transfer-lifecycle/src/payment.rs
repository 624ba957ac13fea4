use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider's id (e.g. pi_123).
    pub id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    pub client_secret: Option<String>,
    /// Booking or quote correlation data carried back by webhooks.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub refund_id: String,
    pub amount_cents: i64,
}

/// Payment gateway contract.
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: serde_json::Value,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>>;

    async fn refund(
        &self,
        intent_id: &str,
        amount_cents: i64,
    ) -> Result<RefundOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

/// Thin front over the configured adapter; the place where per-currency or
/// per-country gateway selection would live.
pub struct PaymentOrchestrator {
    adapter: Arc<dyn PaymentAdapter>,
}

impl PaymentOrchestrator {
    pub fn new(adapter: Arc<dyn PaymentAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: serde_json::Value,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.adapter.create_intent(amount_cents, currency, metadata).await
    }

    pub async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.adapter.get_intent(intent_id).await
    }

    pub async fn refund(
        &self,
        intent_id: &str,
        amount_cents: i64,
    ) -> Result<RefundOutcome, Box<dyn std::error::Error + Send + Sync>> {
        self.adapter.refund(intent_id, amount_cents).await
    }
}

/// In-process adapter for tests and local runs.
pub struct MockPaymentAdapter;

#[async_trait]
impl PaymentAdapter for MockPaymentAdapter {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: serde_json::Value,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        if amount_cents <= 0 {
            return Err("payment intent amount must be positive".into());
        }
        Ok(PaymentIntent {
            id: format!("mock_pi_{}", Uuid::new_v4().simple()),
            amount_cents,
            currency: currency.to_string(),
            status: PaymentIntentStatus::RequiresPaymentMethod,
            client_secret: Some(format!("mock_secret_{}", Uuid::new_v4().simple())),
            metadata,
            created_at: Utc::now(),
        })
    }

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        Ok(PaymentIntent {
            id: intent_id.to_string(),
            amount_cents: 0,
            currency: "BRL".to_string(),
            status: PaymentIntentStatus::Succeeded,
            client_secret: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        })
    }

    async fn refund(
        &self,
        intent_id: &str,
        amount_cents: i64,
    ) -> Result<RefundOutcome, Box<dyn std::error::Error + Send + Sync>> {
        // Trigger for exercising gateway-failure paths.
        if intent_id.ends_with("fail") {
            return Err("simulated gateway refusal".into());
        }
        Ok(RefundOutcome {
            refund_id: format!("mock_re_{}", Uuid::new_v4().simple()),
            amount_cents,
        })
    }
}
