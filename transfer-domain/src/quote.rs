use crate::tariff::DriverLanguage;
use crate::trip::TripRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of a customer-submitted quote request. Convertido,
/// Recusado and Cancelado are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pendente,
    EmAnalise,
    Cotado,
    Aceito,
    Recusado,
    Cancelado,
    Convertido,
}

impl QuoteStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuoteStatus::Convertido | QuoteStatus::Recusado | QuoteStatus::Cancelado
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pendente => "pendente",
            QuoteStatus::EmAnalise => "em_analise",
            QuoteStatus::Cotado => "cotado",
            QuoteStatus::Aceito => "aceito",
            QuoteStatus::Recusado => "recusado",
            QuoteStatus::Cancelado => "cancelado",
            QuoteStatus::Convertido => "convertido",
        }
    }
}

/// A pricing request that falls outside the automatic tariff (typically
/// beyond the vehicle's operational radius) and is priced by an operator.
/// Never deleted once quoted; at most one booking is ever produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: Uuid,
    pub quote_number: String,
    pub status: QuoteStatus,

    pub trip: TripRequest,
    pub vehicle_type_id: Uuid,
    pub vehicle_name: String,
    pub driver_language: DriverLanguage,

    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,

    pub admin_quote_price_cents: Option<i64>,
    pub admin_notes: Option<String>,
    pub quoted_at: Option<DateTime<Utc>>,

    pub converted_at: Option<DateTime<Utc>>,
    pub booking_id: Option<Uuid>,

    /// Intent created when the operator issues the payment link.
    pub payment_intent_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuoteRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quote_number: String,
        trip: TripRequest,
        vehicle_type_id: Uuid,
        vehicle_name: String,
        driver_language: DriverLanguage,
        customer_name: String,
        customer_email: String,
        customer_phone: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            quote_number,
            status: QuoteStatus::Pendente,
            trip,
            vehicle_type_id,
            vehicle_name,
            driver_language,
            customer_name,
            customer_email,
            customer_phone,
            admin_quote_price_cents: None,
            admin_notes: None,
            quoted_at: None,
            converted_at: None,
            booking_id: None,
            payment_intent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
