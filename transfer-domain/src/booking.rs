use crate::tariff::DriverLanguage;
use crate::trip::TripRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pendente,
    Confirmada,
    Concluida,
    Cancelada,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pendente => "pendente",
            BookingStatus::Confirmada => "confirmada",
            BookingStatus::Concluida => "concluida",
            BookingStatus::Cancelada => "cancelada",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Aguardando,
    Pago,
    Reembolsado,
    Falhou,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Aguardando => "aguardando",
            PaymentStatus::Pago => "pago",
            PaymentStatus::Reembolsado => "reembolsado",
            PaymentStatus::Falhou => "falhou",
        }
    }
}

/// Price breakdown of one directional leg, snapshotted from the pricing
/// engine output at booking creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegBreakdown {
    pub base_price_cents: i64,
    pub additional_expenses_cents: i64,
    /// Net effect of all matched pricing rules (signed).
    pub pricing_adjustments_cents: i64,
    pub language_surcharge_cents: i64,
    pub leg_total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundInfo {
    pub refund_id: String,
    pub refund_date: DateTime<Utc>,
    pub refund_reason: String,
}

/// A priced, payable reservation. `status` and `payment_status` are only
/// ever written through the lifecycle transition functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_number: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,

    pub trip: TripRequest,
    pub vehicle_type_id: Uuid,
    pub vehicle_name: String,
    pub driver_language: DriverLanguage,

    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,

    pub outbound: LegBreakdown,
    pub return_leg: Option<LegBreakdown>,
    pub round_trip_discount_percent: f64,
    pub round_trip_discount_cents: i64,
    pub additional_items_total_cents: i64,
    pub total_price_cents: i64,
    pub currency: String,

    pub payment_intent_id: Option<String>,
    pub refund: Option<RefundInfo>,

    /// Set when the booking was produced by converting a quote request.
    pub quote_request_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn has_return(&self) -> bool {
        self.return_leg.is_some()
    }

    /// Cancelada + Reembolsado and Concluida are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, BookingStatus::Concluida)
            || (self.status == BookingStatus::Cancelada
                && self.payment_status == PaymentStatus::Reembolsado)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
