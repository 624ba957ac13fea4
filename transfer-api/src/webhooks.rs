use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use transfer_domain::{
    Booking, BookingStatus, LegBreakdown, PaymentStatus, QuoteRequest, QuoteStatus,
};
use transfer_lifecycle::{booking_number, BookingLifecycle, NotificationTemplate, QuoteLifecycle};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: PaymentIntentObject,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_webhook))
}

/// Gateway callback. Delivery is at-least-once, so every branch tolerates
/// replays: a confirmation already applied is acknowledged without effect.
async fn handle_payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> Result<StatusCode, AppError> {
    tracing::info!(
        event = %payload.type_,
        intent = %payload.data.object.id,
        "received payment webhook"
    );
    let intent_id = payload.data.object.id.as_str();

    match payload.type_.as_str() {
        "payment_intent.succeeded" => {
            if let Some(booking) = state.bookings.find_by_intent(intent_id).await? {
                let intent = intent_id.to_string();
                let updated = state
                    .bookings
                    .transition(booking.id, &move |b| {
                        BookingLifecycle::confirm_payment(b, &intent).map(|_| ())
                    })
                    .await?;
                let _ = state
                    .notifier
                    .send(
                        &updated.customer_email,
                        NotificationTemplate::BookingConfirmed,
                        json!({ "booking_number": updated.booking_number }),
                    )
                    .await;
                tracing::info!(booking = %booking.id, "booking confirmed via webhook");
            } else if let Some(quote) = state.quotes.find_by_intent(intent_id).await? {
                convert_quote(&state, quote, intent_id).await?;
            } else {
                tracing::warn!(intent = intent_id, "webhook for unknown payment intent");
            }
        }
        "payment_intent.payment_failed" => {
            if let Some(booking) = state.bookings.find_by_intent(intent_id).await? {
                if booking.payment_status == PaymentStatus::Aguardando {
                    let intent = intent_id.to_string();
                    state
                        .bookings
                        .transition(booking.id, &move |b| {
                            BookingLifecycle::mark_payment_failed(b, &intent)
                        })
                        .await?;
                    tracing::info!(booking = %booking.id, "payment marked failed via webhook");
                }
            } else {
                tracing::warn!(intent = intent_id, "failure webhook for unknown intent");
            }
        }
        _ => {}
    }

    Ok(StatusCode::OK)
}

/// Payment on a quoted request materializes the booking: the quote is
/// accepted (payment is the acceptance) and converted, and the booking is
/// born already paid and confirmed. The quote transition runs before the
/// booking row commits, so payment on a quote that was cancelled or
/// declined in the meantime creates no booking.
async fn convert_quote(
    state: &AppState,
    quote: QuoteRequest,
    intent_id: &str,
) -> Result<(), AppError> {
    if quote.status == QuoteStatus::Convertido {
        return Ok(());
    }

    let price = quote
        .admin_quote_price_cents
        .ok_or_else(|| anyhow::anyhow!("paid quote {} has no stored price", quote.id))?;

    let now = Utc::now();
    let mut booking = Booking {
        id: Uuid::new_v4(),
        booking_number: booking_number(now),
        status: BookingStatus::Pendente,
        payment_status: PaymentStatus::Aguardando,
        trip: quote.trip.clone(),
        vehicle_type_id: quote.vehicle_type_id,
        vehicle_name: quote.vehicle_name.clone(),
        driver_language: quote.driver_language,
        customer_name: quote.customer_name.clone(),
        customer_email: quote.customer_email.clone(),
        customer_phone: quote.customer_phone.clone(),
        outbound: admin_priced_leg(price),
        return_leg: None,
        round_trip_discount_percent: 0.0,
        round_trip_discount_cents: 0,
        additional_items_total_cents: 0,
        total_price_cents: price,
        currency: state.pricing.currency.clone(),
        payment_intent_id: None,
        refund: None,
        quote_request_id: Some(quote.id),
        created_at: now,
        updated_at: now,
    };
    BookingLifecycle::confirm_payment(&mut booking, intent_id)?;
    let booking_id = booking.id;

    state
        .quotes
        .transition(quote.id, &move |q| {
            if q.status == QuoteStatus::Cotado {
                QuoteLifecycle::accept(q)?;
            }
            QuoteLifecycle::mark_converted(q, booking_id)
        })
        .await?;

    state.bookings.insert(booking.clone()).await?;

    let _ = state
        .notifier
        .send(
            &booking.customer_email,
            NotificationTemplate::BookingConfirmed,
            json!({
                "booking_number": booking.booking_number,
                "quote_number": quote.quote_number,
            }),
        )
        .await;

    tracing::info!(quote = %quote.id, booking = %booking_id, "quote converted via webhook");
    Ok(())
}

/// A quote is priced as a single operator-set figure, not a calculated
/// breakdown.
fn admin_priced_leg(price_cents: i64) -> LegBreakdown {
    LegBreakdown {
        base_price_cents: price_cents,
        leg_total_cents: price_cents,
        ..LegBreakdown::default()
    }
}
