use crate::error::AppError;
use crate::state::AppState;
use crate::trips::{self, TripInput};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use transfer_domain::{
    Booking, BookingStatus, DriverLanguage, EngineError, LegBreakdown, PaymentStatus,
};
use transfer_lifecycle::{booking_number, BookingLifecycle, NotificationTemplate};
use transfer_pricing::{trip::price_trip, LegPrice, TripPriceOutcome};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(flatten)]
    pub trip: TripInput,
    pub vehicle_type_id: Uuid,
    #[serde(default)]
    pub driver_language: Option<DriverLanguage>,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub additional_item_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusOverrideRequest {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/refund", post(refund_booking))
        .route("/v1/bookings/{id}/resend-link", post(resend_payment_link))
        .route("/v1/bookings/{id}/status", post(override_status))
}

pub(crate) fn breakdown(leg: &LegPrice) -> LegBreakdown {
    LegBreakdown {
        base_price_cents: leg.base_price_cents,
        additional_expenses_cents: leg.additional_expenses_cents,
        pricing_adjustments_cents: leg.pricing_adjustments_cents,
        language_surcharge_cents: leg.language_surcharge_cents,
        leg_total_cents: leg.leg_total_cents,
    }
}

/// Two-step creation: the booking row commits first, the payment intent
/// second. An intent failure leaves a reconcilable Pendente/Aguardando
/// booking and reports its id so the client can retry via resend-link.
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Response, AppError> {
    let trip = req.trip.resolve(&state).await?;
    trip.validate()?;

    let tariff = state
        .tariffs
        .get(req.vehicle_type_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("vehicle tariff".to_string()))?;

    let language = req.driver_language.unwrap_or(DriverLanguage::Pt);
    if language != DriverLanguage::Pt && tariff.surcharge_for(language).is_none() {
        return Err(EngineError::UnsupportedLanguage(language.code().to_string()).into());
    }

    let supplier_km = trips::supplier_round_trip_km(&state, &trip.outbound).await?;
    let rules = state.rules.list_active().await?;

    let quote = match price_trip(&tariff, &trip, &rules, language, &state.pricing, supplier_km)? {
        TripPriceOutcome::Priced(quote) => quote,
        TripPriceOutcome::OutsideOperationalRadius { .. } => {
            return Err(EngineError::Validation(
                "trip is outside the operational radius; submit a quote request instead"
                    .to_string(),
            )
            .into());
        }
    };

    let items = state
        .additional_items
        .get_many(&req.additional_item_ids)
        .await?;
    let items_total: i64 = items.iter().map(|i| i.price_cents).sum();
    let total = quote.total_cents + items_total;

    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        booking_number: booking_number(now),
        status: BookingStatus::Pendente,
        payment_status: PaymentStatus::Aguardando,
        trip,
        vehicle_type_id: tariff.id,
        vehicle_name: tariff.name.clone(),
        driver_language: language,
        customer_name: req.customer_name,
        customer_email: req.customer_email,
        customer_phone: req.customer_phone,
        outbound: breakdown(&quote.outbound),
        return_leg: quote.return_leg.as_ref().map(breakdown),
        round_trip_discount_percent: quote.round_trip_discount_percent,
        round_trip_discount_cents: quote.round_trip_discount_cents,
        additional_items_total_cents: items_total,
        total_price_cents: total,
        currency: state.pricing.currency.clone(),
        payment_intent_id: None,
        refund: None,
        quote_request_id: None,
        created_at: now,
        updated_at: now,
    };
    let booking_id = booking.id;
    state.bookings.insert(booking.clone()).await?;

    let metadata = json!({
        "kind": "booking",
        "booking_id": booking_id,
        "booking_number": booking.booking_number,
    });
    let intent = match state
        .payments
        .create_intent(total, &state.pricing.currency, metadata)
        .await
    {
        Ok(intent) => intent,
        Err(err) => {
            tracing::error!(%booking_id, "payment intent creation failed: {}", err);
            return Ok((
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "payment intent creation failed",
                    "booking_id": booking_id,
                    "retryable": true,
                })),
            )
                .into_response());
        }
    };

    let intent_id = intent.id.clone();
    let updated = state
        .bookings
        .transition(booking_id, &move |b| {
            b.payment_intent_id = Some(intent_id.clone());
            Ok(())
        })
        .await?;

    let _ = state
        .notifier
        .send(
            &updated.customer_email,
            NotificationTemplate::PaymentLink,
            json!({
                "booking_number": updated.booking_number,
                "amount_cents": total,
                "client_secret": intent.client_secret,
            }),
        )
        .await;

    tracing::info!(%booking_id, number = %updated.booking_number, "booking created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "booking": updated,
            "client_secret": intent.client_secret,
        })),
    )
        .into_response())
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("booking {}", id)))?;
    Ok(Json(booking))
}

/// Reserve the refund under the store lock, then call the gateway, then
/// finalize. Of two concurrent requests only one wins the reservation; the
/// loser gets a 409 without ever reaching the gateway. A gateway failure
/// releases the reservation so the refund can be retried.
async fn refund_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("booking {}", id)))?;

    let intent_id = booking.payment_intent_id.clone().ok_or_else(|| {
        EngineError::Validation("booking has no payment intent to refund".to_string())
    })?;

    let reason = req.reason.clone();
    let reserved = state
        .bookings
        .transition(id, &move |b| BookingLifecycle::begin_refund(b, &reason))
        .await?;

    let outcome = match state
        .payments
        .refund(&intent_id, reserved.total_price_cents)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Err(release_err) = state
                .bookings
                .transition(id, &BookingLifecycle::abort_refund)
                .await
            {
                tracing::error!(%id, "failed to release refund reservation: {}", release_err);
            }
            return Err(EngineError::external("payment", err).into());
        }
    };

    let refund_id = outcome.refund_id.clone();
    let updated = state
        .bookings
        .transition(id, &move |b| {
            BookingLifecycle::finish_refund(b, &refund_id)
        })
        .await?;

    let _ = state
        .notifier
        .send(
            &updated.customer_email,
            NotificationTemplate::RefundProcessed,
            json!({
                "booking_number": updated.booking_number,
                "refund_id": outcome.refund_id,
                "amount_cents": outcome.amount_cents,
            }),
        )
        .await;

    tracing::info!(%id, refund_id = %outcome.refund_id, "booking refunded");
    Ok(Json(updated))
}

/// Re-issues the payment link for a booking stuck in Aguardando/Falhou.
/// Also the reconciliation path when intent creation failed at booking
/// time: a missing or failed intent gets a fresh one here.
async fn resend_payment_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = state
        .bookings
        .get(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("booking {}", id)))?;
    BookingLifecycle::ensure_can_resend_link(&booking)?;

    let needs_new_intent = booking.payment_intent_id.is_none()
        || booking.payment_status == PaymentStatus::Falhou;

    let (intent_id, client_secret) = if needs_new_intent {
        let metadata = json!({
            "kind": "booking",
            "booking_id": booking.id,
            "booking_number": booking.booking_number,
        });
        let intent = state
            .payments
            .create_intent(booking.total_price_cents, &booking.currency, metadata)
            .await
            .map_err(|e| EngineError::external("payment", e))?;

        let new_id = intent.id.clone();
        state
            .bookings
            .transition(id, &move |b| {
                BookingLifecycle::ensure_can_resend_link(b)?;
                b.payment_intent_id = Some(new_id.clone());
                if b.payment_status == PaymentStatus::Falhou {
                    b.payment_status = PaymentStatus::Aguardando;
                }
                Ok(())
            })
            .await?;
        (intent.id, intent.client_secret)
    } else {
        let existing = booking.payment_intent_id.clone().unwrap_or_default();
        let intent = state
            .payments
            .get_intent(&existing)
            .await
            .map_err(|e| EngineError::external("payment", e))?;
        (intent.id, intent.client_secret)
    };

    let _ = state
        .notifier
        .send(
            &booking.customer_email,
            NotificationTemplate::PaymentLink,
            json!({
                "booking_number": booking.booking_number,
                "amount_cents": booking.total_price_cents,
                "client_secret": client_secret,
            }),
        )
        .await;

    Ok(Json(json!({
        "booking_id": id,
        "payment_intent_id": intent_id,
        "client_secret": client_secret,
    })))
}

/// Operator override; both axes go through the same lifecycle guards as
/// the dedicated operations.
async fn override_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusOverrideRequest>,
) -> Result<Json<Booking>, AppError> {
    if req.status.is_none() && req.payment_status.is_none() {
        return Err(
            EngineError::Validation("no status override provided".to_string()).into(),
        );
    }

    let updated = state
        .bookings
        .transition(id, &move |b| {
            if let Some(target) = req.status {
                BookingLifecycle::override_status(b, target)?;
            }
            if let Some(target) = req.payment_status {
                BookingLifecycle::override_payment_status(b, target)?;
            }
            Ok(())
        })
        .await?;

    tracing::info!(%id, status = %updated.status.as_str(), payment = %updated.payment_status.as_str(), "operator override applied");
    Ok(Json(updated))
}
