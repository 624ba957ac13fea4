use crate::error::AppError;
use crate::state::AppState;
use crate::trips::TripInput;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use transfer_domain::{DriverLanguage, EngineError, QuoteRequest, QuoteStatus};
use transfer_lifecycle::{quote_number, NotificationTemplate, QuoteLifecycle};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SubmitQuoteRequest {
    #[serde(flatten)]
    pub trip: TripInput,
    pub vehicle_type_id: Uuid,
    #[serde(default)]
    pub driver_language: Option<DriverLanguage>,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuoteRequest {
    pub price_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/quotes", post(submit_quote).get(list_quotes))
        .route("/v1/quotes/{id}", get(get_quote))
        .route("/v1/quotes/{id}/price", post(price_quote))
        .route("/v1/quotes/{id}/accept", post(accept_quote))
        .route("/v1/quotes/{id}/decline", post(decline_quote))
        .route("/v1/quotes/{id}/cancel", post(cancel_quote))
}

/// Intake for trips the calculator will not price automatically: outside
/// the operational radius, or places the mapping provider cannot resolve.
async fn submit_quote(
    State(state): State<AppState>,
    Json(req): Json<SubmitQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteRequest>), AppError> {
    let tariff = state
        .tariffs
        .get(req.vehicle_type_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("vehicle tariff".to_string()))?;

    let trip = req.trip.resolve_lenient(&state).await?;
    if req.customer_email.trim().is_empty() {
        return Err(EngineError::Validation("customer email is required".to_string()).into());
    }

    let quote = QuoteRequest::new(
        quote_number(Utc::now()),
        trip,
        tariff.id,
        tariff.name.clone(),
        req.driver_language.unwrap_or(DriverLanguage::Pt),
        req.customer_name,
        req.customer_email,
        req.customer_phone,
    );
    state.quotes.insert(quote.clone()).await?;

    let _ = state
        .notifier
        .send(
            &quote.customer_email,
            NotificationTemplate::QuoteRequestReceived,
            json!({ "quote_number": quote.quote_number }),
        )
        .await;

    tracing::info!(id = %quote.id, number = %quote.quote_number, "quote request submitted");
    Ok((StatusCode::CREATED, Json(quote)))
}

async fn list_quotes(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuoteRequest>>, AppError> {
    Ok(Json(state.quotes.list().await?))
}

async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuoteRequest>, AppError> {
    let quote = state
        .quotes
        .get(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("quote request {}", id)))?;
    Ok(Json(quote))
}

/// The operator sets the price; the customer gets the payment link. A
/// quoted request with no intent yet (intent creation failed earlier) may
/// be re-priced; the submitted figure is always the one stored and linked.
async fn price_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PriceQuoteRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let notes = req.notes.clone();
    let updated = state
        .quotes
        .transition(id, &move |q| {
            if q.status == QuoteStatus::Cotado {
                QuoteLifecycle::revise_quote(q, req.price_cents, notes.clone())
            } else {
                QuoteLifecycle::set_quote(q, req.price_cents, notes.clone())
            }
        })
        .await?;

    let price = updated
        .admin_quote_price_cents
        .ok_or_else(|| anyhow::anyhow!("quoted request without a stored price"))?;

    let metadata = json!({
        "kind": "quote",
        "quote_id": updated.id,
        "quote_number": updated.quote_number,
    });
    let intent = state
        .payments
        .create_intent(price, &state.pricing.currency, metadata)
        .await
        .map_err(|e| EngineError::external("payment", e))?;

    let intent_id = intent.id.clone();
    let updated = state
        .quotes
        .transition(id, &move |q| {
            q.payment_intent_id = Some(intent_id.clone());
            Ok(())
        })
        .await?;

    let _ = state
        .notifier
        .send(
            &updated.customer_email,
            NotificationTemplate::QuoteResponse,
            json!({
                "quote_number": updated.quote_number,
                "amount_cents": price,
                "notes": updated.admin_notes,
                "client_secret": intent.client_secret,
            }),
        )
        .await;

    tracing::info!(%id, amount_cents = price, "quote priced and link issued");
    Ok(Json(json!({
        "quote": updated,
        "client_secret": intent.client_secret,
    })))
}

async fn accept_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuoteRequest>, AppError> {
    let updated = state
        .quotes
        .transition(id, &QuoteLifecycle::accept)
        .await?;
    Ok(Json(updated))
}

async fn decline_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuoteRequest>, AppError> {
    let updated = state
        .quotes
        .transition(id, &QuoteLifecycle::decline)
        .await?;
    Ok(Json(updated))
}

async fn cancel_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuoteRequest>, AppError> {
    let updated = state
        .quotes
        .transition(id, &QuoteLifecycle::cancel)
        .await?;
    Ok(Json(updated))
}
