use crate::error::AppError;
use crate::state::AppState;
use crate::trips::{self, TripInput};
use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use transfer_domain::DriverLanguage;
use transfer_pricing::{options, PricedVehicleOption};

#[derive(Debug, Deserialize)]
pub struct PricingOptionsRequest {
    #[serde(flatten)]
    pub trip: TripInput,
    #[serde(default)]
    pub driver_language: Option<DriverLanguage>,
}

#[derive(Debug, Serialize)]
struct PricingOptionsResponse {
    currency: String,
    options: Vec<PricedVehicleOption>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/pricing/options", post(price_options))
}

/// One request prices the whole fleet. Vehicles that cannot be priced are
/// reported with their failure; they never hide the vehicles that can.
async fn price_options(
    State(state): State<AppState>,
    Json(req): Json<PricingOptionsRequest>,
) -> Result<Json<PricingOptionsResponse>, AppError> {
    let trip = req.trip.resolve(&state).await?;
    trip.validate()?;

    let supplier_km = trips::supplier_round_trip_km(&state, &trip.outbound).await?;
    let language = req.driver_language.unwrap_or(DriverLanguage::Pt);

    let tariffs = state.tariffs.list_active().await?;
    let rules = state.rules.list_active().await?;
    let now = Utc::now().naive_utc();

    let mut priced: Vec<PricedVehicleOption> = tariffs
        .iter()
        .map(|tariff| {
            options::price_vehicle_option(
                tariff,
                &trip,
                &rules,
                language,
                &state.pricing,
                supplier_km,
                now,
            )
        })
        .collect();
    options::sort_options(&mut priced);

    tracing::info!(
        vehicles = priced.len(),
        service = ?trip.service,
        "priced vehicle options"
    );

    Ok(Json(PricingOptionsResponse {
        currency: state.pricing.currency.clone(),
        options: priced,
    }))
}
