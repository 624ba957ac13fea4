//! Request-side trip shapes. The storefront sends addresses and schedule
//! only; distances and durations are resolved server-side so the engine
//! never trusts client-computed figures.

use crate::state::AppState;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use transfer_domain::{EngineError, EngineResult, ServiceType, TripLeg, TripRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct TripLegInput {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripInput {
    pub service: ServiceType,
    pub outbound: TripLegInput,
    pub return_leg: Option<TripLegInput>,
    /// Booked hours for hourly service.
    pub hours: Option<u32>,
}

impl TripInput {
    /// Resolve distances and routes into a full trip request.
    pub async fn resolve(&self, state: &AppState) -> EngineResult<TripRequest> {
        let outbound = resolve_leg(state, &self.outbound, self.hours).await?;
        let return_leg = match &self.return_leg {
            Some(input) => Some(resolve_leg(state, input, None).await?),
            None => None,
        };
        Ok(TripRequest {
            service: self.service,
            outbound,
            return_leg,
        })
    }

    /// Quote requests may name places the mapping provider does not know;
    /// an operator prices those by hand, so distance failures degrade to
    /// zero instead of rejecting the submission.
    pub async fn resolve_lenient(&self, state: &AppState) -> EngineResult<TripRequest> {
        match self.resolve(state).await {
            Ok(trip) => Ok(trip),
            Err(EngineError::ExternalService { service, message }) => {
                tracing::warn!(service, message, "distance unresolved, quoting manually");
                let outbound = unresolved_leg(&self.outbound, self.hours);
                let return_leg = self.return_leg.as_ref().map(|l| unresolved_leg(l, None));
                Ok(TripRequest {
                    service: self.service,
                    outbound,
                    return_leg,
                })
            }
            Err(err) => Err(err),
        }
    }
}

async fn resolve_leg(
    state: &AppState,
    input: &TripLegInput,
    hours: Option<u32>,
) -> EngineResult<TripLeg> {
    if input.origin.trim().is_empty() {
        return Err(EngineError::Validation("leg origin is required".to_string()));
    }

    // Hourly dispositions start and end at the pickup point; there is no
    // fixed destination to measure.
    let measured = if input.destination.trim().is_empty() {
        None
    } else {
        Some(
            state
                .distance
                .lookup(&input.origin, &input.destination)
                .await
                .map_err(|e| EngineError::external("distance", e))?,
        )
    };

    let route = if measured.is_some() {
        state.routes.find(&input.origin, &input.destination).await?
    } else {
        None
    };

    Ok(TripLeg {
        origin: input.origin.clone(),
        destination: input.destination.clone(),
        route_id: route.map(|r| r.id),
        date: input.date,
        time: input.time,
        distance_km: measured.map(|m| m.distance_km).unwrap_or(0.0),
        duration_minutes: measured.map(|m| m.duration_minutes).unwrap_or(0),
        hours,
    })
}

fn unresolved_leg(input: &TripLegInput, hours: Option<u32>) -> TripLeg {
    TripLeg {
        origin: input.origin.clone(),
        destination: input.destination.clone(),
        route_id: None,
        date: input.date,
        time: input.time,
        distance_km: 0.0,
        duration_minutes: 0,
        hours,
    }
}

/// Distance the supplier actually drives for the outbound corridor:
/// base → origin → destination → base. Feeds the operational-radius check
/// only; the customer is billed on origin → destination.
pub async fn supplier_round_trip_km(state: &AppState, leg: &TripLeg) -> EngineResult<f64> {
    let to_pickup = state
        .distance
        .lookup(&state.base_address, &leg.origin)
        .await
        .map_err(|e| EngineError::external("distance", e))?;

    if leg.destination.trim().is_empty() {
        return Ok(to_pickup.distance_km * 2.0);
    }

    let back_to_base = state
        .distance
        .lookup(&leg.destination, &state.base_address)
        .await
        .map_err(|e| EngineError::external("distance", e))?;

    Ok(to_pickup.distance_km + leg.distance_km + back_to_base.distance_km)
}
