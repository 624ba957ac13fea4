use crate::trip::{price_trip, PricingSettings, TripPriceOutcome, TripQuote};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use transfer_domain::{DriverLanguage, PricingRule, TripRequest, VehicleTariff};
use uuid::Uuid;

/// Result of pricing one vehicle: either a quote, an outside-radius signal
/// routing the customer into the quote flow, or a captured failure. A
/// failed vehicle never hides the others.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PriceOutcome {
    Priced(TripQuote),
    OutsideOperationalRadius {
        operational_radius_km: f64,
        supplier_total_distance_km: f64,
    },
    CalculationFailed {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedVehicleOption {
    pub vehicle_type_id: Uuid,
    pub vehicle_name: String,
    pub display_order: i32,
    pub max_passengers: u32,
    pub max_luggage: u32,
    pub offered_languages: Vec<DriverLanguage>,
    pub min_booking_lead_time_hours: u32,
    pub meets_lead_time: bool,
    #[serde(flatten)]
    pub outcome: PriceOutcome,
}

/// Price one vehicle as an independent unit of work; errors are captured
/// into the outcome instead of propagating.
pub fn price_vehicle_option(
    tariff: &VehicleTariff,
    trip: &TripRequest,
    rules: &[PricingRule],
    language: DriverLanguage,
    settings: &PricingSettings,
    supplier_total_distance_km: f64,
    now: NaiveDateTime,
) -> PricedVehicleOption {
    // A vehicle only offering Portuguese silently prices in Portuguese when
    // the customer asked for a language it does not carry, mirroring the
    // storefront resetting the selector per vehicle.
    let effective_language = if tariff.surcharge_for(language).is_some()
        || language == DriverLanguage::Pt
    {
        language
    } else {
        DriverLanguage::Pt
    };

    let outcome = match price_trip(
        tariff,
        trip,
        rules,
        effective_language,
        settings,
        supplier_total_distance_km,
    ) {
        Ok(TripPriceOutcome::Priced(quote)) => PriceOutcome::Priced(quote),
        Ok(TripPriceOutcome::OutsideOperationalRadius {
            operational_radius_km,
            supplier_total_distance_km,
        }) => PriceOutcome::OutsideOperationalRadius {
            operational_radius_km,
            supplier_total_distance_km,
        },
        Err(err) => PriceOutcome::CalculationFailed {
            message: err.to_string(),
        },
    };

    let lead_time_hours = tariff.min_booking_lead_time_hours as i64;
    let meets_lead_time =
        (trip.outbound.pickup_at() - now).num_hours() >= lead_time_hours;

    PricedVehicleOption {
        vehicle_type_id: tariff.id,
        vehicle_name: tariff.name.clone(),
        display_order: tariff.display_order,
        max_passengers: tariff.max_passengers,
        max_luggage: tariff.max_luggage,
        offered_languages: tariff.offered_languages(),
        min_booking_lead_time_hours: tariff.min_booking_lead_time_hours,
        meets_lead_time,
        outcome,
    }
}

/// Deterministic aggregation: display order first, then total price.
/// Options without a price (outside radius, failed) keep their display
/// slot relative to equally-ordered vehicles but sort after priced ones.
pub fn sort_options(options: &mut [PricedVehicleOption]) {
    options.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| sort_total(a).cmp(&sort_total(b)))
            .then_with(|| a.vehicle_type_id.cmp(&b.vehicle_type_id))
    });
}

fn sort_total(option: &PricedVehicleOption) -> i64 {
    match &option.outcome {
        PriceOutcome::Priced(quote) => quote.total_cents,
        _ => i64::MAX,
    }
}
