use crate::leg::{self, LegPrice};
use crate::round_cents;
use serde::{Deserialize, Serialize};
use transfer_domain::{
    DriverLanguage, EngineError, EngineResult, PricingRule, ServiceType, TripRequest,
    VehicleTariff,
};

/// Process-wide pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    pub round_trip_discount_percent: f64,
    pub currency: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            round_trip_discount_percent: 10.0,
            currency: "BRL".to_string(),
        }
    }
}

/// Final quote for a whole trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripQuote {
    pub outbound: LegPrice,
    pub return_leg: Option<LegPrice>,
    pub round_trip_discount_percent: f64,
    pub round_trip_discount_cents: i64,
    pub total_cents: i64,
    pub min_price_applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TripPriceOutcome {
    Priced(TripQuote),
    /// Not a failure: the caller routes the customer into the quote-request
    /// flow instead of direct booking.
    OutsideOperationalRadius {
        operational_radius_km: f64,
        supplier_total_distance_km: f64,
    },
}

/// Price a whole trip for one vehicle tariff.
///
/// `supplier_total_distance_km` is the round-trip distance the supplier
/// actually drives (base → origin → destination → base), computed by the
/// mapping collaborator and used only for the operational-radius check.
pub fn price_trip(
    tariff: &VehicleTariff,
    trip: &TripRequest,
    rules: &[PricingRule],
    language: DriverLanguage,
    settings: &PricingSettings,
    supplier_total_distance_km: f64,
) -> EngineResult<TripPriceOutcome> {
    trip.validate()?;
    tariff.validate()?;

    if tariff.operational_radius_km > 0.0
        && supplier_total_distance_km > tariff.operational_radius_km
    {
        return Ok(TripPriceOutcome::OutsideOperationalRadius {
            operational_radius_km: tariff.operational_radius_km,
            supplier_total_distance_km,
        });
    }

    match trip.service {
        ServiceType::OneWay => {
            let priced = leg::price_distance_leg(
                tariff,
                &trip.outbound,
                rules,
                language,
                Some(tariff.min_price_one_way_cents),
            )?;
            Ok(TripPriceOutcome::Priced(finish_single(
                priced,
                tariff.min_price_one_way_cents,
            )))
        }
        ServiceType::Hourly => {
            let hours = trip
                .outbound
                .hours
                .ok_or_else(|| EngineError::Validation("missing hour count".to_string()))?;
            let priced =
                leg::price_hourly_leg(tariff, &trip.outbound, rules, language, hours)?;
            Ok(TripPriceOutcome::Priced(finish_single(
                priced,
                tariff.min_price_hourly_cents,
            )))
        }
        ServiceType::RoundTrip => {
            let return_trip_leg = trip
                .return_leg
                .as_ref()
                .ok_or_else(|| EngineError::Validation("missing return leg".to_string()))?;

            // Per-leg pricing applies only the franchise floor; the
            // round-trip minimum applies once to the discounted sum.
            let outbound =
                leg::price_distance_leg(tariff, &trip.outbound, rules, language, None)?;
            let return_leg =
                leg::price_distance_leg(tariff, return_trip_leg, rules, language, None)?;

            let discount_cents = round_cents(
                return_leg.leg_total_cents as f64 * settings.round_trip_discount_percent
                    / 100.0,
            );
            let discounted =
                outbound.leg_total_cents + return_leg.leg_total_cents - discount_cents;

            let mut min_price_applied =
                outbound.min_price_applied || return_leg.min_price_applied;
            let total = if tariff.min_price_round_trip_cents > discounted {
                min_price_applied = true;
                tariff.min_price_round_trip_cents
            } else {
                discounted
            };

            Ok(TripPriceOutcome::Priced(TripQuote {
                outbound,
                return_leg: Some(return_leg),
                round_trip_discount_percent: settings.round_trip_discount_percent,
                round_trip_discount_cents: discount_cents,
                total_cents: total,
                min_price_applied,
            }))
        }
    }
}

/// One-way and hourly trips re-check the absolute floor after rules and
/// surcharge, since a promotional rule may have pushed the total below it.
fn finish_single(priced: LegPrice, floor_cents: i64) -> TripQuote {
    let mut min_price_applied = priced.min_price_applied;
    let total = if floor_cents > priced.leg_total_cents {
        min_price_applied = true;
        floor_cents
    } else {
        priced.leg_total_cents
    };
    TripQuote {
        outbound: priced,
        return_leg: None,
        round_trip_discount_percent: 0.0,
        round_trip_discount_cents: 0,
        total_cents: total,
        min_price_applied,
    }
}
