use crate::fare::{self, FareBreakdown, PackageType};
use crate::rules::{self, AppliedRule};
use crate::surcharge;
use serde::{Deserialize, Serialize};
use transfer_domain::{DriverLanguage, EngineResult, PricingRule, TripLeg, VehicleTariff};

/// Fully priced directional leg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegPrice {
    pub base_price_cents: i64,
    pub additional_expenses_cents: i64,
    pub pricing_adjustments_cents: i64,
    pub language_surcharge_cents: i64,
    pub leg_total_cents: i64,
    pub min_price_applied: bool,
    pub package_type: Option<PackageType>,
    pub km_allowance: Option<f64>,
    pub applied_rules: Vec<AppliedRule>,
}

/// Price one leg: fare first, then promotional/seasonal rules, then the
/// language surcharge last; the surcharge is a service attribute and is
/// not discounted by promotions.
pub fn price_leg(
    tariff: &VehicleTariff,
    leg: &TripLeg,
    fare: FareBreakdown,
    rules: &[PricingRule],
    language: DriverLanguage,
) -> EngineResult<LegPrice> {
    let subtotal = fare.base_price_cents + fare.additional_expenses_cents;
    let rule_outcome = rules::apply_rules(rules, leg, subtotal);
    let surcharge = surcharge::resolve(tariff, language, rule_outcome.adjusted_subtotal_cents)?;

    Ok(LegPrice {
        base_price_cents: fare.base_price_cents,
        additional_expenses_cents: fare.additional_expenses_cents,
        pricing_adjustments_cents: rule_outcome.total_adjustment_cents(),
        language_surcharge_cents: surcharge.amount_cents,
        leg_total_cents: rule_outcome.adjusted_subtotal_cents + surcharge.amount_cents,
        min_price_applied: fare.min_price_applied,
        package_type: fare.package_type,
        km_allowance: fare.km_allowance,
        applied_rules: rule_outcome.applied_rules,
    })
}

/// Distance-mode leg pricing; `absolute_floor_cents` as in
/// [`fare::distance_fare`].
pub fn price_distance_leg(
    tariff: &VehicleTariff,
    leg: &TripLeg,
    rules: &[PricingRule],
    language: DriverLanguage,
    absolute_floor_cents: Option<i64>,
) -> EngineResult<LegPrice> {
    let fare = fare::distance_fare(tariff, leg.distance_km, absolute_floor_cents);
    price_leg(tariff, leg, fare, rules, language)
}

/// Hourly-mode leg pricing.
pub fn price_hourly_leg(
    tariff: &VehicleTariff,
    leg: &TripLeg,
    rules: &[PricingRule],
    language: DriverLanguage,
    hours: u32,
) -> EngineResult<LegPrice> {
    let fare = fare::hourly_fare(tariff, leg, hours);
    price_leg(tariff, leg, fare, rules, language)
}
