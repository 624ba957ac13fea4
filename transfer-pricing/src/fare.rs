use crate::round_cents;
use serde::{Deserialize, Serialize};
use transfer_domain::{TripLeg, VehicleTariff};

/// Which tariff schedule produced an hourly fare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    Fixed5Hours,
    Fixed10Hours,
    PerHour,
}

/// Raw fare for one leg before rules and language surcharge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareBreakdown {
    pub base_price_cents: i64,
    /// Kilometre-overage charges for hourly service.
    pub additional_expenses_cents: i64,
    /// True whenever a floor (franchise or absolute minimum) determined the
    /// base price rather than the raw computation.
    pub min_price_applied: bool,
    pub package_type: Option<PackageType>,
    pub km_allowance: Option<f64>,
}

/// Distance-based fare. `absolute_floor_cents` is the one-way minimum for a
/// single leg; round-trip legs pass `None` because the round-trip floor
/// applies once to the sum of both legs.
pub fn distance_fare(
    tariff: &VehicleTariff,
    distance_km: f64,
    absolute_floor_cents: Option<i64>,
) -> FareBreakdown {
    let raw = round_cents(distance_km * tariff.price_per_km_cents as f64);

    // The franchise price is always a floor, not a cap, regardless of
    // distance.
    let mut base = raw.max(tariff.min_price_for_franchise_cents);
    let mut min_price_applied = base > raw;

    if let Some(floor) = absolute_floor_cents {
        if floor > base {
            base = floor;
            min_price_applied = true;
        }
    }

    FareBreakdown {
        base_price_cents: base,
        additional_expenses_cents: 0,
        min_price_applied,
        package_type: None,
        km_allowance: None,
    }
}

/// Hourly fare: fixed 5h/10h packages when configured, otherwise the
/// per-hour rate with a proportional kilometre allowance. Overage beyond
/// the allowance is charged separately at the additional per-km rate.
pub fn hourly_fare(tariff: &VehicleTariff, leg: &TripLeg, hours: u32) -> FareBreakdown {
    let (raw, allowance, package_type) = match tariff.package_for(hours) {
        Some(package) => {
            let package_type = match package.duration_hours {
                5 => PackageType::Fixed5Hours,
                10 => PackageType::Fixed10Hours,
                _ => PackageType::PerHour,
            };
            (package.fixed_price_cents, package.km_allowance, package_type)
        }
        None => (
            tariff.price_per_hour_cents * hours as i64,
            tariff.km_allowance_per_hour * hours as f64,
            PackageType::PerHour,
        ),
    };

    let overage_km = (leg.distance_km - allowance).max(0.0);
    let additional =
        round_cents(overage_km * tariff.additional_price_per_km_cents as f64);

    let base = raw.max(tariff.min_price_hourly_cents);

    FareBreakdown {
        base_price_cents: base,
        additional_expenses_cents: additional,
        min_price_applied: base > raw,
        package_type: Some(package_type),
        km_allowance: Some(allowance),
    }
}
