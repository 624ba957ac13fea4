pub mod distance;
pub mod fare;
pub mod leg;
pub mod options;
pub mod rules;
pub mod surcharge;
pub mod trip;

pub use distance::{DistanceProvider, DistanceResult, FixedDistanceProvider};
pub use fare::{FareBreakdown, PackageType};
pub use leg::LegPrice;
pub use options::{PriceOutcome, PricedVehicleOption};
pub use rules::{AppliedRule, RuleOutcome};
pub use trip::{PricingSettings, TripPriceOutcome, TripQuote};

/// Round a fractional cent amount half-up, away from zero for negatives.
pub(crate) fn round_cents(value: f64) -> i64 {
    value.round() as i64
}
