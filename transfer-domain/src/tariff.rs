use crate::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Language spoken by the assigned driver. Portuguese is the native default
/// and never carries a surcharge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DriverLanguage {
    Pt,
    En,
    Es,
}

impl DriverLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            DriverLanguage::Pt => "pt",
            DriverLanguage::En => "en",
            DriverLanguage::Es => "es",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SurchargeValue {
    /// Flat amount in cents added on top of the leg subtotal.
    Fixed(i64),
    /// Percentage of the leg subtotal.
    Percentage(f64),
}

impl SurchargeValue {
    /// A zero-valued surcharge means the language is configured off.
    pub fn is_zero(&self) -> bool {
        match self {
            SurchargeValue::Fixed(cents) => *cents == 0,
            SurchargeValue::Percentage(pct) => *pct == 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageSurcharge {
    pub language: DriverLanguage,
    #[serde(flatten)]
    pub value: SurchargeValue,
}

/// Fixed-price hourly package (5h and 10h in practice) with a bundled
/// kilometre allowance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyPackage {
    pub duration_hours: u32,
    pub fixed_price_cents: i64,
    pub km_allowance: f64,
}

/// Per-vehicle-type tariff. Snapshot semantics: a booking references the
/// tariff values in force at creation time and is never repriced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTariff {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_passengers: u32,
    pub max_luggage: u32,
    pub display_order: i32,
    pub is_active: bool,

    pub price_per_km_cents: i64,
    pub price_per_hour_cents: i64,

    /// Distance threshold below which the franchise floor price applies.
    pub min_km_franchise: f64,
    pub min_price_for_franchise_cents: i64,

    pub min_price_one_way_cents: i64,
    pub min_price_round_trip_cents: i64,
    pub min_price_hourly_cents: i64,

    pub hourly_packages: Vec<HourlyPackage>,
    /// Allowance used when the requested hour count has no fixed package.
    pub km_allowance_per_hour: f64,

    /// Overage rates beyond the hourly kilometre allowance / booked hours.
    pub additional_price_per_km_cents: i64,
    pub additional_price_per_hour_cents: i64,

    pub language_surcharges: Vec<LanguageSurcharge>,

    /// Maximum supplier round-trip distance serviced automatically.
    /// Zero means unlimited.
    pub operational_radius_km: f64,
    pub min_booking_lead_time_hours: u32,
}

impl VehicleTariff {
    /// Languages a customer may select for this vehicle. Portuguese is
    /// always available; other languages only when a non-zero surcharge is
    /// configured.
    pub fn offered_languages(&self) -> Vec<DriverLanguage> {
        let mut languages = vec![DriverLanguage::Pt];
        for surcharge in &self.language_surcharges {
            if surcharge.language != DriverLanguage::Pt && !surcharge.value.is_zero() {
                languages.push(surcharge.language);
            }
        }
        languages
    }

    pub fn surcharge_for(&self, language: DriverLanguage) -> Option<&LanguageSurcharge> {
        self.language_surcharges
            .iter()
            .find(|s| s.language == language && !s.value.is_zero())
    }

    pub fn package_for(&self, hours: u32) -> Option<&HourlyPackage> {
        self.hourly_packages
            .iter()
            .find(|p| p.duration_hours == hours)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let monetary = [
            ("price_per_km", self.price_per_km_cents),
            ("price_per_hour", self.price_per_hour_cents),
            ("min_price_for_franchise", self.min_price_for_franchise_cents),
            ("min_price_one_way", self.min_price_one_way_cents),
            ("min_price_round_trip", self.min_price_round_trip_cents),
            ("min_price_hourly", self.min_price_hourly_cents),
            ("additional_price_per_km", self.additional_price_per_km_cents),
            ("additional_price_per_hour", self.additional_price_per_hour_cents),
        ];
        for (field, cents) in monetary {
            if cents < 0 {
                return Err(EngineError::Validation(format!(
                    "tariff field {} must not be negative",
                    field
                )));
            }
        }
        for package in &self.hourly_packages {
            if package.fixed_price_cents < 0 {
                return Err(EngineError::Validation(
                    "hourly package price must not be negative".to_string(),
                ));
            }
        }
        if self.min_km_franchise < 0.0 || self.operational_radius_km < 0.0 {
            return Err(EngineError::Validation(
                "distance thresholds must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_tariff() -> VehicleTariff {
        VehicleTariff {
            id: Uuid::new_v4(),
            name: "Sedan Executivo".to_string(),
            description: None,
            max_passengers: 3,
            max_luggage: 3,
            display_order: 1,
            is_active: true,
            price_per_km_cents: 200,
            price_per_hour_cents: 10000,
            min_km_franchise: 50.0,
            min_price_for_franchise_cents: 15000,
            min_price_one_way_cents: 10000,
            min_price_round_trip_cents: 25000,
            min_price_hourly_cents: 30000,
            hourly_packages: vec![],
            km_allowance_per_hour: 12.0,
            additional_price_per_km_cents: 250,
            additional_price_per_hour_cents: 12000,
            language_surcharges: vec![],
            operational_radius_km: 0.0,
            min_booking_lead_time_hours: 24,
        }
    }

    #[test]
    fn zero_valued_surcharge_is_never_offered() {
        let mut tariff = base_tariff();
        tariff.language_surcharges = vec![
            LanguageSurcharge {
                language: DriverLanguage::En,
                value: SurchargeValue::Fixed(5000),
            },
            LanguageSurcharge {
                language: DriverLanguage::Es,
                value: SurchargeValue::Fixed(0),
            },
        ];

        let offered = tariff.offered_languages();
        assert!(offered.contains(&DriverLanguage::Pt));
        assert!(offered.contains(&DriverLanguage::En));
        assert!(!offered.contains(&DriverLanguage::Es));
        assert!(tariff.surcharge_for(DriverLanguage::Es).is_none());
    }

    #[test]
    fn negative_monetary_field_fails_validation() {
        let mut tariff = base_tariff();
        tariff.min_price_one_way_cents = -1;
        assert!(tariff.validate().is_err());
    }

    #[test]
    fn surcharge_value_serde_shape() {
        let surcharge = LanguageSurcharge {
            language: DriverLanguage::En,
            value: SurchargeValue::Percentage(10.0),
        };
        let json = serde_json::to_value(&surcharge).unwrap();
        assert_eq!(json["language"], "en");
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["value"], 10.0);
    }
}
