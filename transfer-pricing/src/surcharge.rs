use crate::round_cents;
use serde::{Deserialize, Serialize};
use transfer_domain::{DriverLanguage, EngineError, EngineResult, SurchargeValue, VehicleTariff};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurchargeResult {
    pub language: DriverLanguage,
    pub amount_cents: i64,
}

/// Resolve the driver-language surcharge for a leg subtotal. Portuguese is
/// the native default and free; any other language must have a non-zero
/// surcharge configured on the vehicle. The caller should never offer an
/// unconfigured language, so reaching the error path here means the request
/// bypassed the offered-languages list.
pub fn resolve(
    tariff: &VehicleTariff,
    language: DriverLanguage,
    subtotal_cents: i64,
) -> EngineResult<SurchargeResult> {
    if language == DriverLanguage::Pt {
        return Ok(SurchargeResult {
            language,
            amount_cents: 0,
        });
    }

    let surcharge = tariff
        .surcharge_for(language)
        .ok_or_else(|| EngineError::UnsupportedLanguage(language.code().to_string()))?;

    let amount_cents = match surcharge.value {
        SurchargeValue::Fixed(cents) => cents,
        SurchargeValue::Percentage(percent) => {
            round_cents(subtotal_cents as f64 * percent / 100.0)
        }
    };

    Ok(SurchargeResult {
        language,
        amount_cents,
    })
}
