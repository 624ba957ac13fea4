use crate::{EngineError, EngineResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    OneWay,
    RoundTrip,
    Hourly,
}

/// One directional segment of a trip. For hourly service the destination
/// equals the origin and the distance is unknown up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripLeg {
    pub origin: String,
    pub destination: String,
    /// Set when the leg corresponds to a managed route; free-form addresses
    /// carry no route id and only match route-less pricing rules.
    pub route_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub distance_km: f64,
    pub duration_minutes: i64,
    /// Booked hours, hourly service only.
    pub hours: Option<u32>,
}

impl TripLeg {
    pub fn pickup_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// The full trip a customer is pricing: an outbound leg plus an optional
/// return leg for round trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub service: ServiceType,
    pub outbound: TripLeg,
    pub return_leg: Option<TripLeg>,
}

impl TripRequest {
    pub fn validate(&self) -> EngineResult<()> {
        if self.outbound.origin.trim().is_empty() {
            return Err(EngineError::Validation("origin is required".to_string()));
        }
        match self.service {
            ServiceType::OneWay | ServiceType::RoundTrip => {
                if self.outbound.destination.trim().is_empty() {
                    return Err(EngineError::Validation(
                        "destination is required".to_string(),
                    ));
                }
                if self.outbound.distance_km <= 0.0 {
                    return Err(EngineError::Validation(
                        "distance must be positive for distance-based service".to_string(),
                    ));
                }
            }
            ServiceType::Hourly => {
                match self.outbound.hours {
                    Some(h) if h >= 1 => {}
                    _ => {
                        return Err(EngineError::Validation(
                            "hourly service requires at least one hour".to_string(),
                        ))
                    }
                }
            }
        }
        match (self.service, &self.return_leg) {
            (ServiceType::RoundTrip, Some(ret)) => {
                if ret.pickup_at() < self.outbound.pickup_at() {
                    return Err(EngineError::Validation(
                        "return date/time must not be before the outbound pickup".to_string(),
                    ));
                }
            }
            (ServiceType::RoundTrip, None) => {
                return Err(EngineError::Validation(
                    "round trip requires a return leg".to_string(),
                ));
            }
            (_, Some(_)) => {
                return Err(EngineError::Validation(
                    "only round trips carry a return leg".to_string(),
                ));
            }
            (_, None) => {}
        }
        Ok(())
    }
}
