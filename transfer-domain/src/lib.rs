pub mod booking;
pub mod catalog;
pub mod quote;
pub mod repository;
pub mod rules;
pub mod tariff;
pub mod trip;

pub use booking::{Booking, BookingStatus, LegBreakdown, PaymentStatus, RefundInfo};
pub use catalog::{AdditionalItem, Route};
pub use quote::{QuoteRequest, QuoteStatus};
pub use repository::{
    AdditionalItemRepository, BookingRepository, Mutation, QuoteRepository, RouteRepository,
    RuleRepository, TariffRepository,
};
pub use rules::{Adjustment, PricingRule};
pub use tariff::{DriverLanguage, HourlyPackage, LanguageSurcharge, SurchargeValue, VehicleTariff};
pub use trip::{ServiceType, TripLeg, TripRequest};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("driver language '{0}' is not offered by this vehicle")]
    UnsupportedLanguage(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("refund not allowed: {0}")]
    RefundNotAllowed(String),

    #[error("external service '{service}' failed: {message}")]
    ExternalService { service: String, message: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn external(service: &str, err: impl std::fmt::Display) -> Self {
        Self::ExternalService {
            service: service.to_string(),
            message: err.to_string(),
        }
    }
}
