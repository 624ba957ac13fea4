use std::sync::Arc;
use transfer_domain::{
    AdditionalItemRepository, BookingRepository, QuoteRepository, RouteRepository,
    RuleRepository, TariffRepository,
};
use transfer_lifecycle::{Notifier, PaymentOrchestrator};
use transfer_pricing::{DistanceProvider, PricingSettings};

#[derive(Clone)]
pub struct AppState {
    pub tariffs: Arc<dyn TariffRepository>,
    pub rules: Arc<dyn RuleRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub additional_items: Arc<dyn AdditionalItemRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub distance: Arc<dyn DistanceProvider>,
    pub payments: Arc<PaymentOrchestrator>,
    pub notifier: Arc<dyn Notifier>,
    pub pricing: PricingSettings,
    /// Depot the supplier drives from; start and end of the
    /// operational-radius distance.
    pub base_address: String,
}
