use std::net::SocketAddr;
use std::sync::Arc;
use transfer_api::{app, AppState};
use transfer_lifecycle::{LogNotifier, MockPaymentAdapter, PaymentOrchestrator};
use transfer_pricing::{DistanceResult, FixedDistanceProvider, PricingSettings};
use transfer_store::{
    Config, InMemoryAdditionalItemRepository, InMemoryBookingRepository, InMemoryQuoteRepository,
    InMemoryRouteRepository, InMemoryRuleRepository, InMemoryTariffRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "transfer_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting transfer engine on port {}", config.server.port);

    // Local wiring: in-memory stores, a mock gateway and a table-backed
    // distance provider. Production adapters slot in behind the same traits.
    let distance = FixedDistanceProvider::with_default(DistanceResult {
        distance_km: 30.0,
        duration_minutes: 45,
    });

    let state = AppState {
        tariffs: Arc::new(InMemoryTariffRepository::new()),
        rules: Arc::new(InMemoryRuleRepository::new()),
        routes: Arc::new(InMemoryRouteRepository::new()),
        additional_items: Arc::new(InMemoryAdditionalItemRepository::new()),
        bookings: Arc::new(InMemoryBookingRepository::new()),
        quotes: Arc::new(InMemoryQuoteRepository::new()),
        distance: Arc::new(distance),
        payments: Arc::new(PaymentOrchestrator::new(Arc::new(MockPaymentAdapter))),
        notifier: Arc::new(LogNotifier),
        pricing: PricingSettings {
            round_trip_discount_percent: config.pricing.round_trip_discount_percent,
            currency: config.pricing.currency.clone(),
        },
        base_address: config.pricing.base_address.clone(),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
