use crate::booking::Booking;
use crate::catalog::{AdditionalItem, Route};
use crate::quote::QuoteRequest;
use crate::rules::PricingRule;
use crate::tariff::VehicleTariff;
use crate::EngineResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Guard-validated mutation applied atomically by the store. The closure
/// runs under the store's write lock, so guards that read current state
/// (refund, resend-link) cannot race each other.
pub type Mutation<T> = dyn Fn(&mut T) -> EngineResult<()> + Send + Sync;

#[async_trait]
pub trait TariffRepository: Send + Sync {
    async fn list_active(&self) -> EngineResult<Vec<VehicleTariff>>;
    async fn get(&self, id: Uuid) -> EngineResult<Option<VehicleTariff>>;
    async fn upsert(&self, tariff: VehicleTariff) -> EngineResult<()>;
}

#[async_trait]
pub trait RuleRepository: Send + Sync {
    async fn list_active(&self) -> EngineResult<Vec<PricingRule>>;
    async fn upsert(&self, rule: PricingRule) -> EngineResult<()>;
    async fn delete(&self, id: Uuid) -> EngineResult<()>;
}

#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn list_active(&self) -> EngineResult<Vec<Route>>;
    async fn find(&self, origin: &str, destination: &str) -> EngineResult<Option<Route>>;
}

#[async_trait]
pub trait AdditionalItemRepository: Send + Sync {
    async fn list_active(&self) -> EngineResult<Vec<AdditionalItem>>;
    async fn get_many(&self, ids: &[Uuid]) -> EngineResult<Vec<AdditionalItem>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: Booking) -> EngineResult<()>;
    async fn get(&self, id: Uuid) -> EngineResult<Option<Booking>>;
    async fn find_by_intent(&self, intent_id: &str) -> EngineResult<Option<Booking>>;
    async fn list(&self) -> EngineResult<Vec<Booking>>;
    /// Apply a lifecycle mutation atomically and return the updated booking.
    async fn transition(&self, id: Uuid, mutation: &Mutation<Booking>) -> EngineResult<Booking>;
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn insert(&self, quote: QuoteRequest) -> EngineResult<()>;
    async fn get(&self, id: Uuid) -> EngineResult<Option<QuoteRequest>>;
    async fn find_by_intent(&self, intent_id: &str) -> EngineResult<Option<QuoteRequest>>;
    async fn list(&self) -> EngineResult<Vec<QuoteRequest>>;
    async fn transition(&self, id: Uuid, mutation: &Mutation<QuoteRequest>)
        -> EngineResult<QuoteRequest>;
}
