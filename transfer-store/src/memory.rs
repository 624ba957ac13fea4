//! In-memory repositories backing the engine. Each store keeps its rows in
//! a `RwLock<HashMap>`; `transition` applies the lifecycle mutation under
//! the write guard so concurrent guarded updates serialize.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use transfer_domain::{
    AdditionalItem, AdditionalItemRepository, Booking, BookingRepository, EngineError,
    EngineResult, Mutation, PricingRule, QuoteRepository, QuoteRequest, Route, RouteRepository,
    RuleRepository, TariffRepository, VehicleTariff,
};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryTariffRepository {
    tariffs: RwLock<HashMap<Uuid, VehicleTariff>>,
}

impl InMemoryTariffRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, tariffs: Vec<VehicleTariff>) {
        let mut guard = self.tariffs.write().await;
        for tariff in tariffs {
            guard.insert(tariff.id, tariff);
        }
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn list_active(&self) -> EngineResult<Vec<VehicleTariff>> {
        let guard = self.tariffs.read().await;
        let mut active: Vec<VehicleTariff> =
            guard.values().filter(|t| t.is_active).cloned().collect();
        active.sort_by_key(|t| (t.display_order, t.id));
        Ok(active)
    }

    async fn get(&self, id: Uuid) -> EngineResult<Option<VehicleTariff>> {
        Ok(self.tariffs.read().await.get(&id).cloned())
    }

    async fn upsert(&self, tariff: VehicleTariff) -> EngineResult<()> {
        tariff.validate()?;
        self.tariffs.write().await.insert(tariff.id, tariff);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRuleRepository {
    rules: RwLock<HashMap<Uuid, PricingRule>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, rules: Vec<PricingRule>) {
        let mut guard = self.rules.write().await;
        for rule in rules {
            guard.insert(rule.id, rule);
        }
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn list_active(&self) -> EngineResult<Vec<PricingRule>> {
        let guard = self.rules.read().await;
        Ok(guard.values().filter(|r| r.is_active).cloned().collect())
    }

    async fn upsert(&self, rule: PricingRule) -> EngineResult<()> {
        self.rules.write().await.insert(rule.id, rule);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> EngineResult<()> {
        match self.rules.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(EngineError::NotFound(format!("pricing rule {}", id))),
        }
    }
}

#[derive(Default)]
pub struct InMemoryRouteRepository {
    routes: RwLock<HashMap<Uuid, Route>>,
}

impl InMemoryRouteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, routes: Vec<Route>) {
        let mut guard = self.routes.write().await;
        for route in routes {
            guard.insert(route.id, route);
        }
    }
}

#[async_trait]
impl RouteRepository for InMemoryRouteRepository {
    async fn list_active(&self) -> EngineResult<Vec<Route>> {
        let guard = self.routes.read().await;
        Ok(guard.values().filter(|r| r.is_active).cloned().collect())
    }

    async fn find(&self, origin: &str, destination: &str) -> EngineResult<Option<Route>> {
        let guard = self.routes.read().await;
        Ok(guard
            .values()
            .find(|r| {
                r.is_active
                    && r.origin.eq_ignore_ascii_case(origin)
                    && r.destination.eq_ignore_ascii_case(destination)
            })
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryAdditionalItemRepository {
    items: RwLock<HashMap<Uuid, AdditionalItem>>,
}

impl InMemoryAdditionalItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, items: Vec<AdditionalItem>) {
        let mut guard = self.items.write().await;
        for item in items {
            guard.insert(item.id, item);
        }
    }
}

#[async_trait]
impl AdditionalItemRepository for InMemoryAdditionalItemRepository {
    async fn list_active(&self) -> EngineResult<Vec<AdditionalItem>> {
        let guard = self.items.read().await;
        Ok(guard.values().filter(|i| i.is_active).cloned().collect())
    }

    async fn get_many(&self, ids: &[Uuid]) -> EngineResult<Vec<AdditionalItem>> {
        let guard = self.items.read().await;
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            match guard.get(id) {
                Some(item) if item.is_active => found.push(item.clone()),
                Some(_) | None => {
                    return Err(EngineError::NotFound(format!("additional item {}", id)))
                }
            }
        }
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> EngineResult<()> {
        let mut guard = self.bookings.write().await;
        if guard.contains_key(&booking.id) {
            return Err(EngineError::Validation(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        if guard
            .values()
            .any(|b| b.booking_number == booking.booking_number)
        {
            return Err(EngineError::Validation(format!(
                "booking number {} already in use",
                booking.booking_number
            )));
        }
        guard.insert(booking.id, booking);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> EngineResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn find_by_intent(&self, intent_id: &str) -> EngineResult<Option<Booking>> {
        let guard = self.bookings.read().await;
        Ok(guard
            .values()
            .find(|b| b.payment_intent_id.as_deref() == Some(intent_id))
            .cloned())
    }

    async fn list(&self) -> EngineResult<Vec<Booking>> {
        let guard = self.bookings.read().await;
        let mut all: Vec<Booking> = guard.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn transition(&self, id: Uuid, mutation: &Mutation<Booking>) -> EngineResult<Booking> {
        let mut guard = self.bookings.write().await;
        let booking = guard
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("booking {}", id)))?;
        mutation(booking)?;
        booking.touch();
        Ok(booking.clone())
    }
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<HashMap<Uuid, QuoteRequest>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert(&self, quote: QuoteRequest) -> EngineResult<()> {
        let mut guard = self.quotes.write().await;
        if guard.contains_key(&quote.id) {
            return Err(EngineError::Validation(format!(
                "quote request {} already exists",
                quote.id
            )));
        }
        if guard.values().any(|q| q.quote_number == quote.quote_number) {
            return Err(EngineError::Validation(format!(
                "quote number {} already in use",
                quote.quote_number
            )));
        }
        guard.insert(quote.id, quote);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> EngineResult<Option<QuoteRequest>> {
        Ok(self.quotes.read().await.get(&id).cloned())
    }

    async fn find_by_intent(&self, intent_id: &str) -> EngineResult<Option<QuoteRequest>> {
        let guard = self.quotes.read().await;
        Ok(guard
            .values()
            .find(|q| q.payment_intent_id.as_deref() == Some(intent_id))
            .cloned())
    }

    async fn list(&self) -> EngineResult<Vec<QuoteRequest>> {
        let guard = self.quotes.read().await;
        let mut all: Vec<QuoteRequest> = guard.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn transition(
        &self,
        id: Uuid,
        mutation: &Mutation<QuoteRequest>,
    ) -> EngineResult<QuoteRequest> {
        let mut guard = self.quotes.write().await;
        let quote = guard
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("quote request {}", id)))?;
        mutation(quote)?;
        quote.touch();
        Ok(quote.clone())
    }
}
