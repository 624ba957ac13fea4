use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Managed route between two frequent locations. Pricing rules may be
/// scoped to a route through `PricingRule::route_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub is_active: bool,
}

/// Optional extra sold alongside a transfer (child seat, extra stop, ...).
/// The selected total is snapshotted into the booking at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub is_active: bool,
}
