use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DistanceResult {
    pub distance_km: f64,
    pub duration_minutes: i64,
}

/// Mapping collaborator. The engine only needs pairwise lookups; callers
/// compose them for the supplier round-trip (base → origin → destination →
/// base) used by the operational-radius check.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn lookup(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DistanceResult, Box<dyn std::error::Error + Send + Sync>>;
}

/// Table-backed provider for tests and local runs. Lookups are symmetric;
/// unknown pairs fall back to a configurable default.
pub struct FixedDistanceProvider {
    table: HashMap<(String, String), DistanceResult>,
    default: Option<DistanceResult>,
}

impl FixedDistanceProvider {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            default: None,
        }
    }

    pub fn with_default(default: DistanceResult) -> Self {
        Self {
            table: HashMap::new(),
            default: Some(default),
        }
    }

    pub fn insert(&mut self, origin: &str, destination: &str, result: DistanceResult) {
        self.table
            .insert((origin.to_string(), destination.to_string()), result);
    }
}

impl Default for FixedDistanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DistanceProvider for FixedDistanceProvider {
    async fn lookup(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DistanceResult, Box<dyn std::error::Error + Send + Sync>> {
        let forward = (origin.to_string(), destination.to_string());
        let backward = (destination.to_string(), origin.to_string());
        self.table
            .get(&forward)
            .or_else(|| self.table.get(&backward))
            .copied()
            .or(self.default)
            .ok_or_else(|| format!("no distance known from '{}' to '{}'", origin, destination).into())
    }
}
