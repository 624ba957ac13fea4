use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    /// Applied to the return leg of round trips.
    #[serde(default = "default_round_trip_discount")]
    pub round_trip_discount_percent: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Depot address used for the supplier round-trip distance
    /// (base → origin → destination → base) in the radius check.
    pub base_address: String,
}

fn default_round_trip_discount() -> f64 {
    10.0
}

fn default_currency() -> String {
    "BRL".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TRANSFER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
