use serde::Deserialize;
use std::env;
use wayfarer_catalog::PricingConfig;
use wayfarer_trip::BookingRules;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    pub currency: String,
    pub tax_rate: f64,
    pub booking_fee_cents: i64,
    pub max_party_size: u32,
    pub max_trip_nights: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventsConfig {
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { channel_capacity: 256 }
    }
}

impl BusinessRules {
    pub fn pricing(&self) -> PricingConfig {
        PricingConfig {
            currency: self.currency.clone(),
            tax_rate: self.tax_rate,
            booking_fee_cents: self.booking_fee_cents,
        }
    }

    pub fn booking_rules(&self) -> BookingRules {
        BookingRules {
            max_party_size: self.max_party_size,
            max_trip_nights: self.max_trip_nights,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `WAYFARER__SERVER__PORT=9000`
            .add_source(
                config::Environment::with_prefix("WAYFARER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
