use serde::Deserialize;
use std::env;
use std::time::Duration;
use supply_shared::InventoryPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineSettings,
    pub thresholds: MonitorThresholds,
    pub inventory: InventoryPolicy,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Cadences and delays of the background work
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub monitoring_interval_secs: u64,
    pub forecast_refresh_interval_secs: u64,
    pub risk_assessment_interval_secs: u64,
    pub ack_delay_min_secs: u64,
    pub ack_delay_max_secs: u64,
    pub shipment_leg_interval_secs: u64,
    /// Fixed seed makes acknowledgment delays and accuracy nudges reproducible
    pub rng_seed: Option<u64>,
    pub event_bus_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            monitoring_interval_secs: 5 * 60,
            forecast_refresh_interval_secs: 24 * 60 * 60,
            risk_assessment_interval_secs: 7 * 24 * 60 * 60,
            ack_delay_min_secs: 60,
            ack_delay_max_secs: 300,
            shipment_leg_interval_secs: 60 * 60,
            rng_seed: None,
            event_bus_capacity: 1024,
        }
    }
}

impl EngineSettings {
    pub fn monitoring_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring_interval_secs)
    }

    pub fn forecast_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.forecast_refresh_interval_secs)
    }

    pub fn risk_assessment_interval(&self) -> Duration {
        Duration::from_secs(self.risk_assessment_interval_secs)
    }

    pub fn shipment_leg_interval(&self) -> Duration {
        Duration::from_secs(self.shipment_leg_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonitorThresholds {
    /// Scan raises `supplier_issue` below this on-time percentage
    pub on_time_delivery: f64,
    /// Scan raises `quality_problem` below this quality score
    pub quality_score: f64,
    /// Risk assessment adds an operational factor below this on-time percentage
    pub risk_on_time_delivery: f64,
    pub risk_quality_score: f64,
}

impl Default for MonitorThresholds {
    fn default() -> Self {
        Self {
            on_time_delivery: 85.0,
            quality_score: 7.0,
            risk_on_time_delivery: 90.0,
            risk_quality_score: 7.0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        tracing::debug!(run_mode = %run_mode, "Loading configuration");

        let s = config::Config::builder()
            // Every field has a default, so even the base file is optional
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SUPPLY__ENGINE__MONITORING_INTERVAL_SECS=60`
            .add_source(config::Environment::with_prefix("SUPPLY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cadences() {
        let config = Config::default();
        assert_eq!(config.engine.monitoring_interval(), Duration::from_secs(300));
        assert_eq!(config.engine.forecast_refresh_interval(), Duration::from_secs(86_400));
        assert_eq!(config.engine.risk_assessment_interval(), Duration::from_secs(604_800));
        assert_eq!(config.thresholds.on_time_delivery, 85.0);
        assert_eq!(config.inventory.lead_time_days, 14.0);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[engine]\nrng_seed = 42\n[server]\nport = 9090\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.engine.rng_seed, Some(42));
        assert_eq!(config.engine.shipment_leg_interval_secs, 3600);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.inventory.unit_cost, 25.50);
    }
}
