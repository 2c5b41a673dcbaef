use std::env;
use std::time::Duration;

use crate::engine::scoring::ScoringSettings;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub scoring_concurrency: usize,
    pub scoring_deadline_ms: u64,
    pub sla_comfort_minutes: f64,
    pub route_scale_km: f64,
    pub seed_file: Option<String>,
    /// JSON address table for the static geocoder; geocoding is off when unset.
    pub geocode_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            scoring_concurrency: parse_or_default("SCORING_CONCURRENCY", 8)?,
            scoring_deadline_ms: parse_or_default("SCORING_DEADLINE_MS", 2_000)?,
            sla_comfort_minutes: parse_or_default("SLA_COMFORT_MINUTES", 120.0)?,
            route_scale_km: parse_or_default("ROUTE_SCALE_KM", 10.0)?,
            seed_file: env::var("SEED_FILE").ok().filter(|path| !path.trim().is_empty()),
            geocode_file: env::var("GEOCODE_FILE")
                .ok()
                .filter(|path| !path.trim().is_empty()),
        };

        if config.scoring_concurrency == 0 {
            return Err(AppError::Internal(
                "invalid SCORING_CONCURRENCY: must be > 0".to_string(),
            ));
        }
        if config.event_buffer_size == 0 {
            return Err(AppError::Internal(
                "invalid EVENT_BUFFER_SIZE: must be > 0".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn scoring_settings(&self) -> ScoringSettings {
        ScoringSettings {
            concurrency: self.scoring_concurrency,
            default_deadline: Duration::from_millis(self.scoring_deadline_ms),
            sla_comfort_minutes: self.sla_comfort_minutes,
            route_scale_km: self.route_scale_km,
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
