//! Server configuration from environment.

use gig_core::SchedulingRules;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    /// Emit logs as JSON lines instead of the human-readable format
    pub log_json: bool,
    pub rules: SchedulingRules,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = SchedulingRules::default();
        Self {
            server_port: env_or("GIG_PORT", 3000),
            database_path: env::var("GIG_DATABASE_PATH")
                .unwrap_or_else(|_| "data/gig.db".to_string()),
            database_max_connections: env_or("GIG_DATABASE_MAX_CONNECTIONS", 5),
            log_json: env_or("GIG_LOG_JSON", false),
            rules: SchedulingRules {
                walking_speed_kmh: env_or("GIG_WALKING_SPEED_KMH", defaults.walking_speed_kmh),
                campus_factor: env_or("GIG_CAMPUS_FACTOR", defaults.campus_factor),
                travel_buffer_minutes: env_or(
                    "GIG_TRAVEL_BUFFER_MINUTES",
                    defaults.travel_buffer_minutes,
                ),
                snapshot_window_minutes: env_or(
                    "GIG_SNAPSHOT_WINDOW_MINUTES",
                    defaults.snapshot_window_minutes,
                ),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
