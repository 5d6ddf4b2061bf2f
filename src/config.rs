use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_MAX_RANGE_DAYS, DEFAULT_PAGE_SIZE, DEFAULT_SUMMARY_WINDOW_MONTHS,
    DEFAULT_TREND_WINDOW_DAYS, MAX_PAGE_SIZE,
};

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub jwt_secret: String,
    pub cors_origin: String,
    pub stats: StatsConfig,
    pub pagination: PaginationConfig,
}

/// Defaults and guards for the statistics endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    /// Summary / brand breakdown look back this many calendar months when no start is given.
    pub summary_window_months: u32,
    /// Trends look back this many days when no start is given.
    pub trend_window_days: u32,
    /// Longest accepted trends range, both ends included. Summary and brands are unbounded.
    pub max_range_days: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            summary_window_months: DEFAULT_SUMMARY_WINDOW_MONTHS,
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("sled_path", &self.sled_path)
            .field("jwt_secret", &"***REDACTED***")
            .field("cors_origin", &self.cors_origin)
            .field("stats", &self.stats)
            .field("pagination", &self.pagination)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        let pagination_default = PaginationConfig::default();
        let max_size = env_or_parse("PAGINATION_MAX_SIZE", pagination_default.max_size).max(1);
        let default_size = env_or_parse("PAGINATION_DEFAULT_SIZE", pagination_default.default_size)
            .clamp(1, max_size);

        let stats_default = StatsConfig::default();

        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 8080_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/teatrack.sled"),
            jwt_secret: env_or(
                "JWT_SECRET",
                "change_me_to_random_64_chars_change_me_to_random_64_chars",
            ),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            stats: StatsConfig {
                summary_window_months: env_or_parse(
                    "STATS_SUMMARY_WINDOW_MONTHS",
                    stats_default.summary_window_months,
                ),
                trend_window_days: env_or_parse(
                    "STATS_TREND_WINDOW_DAYS",
                    stats_default.trend_window_days,
                ),
                max_range_days: env_or_parse("STATS_MAX_RANGE_DAYS", stats_default.max_range_days)
                    .max(1),
            },
            pagination: PaginationConfig {
                default_size,
                max_size,
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
