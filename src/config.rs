use std::env;

use chrono::{FixedOffset, NaiveTime};

use crate::engine::policy::DispatchPolicy;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub notification_queue_size: usize,
    pub event_buffer_size: usize,
    pub dispatch_radius_km: f64,
    pub dispatch_lead_days: u32,
    pub pickup_hour: u32,
    pub pickup_minute: u32,
    pub utc_offset_minutes: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") | Err(_) => LogFormat::Compact,
            Ok(other) => {
                return Err(AppError::Internal(format!(
                    "invalid LOG_FORMAT: {other}, expected compact or json"
                )));
            }
        };

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            notification_queue_size: parse_or_default("NOTIFICATION_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            dispatch_radius_km: parse_or_default("DISPATCH_RADIUS_KM", 4.0)?,
            dispatch_lead_days: parse_or_default("DISPATCH_LEAD_DAYS", 1)?,
            pickup_hour: parse_or_default("PICKUP_HOUR", 8)?,
            pickup_minute: parse_or_default("PICKUP_MINUTE", 0)?,
            utc_offset_minutes: parse_or_default("UTC_OFFSET_MINUTES", 7 * 60)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Channel capacities must be non-zero; tokio panics on a zero-sized channel.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.notification_queue_size == 0 {
            return Err(AppError::Internal(
                "NOTIFICATION_QUEUE_SIZE must be greater than 0".to_string(),
            ));
        }
        if self.event_buffer_size == 0 {
            return Err(AppError::Internal(
                "EVENT_BUFFER_SIZE must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dispatch_policy(&self) -> Result<DispatchPolicy, AppError> {
        let pickup_time = NaiveTime::from_hms_opt(self.pickup_hour, self.pickup_minute, 0)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "invalid pickup time {:02}:{:02}",
                    self.pickup_hour, self.pickup_minute
                ))
            })?;
        let utc_offset = FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::Internal(format!(
                "invalid UTC_OFFSET_MINUTES: {}",
                self.utc_offset_minutes
            ))
        })?;

        let policy = DispatchPolicy {
            radius_km: self.dispatch_radius_km,
            lead_days: self.dispatch_lead_days,
            pickup_time,
            utc_offset,
        };
        policy.validate().map_err(AppError::Internal)?;
        Ok(policy)
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

#[cfg(test)]
mod tests {
    use super::{Config, LogFormat};

    fn config() -> Config {
        Config {
            http_port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            notification_queue_size: 1024,
            event_buffer_size: 1024,
            dispatch_radius_km: 4.0,
            dispatch_lead_days: 1,
            pickup_hour: 8,
            pickup_minute: 0,
            utc_offset_minutes: 7 * 60,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = config();
        assert!(config.validate().is_ok());

        let policy = config.dispatch_policy().unwrap();
        assert_eq!(policy.radius_km, 4.0);
        assert_eq!(policy.utc_offset.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn zero_notification_queue_is_rejected() {
        let config = Config {
            notification_queue_size: 0,
            ..config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_event_buffer_is_rejected() {
        let config = Config {
            event_buffer_size: 0,
            ..config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn pickup_hour_past_midnight_is_rejected() {
        let config = Config {
            pickup_hour: 24,
            ..config()
        };
        assert!(config.dispatch_policy().is_err());
    }

    #[test]
    fn utc_offset_beyond_a_day_is_rejected() {
        let config = Config {
            utc_offset_minutes: 24 * 60,
            ..config()
        };
        assert!(config.dispatch_policy().is_err());
    }

    #[test]
    fn lead_time_beyond_limit_is_rejected() {
        let config = Config {
            dispatch_lead_days: 400,
            ..config()
        };
        assert!(config.dispatch_policy().is_err());
    }
}
