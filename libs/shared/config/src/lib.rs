use std::env;
use std::path::PathBuf;

use chrono::NaiveTime;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub wellness_morning_time: NaiveTime,
    pub wellness_evening_time: NaiveTime,
    pub vitals_time: NaiveTime,
    pub vitals_check_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            data_dir: env::var("CARE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("CARE_DATA_DIR not set, using ./care-data");
                    PathBuf::from("./care-data")
                }),
            wellness_morning_time: parse_time_var("WELLNESS_MORNING_TIME", "08:00"),
            wellness_evening_time: parse_time_var("WELLNESS_EVENING_TIME", "20:00"),
            vitals_time: parse_time_var("VITALS_TIME", "09:00"),
            vitals_check_enabled: env::var("VITALS_CHECK_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - data directory is empty");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.data_dir.as_os_str().is_empty()
    }

    /// Fixed configuration for tests: local data dir, default check times.
    pub fn for_tests() -> Self {
        Self {
            data_dir: PathBuf::from("./care-data-test"),
            wellness_morning_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            wellness_evening_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            vitals_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            vitals_check_enabled: true,
        }
    }
}

fn parse_time_var(name: &str, default: &str) -> NaiveTime {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M").unwrap_or_else(|_| {
        warn!("{} value {:?} is not HH:MM, using default {}", name, raw, default);
        NaiveTime::parse_from_str(default, "%H:%M").expect("default time is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_are_configured() {
        let config = AppConfig::for_tests();
        assert!(config.is_configured());
        assert!(config.vitals_check_enabled);
        assert_eq!(
            config.wellness_morning_time,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!(
            config.wellness_evening_time,
            NaiveTime::from_hms_opt(20, 0, 0).unwrap()
        );
    }
}
