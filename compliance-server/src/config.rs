//! Configuration module

use std::env;

use chrono::NaiveTime;
use compliance_core::{CallingWindow, EngineConfig};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Static admin credential pair; auth is enabled only when both are set
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,

    /// JWT secret key
    pub jwt_secret: String,

    /// JWT expiration in hours
    pub jwt_expiration_hours: u64,

    /// Permitted local sending window
    pub calling_window: CallingWindow,

    /// Penalty and keyword preset for the engine
    pub engine_preset: EnginePreset,

    /// `json` for structured logs, anything else for human-readable output
    pub log_format: String,

    /// Problems found while loading; logged once logging is up
    pub warnings: Vec<String>,
}

/// Named engine settings selectable through `ENGINE_PRESET`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnginePreset {
    #[default]
    Standard,
    Strict,
    Lenient,
}

impl EnginePreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" | "default" => Some(EnginePreset::Standard),
            "strict" => Some(EnginePreset::Strict),
            "lenient" => Some(EnginePreset::Lenient),
            _ => None,
        }
    }

    fn engine_config(self) -> EngineConfig {
        match self {
            EnginePreset::Standard => EngineConfig::default(),
            EnginePreset::Strict => EngineConfig::strict(),
            EnginePreset::Lenient => EngineConfig::lenient(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5002,
            environment: "development".to_string(),
            admin_user: None,
            admin_password: None,
            jwt_secret: "compliance-dev-secret-change-in-production".to_string(),
            jwt_expiration_hours: 24,
            calling_window: CallingWindow::default(),
            engine_preset: EnginePreset::default(),
            log_format: "pretty".to_string(),
            warnings: vec![],
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut warnings = vec![];

        let window = CallingWindow::new(
            time_var("CALLING_WINDOW_START", defaults.calling_window.start, &mut warnings),
            time_var("CALLING_WINDOW_END", defaults.calling_window.end, &mut warnings),
        );
        let calling_window = if window.start <= window.end {
            window
        } else {
            warnings.push(format!(
                "Calling window {} - {} is inverted, using default",
                window.start, window.end
            ));
            defaults.calling_window
        };

        let engine_preset = match env::var("ENGINE_PRESET") {
            Ok(raw) => EnginePreset::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "Unknown ENGINE_PRESET='{}', expected standard, strict or lenient; using standard",
                    raw
                ));
                defaults.engine_preset
            }),
            Err(_) => defaults.engine_preset,
        };

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),

            admin_user: non_empty_var("ADMIN_USER"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),

            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or(defaults.jwt_secret),

            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.jwt_expiration_hours),

            calling_window,
            engine_preset,

            log_format: env::var("LOG_FORMAT")
                .unwrap_or(defaults.log_format),

            warnings,
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Auth guards the compliance routes only when a full credential pair is configured
    pub fn auth_enabled(&self) -> bool {
        self.admin_user.is_some() && self.admin_password.is_some()
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        self.engine_preset
            .engine_config()
            .with_calling_window(self.calling_window)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn time_var(key: &str, default: NaiveTime, warnings: &mut Vec<String>) -> NaiveTime {
    match env::var(key) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M").unwrap_or_else(|_| {
            warnings.push(format!(
                "Invalid {}='{}', expected HH:MM; using {}",
                key, raw, default.format("%H:%M")
            ));
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_requires_both_credentials() {
        let mut config = Config::default();
        assert!(!config.auth_enabled());

        config.admin_user = Some("admin".to_string());
        assert!(!config.auth_enabled());

        config.admin_password = Some("secret".to_string());
        assert!(config.auth_enabled());
    }

    #[test]
    fn test_engine_config_uses_window() {
        let mut config = Config::default();
        config.calling_window = CallingWindow::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        );
        assert_eq!(config.engine_config().calling_window, config.calling_window);
    }

    #[test]
    fn test_engine_preset_selects_penalties() {
        let mut config = Config::default();
        let standard = config.engine_config();

        config.engine_preset = EnginePreset::Strict;
        let strict = config.engine_config();
        assert!(strict.severe_penalty > standard.severe_penalty);
        assert_eq!(strict.calling_window, config.calling_window);

        config.engine_preset = EnginePreset::Lenient;
        let lenient = config.engine_config();
        assert!(lenient.harassment_keywords.is_empty());
        assert!(lenient.soft_penalty < standard.soft_penalty);
    }

    #[test]
    fn test_engine_preset_parse() {
        assert_eq!(EnginePreset::parse("Strict"), Some(EnginePreset::Strict));
        assert_eq!(EnginePreset::parse(" lenient "), Some(EnginePreset::Lenient));
        assert_eq!(EnginePreset::parse("default"), Some(EnginePreset::Standard));
        assert_eq!(EnginePreset::parse("paranoid"), None);
    }

    #[test]
    fn test_log_format() {
        let mut config = Config::default();
        assert!(!config.json_logs());
        config.log_format = "JSON".to_string();
        assert!(config.json_logs());
    }
}
