//! Engine Configuration
//!
//! Tunables for rule evaluation.
//! Can be loaded from a config file or set at runtime.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::types::Severity;

// ============================================================================
// DEFAULTS
// ============================================================================

/// Confidence lost per severe violation
pub const SEVERE_PENALTY: f64 = 0.25;

/// Confidence lost per soft violation
pub const SOFT_PENALTY: f64 = 0.10;

/// Confidence never drops below this
pub const CONFIDENCE_FLOOR: f64 = 0.10;

/// Phrases that count as harassment when found anywhere in the content
pub const DEFAULT_HARASSMENT_KEYWORDS: &[&str] = &[
    "final notice",
    "last attempt",
    "respond immediately",
    "arrest",
    "jail",
    "police",
    "garnish",
    "seize your",
    "we will sue",
    "deadbeat",
    "you will regret",
    "ruin your credit",
];

// ============================================================================
// CALLING WINDOW
// ============================================================================

/// Local time-of-day window in which communications may be sent.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for CallingWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl CallingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub calling_window: CallingWindow,
    /// Matched case-insensitively as substrings of the content
    pub harassment_keywords: Vec<String>,
    pub severe_penalty: f64,
    pub soft_penalty: f64,
    pub confidence_floor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calling_window: CallingWindow::default(),
            harassment_keywords: DEFAULT_HARASSMENT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            severe_penalty: SEVERE_PENALTY,
            soft_penalty: SOFT_PENALTY,
            confidence_floor: CONFIDENCE_FLOOR,
        }
    }
}

impl EngineConfig {
    /// Strict mode - any violation costs more confidence
    pub fn strict() -> Self {
        Self {
            severe_penalty: 0.4,
            soft_penalty: 0.2,
            ..Default::default()
        }
    }

    /// Lenient mode - gentler penalties, no keyword scan
    pub fn lenient() -> Self {
        Self {
            harassment_keywords: vec![],
            severe_penalty: 0.15,
            soft_penalty: 0.05,
            ..Default::default()
        }
    }

    pub fn with_calling_window(mut self, window: CallingWindow) -> Self {
        self.calling_window = window;
        self
    }

    pub fn penalty(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Severe => self.severe_penalty,
            Severity::Soft => self.soft_penalty,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.severe_penalty, 0.25);
        assert_eq!(config.soft_penalty, 0.10);
        assert_eq!(config.confidence_floor, 0.10);
        assert!(config.harassment_keywords.iter().any(|k| k == "final notice"));
    }

    #[test]
    fn test_severe_outweighs_soft_in_presets() {
        for config in [EngineConfig::default(), EngineConfig::strict(), EngineConfig::lenient()] {
            assert!(config.penalty(Severity::Severe) > config.penalty(Severity::Soft));
        }
    }

    #[test]
    fn test_calling_window_bounds_inclusive() {
        let window = CallingWindow::default();
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert!(window.contains(at(8, 0)));
        assert!(window.contains(at(21, 0)));
        assert!(!window.contains(at(7, 59)));
        assert!(!window.contains(at(21, 1)));
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"soft_penalty": 0.2}"#).unwrap();
        assert_eq!(config.soft_penalty, 0.2);
        assert_eq!(config.calling_window, CallingWindow::default());
    }
}
