//! Compliance Rules (Declarative)
//!
//! The rule table: regime → rule → detector + severity + remediation.
//! Adding a rule means adding a row to `RULES`; the engine loop never changes.

use super::config::EngineConfig;
use super::record::{CommunicationRecord, TimeSent};
use super::types::*;

/// Version tag of the rule table, reported on every verdict
pub const RULES_VERSION: &str = "v1.0";

// ============================================================================
// DETECTION
// ============================================================================

/// Outcome of running one detector against a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Clear,
    Hit,
    /// Hit with extra detail appended to the rule message
    HitWith(String),
}

impl Detection {
    fn from_bool(triggered: bool) -> Self {
        if triggered {
            Detection::Hit
        } else {
            Detection::Clear
        }
    }
}

pub type Detector = fn(&CommunicationRecord, &EngineConfig) -> Detection;

// ============================================================================
// RULE TABLE
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ComplianceRule {
    pub regime: Regime,
    pub id: &'static str,
    pub category: ViolationCategory,
    pub severity: Severity,
    pub message: &'static str,
    pub remediation: &'static str,
    pub detect: Detector,
}

impl ComplianceRule {
    /// Run the detector; `Some` when the rule fires
    pub fn check(&self, record: &CommunicationRecord, config: &EngineConfig) -> Option<Violation> {
        let message = match (self.detect)(record, config) {
            Detection::Clear => return None,
            Detection::Hit => self.message.to_string(),
            Detection::HitWith(detail) => format!("{} ({})", self.message, detail),
        };

        Some(Violation {
            regime: Some(self.regime),
            rule_id: self.id.to_string(),
            category: self.category,
            severity: self.severity,
            message,
        })
    }
}

/// All rules, in evaluation order: TCPA, then FDCPA, then CFPB
pub static RULES: &[ComplianceRule] = &[
    // ---- Regime A: consent and timing ----
    ComplianceRule {
        regime: Regime::Tcpa,
        id: "TCPA-001",
        category: ViolationCategory::MissingConsent,
        severity: Severity::Severe,
        message: "Recipient consent was not obtained",
        remediation: "Obtain documented consent before communication",
        detect: |r, _| Detection::from_bool(!r.consent_obtained),
    },
    ComplianceRule {
        regime: Regime::Tcpa,
        id: "TCPA-002",
        category: ViolationCategory::MissingOptOut,
        severity: Severity::Soft,
        message: "No opt-out mechanism offered",
        remediation: "Include clear opt-out instructions such as 'Reply STOP to opt out'",
        detect: |r, _| Detection::from_bool(!r.opt_out_available),
    },
    ComplianceRule {
        regime: Regime::Tcpa,
        id: "TCPA-003",
        category: ViolationCategory::OutsideCallingHours,
        severity: Severity::Soft,
        message: "Sent outside permitted calling hours",
        remediation: "Schedule communications within the permitted local calling window",
        detect: detect_calling_hours,
    },
    // ---- Regime B: debt-collection conduct ----
    ComplianceRule {
        regime: Regime::Fdcpa,
        id: "FDCPA-001",
        category: ViolationCategory::MissingValidationNotice,
        severity: Severity::Soft,
        message: "Debt validation notice was not provided",
        remediation: "Send a debt validation notice with the amount owed and the creditor's name",
        detect: |r, _| Detection::from_bool(!r.debt_validation_notice_given),
    },
    ComplianceRule {
        regime: Regime::Fdcpa,
        id: "FDCPA-002",
        category: ViolationCategory::Harassment,
        severity: Severity::Severe,
        message: "Harassing or abusive conduct",
        remediation: "Remove threatening, abusive, or harassing language from the message",
        detect: detect_harassment,
    },
    ComplianceRule {
        regime: Regime::Fdcpa,
        id: "FDCPA-003",
        category: ViolationCategory::ThirdPartyDisclosure,
        severity: Severity::Severe,
        message: "Debt information disclosed to an unauthorized third party",
        remediation: "Limit debt discussions to the consumer or their authorized representative",
        detect: |r, _| Detection::from_bool(r.third_party_disclosure),
    },
    // ---- Regime C: consumer protection ----
    ComplianceRule {
        regime: Regime::Cfpb,
        id: "CFPB-001",
        category: ViolationCategory::MissingConsumerProtection,
        severity: Severity::Soft,
        message: "Required consumer protection measures are missing",
        remediation: "Add consumer protection disclosures and dispute rights information",
        detect: |r, _| Detection::from_bool(!r.consumer_protection_measures_present),
    },
    ComplianceRule {
        regime: Regime::Cfpb,
        id: "CFPB-002",
        category: ViolationCategory::UnfairPractices,
        severity: Severity::Severe,
        message: "Unfair, deceptive, or abusive practice",
        remediation: "Eliminate unfair, deceptive, or abusive practices from the collection process",
        detect: |r, _| Detection::from_bool(r.unfair_practices_present),
    },
];

/// Remediation for records that could not be read
pub const UNPARSEABLE_REMEDIATION: &str =
    "Resubmit the communication as a JSON object with a text `content` field";

/// Look up the remediation string for a category
pub fn remediation_for(category: ViolationCategory) -> &'static str {
    RULES
        .iter()
        .find(|rule| rule.category == category)
        .map(|rule| rule.remediation)
        .unwrap_or(UNPARSEABLE_REMEDIATION)
}

/// Rules belonging to one regime, in evaluation order
pub fn rules_for(regime: Regime) -> impl Iterator<Item = &'static ComplianceRule> {
    RULES.iter().filter(move |rule| rule.regime == regime)
}

// ============================================================================
// DETECTORS
// ============================================================================

fn detect_calling_hours(record: &CommunicationRecord, config: &EngineConfig) -> Detection {
    let window = &config.calling_window;
    match &record.time_sent {
        TimeSent::Known(time) if !window.contains(*time) => Detection::HitWith(format!(
            "sent {}, allowed {}-{}",
            time.format("%H:%M"),
            window.start.format("%H:%M"),
            window.end.format("%H:%M"),
        )),
        // Present but unparseable: cannot prove it was inside the window
        TimeSent::Unreadable(raw) => Detection::HitWith(format!("unreadable time \"{}\"", raw)),
        TimeSent::Known(_) | TimeSent::Absent => Detection::Clear,
    }
}

fn detect_harassment(record: &CommunicationRecord, config: &EngineConfig) -> Detection {
    let matched = match_keywords(&record.content, &config.harassment_keywords);

    if !matched.is_empty() {
        log::debug!("Harassment keywords matched: {:?}", matched);
        return Detection::HitWith(format!("matched: {}", matched.join(", ")));
    }

    Detection::from_bool(record.harassment_indicators_present)
}

/// Case-insensitive substring scan; returns matched keywords in list order
pub fn match_keywords<'a>(content: &str, keywords: &'a [String]) -> Vec<&'a str> {
    if content.is_empty() {
        return vec![];
    }
    let haystack = content.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
        .map(|k| k.as_str())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_ids_and_categories_unique() {
        let ids: HashSet<_> = RULES.iter().map(|r| r.id).collect();
        let categories: HashSet<_> = RULES.iter().map(|r| r.category).collect();
        assert_eq!(ids.len(), RULES.len());
        assert_eq!(categories.len(), RULES.len());
    }

    #[test]
    fn test_table_is_in_regime_order() {
        let regimes: Vec<_> = RULES.iter().map(|r| r.regime).collect();
        let mut sorted = regimes.clone();
        sorted.sort();
        assert_eq!(regimes, sorted);
        assert_eq!(rules_for(Regime::Tcpa).count(), 3);
        assert_eq!(rules_for(Regime::Fdcpa).count(), 3);
        assert_eq!(rules_for(Regime::Cfpb).count(), 2);
    }

    #[test]
    fn test_severe_subset() {
        let severe: HashSet<_> = RULES
            .iter()
            .filter(|r| r.severity.is_severe())
            .map(|r| r.category)
            .collect();
        assert!(severe.contains(&ViolationCategory::MissingConsent));
        assert!(severe.contains(&ViolationCategory::Harassment));
        assert!(severe.contains(&ViolationCategory::UnfairPractices));
        assert!(!severe.contains(&ViolationCategory::MissingOptOut));
        assert!(!severe.contains(&ViolationCategory::OutsideCallingHours));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let keywords = vec!["final notice".to_string(), "arrest".to_string()];
        assert_eq!(
            match_keywords("This is your FINAL NOTICE before ARREST", &keywords),
            vec!["final notice", "arrest"]
        );
        assert!(match_keywords("Please call us back.", &keywords).is_empty());
        assert!(match_keywords("", &keywords).is_empty());
    }

    #[test]
    fn test_harassment_rule_reports_matches() {
        let config = EngineConfig::default();
        let record = CommunicationRecord::fully_compliant("Pay now or the police will come");
        let rule = RULES.iter().find(|r| r.id == "FDCPA-002").unwrap();
        let violation = rule.check(&record, &config).unwrap();
        assert!(violation.message.contains("police"));
        assert_eq!(violation.severity, Severity::Severe);
    }

    #[test]
    fn test_remediation_lookup() {
        assert_eq!(
            remediation_for(ViolationCategory::MissingConsent),
            "Obtain documented consent before communication"
        );
        assert_eq!(
            remediation_for(ViolationCategory::UnparseableInput),
            UNPARSEABLE_REMEDIATION
        );
    }
}
