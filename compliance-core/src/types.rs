//! Compliance Types
//!
//! Core types for compliance verdicts.
//! No evaluation logic here - data structures only.

use serde::{Deserialize, Serialize};

// ============================================================================
// REGIMES
// ============================================================================

/// Regulatory rule group a violation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    /// Consent and timing (Telephone Consumer Protection Act)
    Tcpa,
    /// Debt-collection conduct (Fair Debt Collection Practices Act)
    Fdcpa,
    /// Consumer protection (CFPB guidance)
    Cfpb,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Tcpa => "TCPA",
            Regime::Fdcpa => "FDCPA",
            Regime::Cfpb => "CFPB",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

/// How much a violation weighs on the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Alone, only forces `requires_review`
    Soft,
    /// Alone, forces `non_compliant`
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Soft => "soft",
            Severity::Severe => "severe",
        }
    }

    pub fn is_severe(&self) -> bool {
        matches!(self, Severity::Severe)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Violation category. Each category maps to exactly one remediation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    MissingConsent,
    MissingOptOut,
    OutsideCallingHours,
    MissingValidationNotice,
    Harassment,
    ThirdPartyDisclosure,
    MissingConsumerProtection,
    UnfairPractices,
    /// Synthetic category for records that could not be read at all
    UnparseableInput,
}

impl ViolationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCategory::MissingConsent => "missing_consent",
            ViolationCategory::MissingOptOut => "missing_opt_out",
            ViolationCategory::OutsideCallingHours => "outside_calling_hours",
            ViolationCategory::MissingValidationNotice => "missing_validation_notice",
            ViolationCategory::Harassment => "harassment",
            ViolationCategory::ThirdPartyDisclosure => "third_party_disclosure",
            ViolationCategory::MissingConsumerProtection => "missing_consumer_protection",
            ViolationCategory::UnfairPractices => "unfair_practices",
            ViolationCategory::UnparseableInput => "unparseable_input",
        }
    }
}

// ============================================================================
// VIOLATION
// ============================================================================

/// A single triggered rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// `None` only for the synthetic unparseable-input violation
    pub regime: Option<Regime>,
    pub rule_id: String,
    pub category: ViolationCategory,
    pub severity: Severity,
    pub message: String,
}

// ============================================================================
// STATUS
// ============================================================================

/// Overall compliance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    RequiresReview,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::NonCompliant => "non_compliant",
            ComplianceStatus::RequiresReview => "requires_review",
        }
    }

    /// Derive the status from an ordered violation list
    pub fn from_violations(violations: &[Violation]) -> Self {
        if violations.is_empty() {
            ComplianceStatus::Compliant
        } else if violations.iter().any(|v| v.severity.is_severe()) {
            ComplianceStatus::NonCompliant
        } else {
            ComplianceStatus::RequiresReview
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Complete result of evaluating one communication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub status: ComplianceStatus,
    pub violations: Vec<Violation>,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
    pub compliant: bool,
    pub rules_version: String,
}

impl Verdict {
    pub fn has_severe_violations(&self) -> bool {
        self.violations.iter().any(|v| v.severity.is_severe())
    }

    pub fn violations_in(&self, regime: Regime) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.regime == Some(regime))
            .collect()
    }
}
