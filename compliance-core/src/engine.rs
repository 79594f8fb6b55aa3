//! Rule Engine
//!
//! Decision logic only - no type definitions.
//! Input: CommunicationRecord + EngineConfig
//! Output: Verdict

use super::config::EngineConfig;
use super::record::{CommunicationRecord, RecordError};
use super::rules::{remediation_for, RULES, RULES_VERSION, UNPARSEABLE_REMEDIATION};
use super::types::*;

// ============================================================================
// MAIN EVALUATION FUNCTION
// ============================================================================

/// Evaluate a record with the default configuration
pub fn evaluate(record: &CommunicationRecord) -> Verdict {
    evaluate_with_config(record, &EngineConfig::default())
}

/// Evaluate a record with a custom configuration
pub fn evaluate_with_config(record: &CommunicationRecord, config: &EngineConfig) -> Verdict {
    let violations: Vec<Violation> = RULES
        .iter()
        .filter_map(|rule| rule.check(record, config))
        .collect();

    if !violations.is_empty() {
        log::debug!(
            "Record {} triggered {} rule(s): {:?}",
            record.id.as_deref().unwrap_or("<anonymous>"),
            violations.len(),
            violations
                .iter()
                .map(|v| format!("{} ({})", v.rule_id, v.severity))
                .collect::<Vec<_>>()
        );
    }

    build_verdict(violations, config)
}

/// Verdict for a record that could not be read at all
pub fn unparseable_verdict(error: &RecordError, config: &EngineConfig) -> Verdict {
    log::warn!("Unparseable communication: {}", error);

    let violations = vec![Violation {
        regime: None,
        rule_id: "INPUT-001".to_string(),
        category: ViolationCategory::UnparseableInput,
        severity: Severity::Soft,
        message: format!("unparseable input: {}", error),
    }];

    Verdict {
        status: ComplianceStatus::RequiresReview,
        violations,
        recommendations: vec![UNPARSEABLE_REMEDIATION.to_string()],
        confidence_score: round2(config.confidence_floor),
        compliant: false,
        rules_version: RULES_VERSION.to_string(),
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

fn build_verdict(violations: Vec<Violation>, config: &EngineConfig) -> Verdict {
    let status = ComplianceStatus::from_violations(&violations);
    let recommendations = recommendations_for(&violations);
    let confidence_score = confidence_for(&violations, config);

    Verdict {
        status,
        compliant: status == ComplianceStatus::Compliant,
        violations,
        recommendations,
        confidence_score,
        rules_version: RULES_VERSION.to_string(),
    }
}

/// One remediation per distinct category, in first-seen order
pub fn recommendations_for(violations: &[Violation]) -> Vec<String> {
    let mut seen: Vec<ViolationCategory> = Vec::with_capacity(violations.len());
    for v in violations {
        if !seen.contains(&v.category) {
            seen.push(v.category);
        }
    }
    seen.into_iter()
        .map(|c| remediation_for(c).to_string())
        .collect()
}

/// 1.0 minus per-violation penalties, floored and rounded to two decimals
pub fn confidence_for(violations: &[Violation], config: &EngineConfig) -> f64 {
    let penalty: f64 = violations.iter().map(|v| config.penalty(v.severity)).sum();
    round2((1.0 - penalty).max(config.confidence_floor).clamp(0.0, 1.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================
