//! Batch Evaluation
//!
//! Evaluates many raw JSON records in parallel. Output order always matches
//! input order, and a record that cannot be read only affects its own slot.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::config::EngineConfig;
use super::engine::{evaluate_with_config, unparseable_verdict};
use super::record::CommunicationRecord;
use super::types::{ComplianceStatus, Verdict};

/// Id reported for records that carry none
pub const UNKNOWN_ID: &str = "unknown";

// ============================================================================
// BATCH ITEM
// ============================================================================

/// One slot of a batch response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub communication_id: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Evaluate one raw JSON record, turning unreadable input into an error-marker verdict
pub fn evaluate_value(value: &Value, config: &EngineConfig) -> BatchItem {
    match CommunicationRecord::from_json(value) {
        Ok(record) => BatchItem {
            communication_id: record.id.clone().unwrap_or_else(|| UNKNOWN_ID.to_string()),
            verdict: evaluate_with_config(&record, config),
        },
        Err(err) => BatchItem {
            communication_id: raw_id(value),
            verdict: unparseable_verdict(&err, config),
        },
    }
}

/// Evaluate every record; result `i` belongs to input `i`
pub fn evaluate_batch(values: &[Value], config: &EngineConfig) -> Vec<BatchItem> {
    values
        .par_iter()
        .map(|value| evaluate_value(value, config))
        .collect()
}

fn raw_id(value: &Value) -> String {
    match value.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_ID.to_string(),
    }
}

// ============================================================================
// MESSAGE BATCHES
// ============================================================================

/// Expand a list of message texts sharing one context into full records.
///
/// Each message becomes the `content` of a copy of `context` and is given the
/// id `msg_<n>` (1-based). A non-object context contributes no fields.
pub fn expand_messages(messages: &[Value], context: &Value) -> Vec<Value> {
    let base: Map<String, Value> = context.as_object().cloned().unwrap_or_default();

    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let mut record = base.clone();
            record.insert("content".to_string(), message.clone());
            record.insert("id".to_string(), Value::String(format!("msg_{}", i + 1)));
            Value::Object(record)
        })
        .collect()
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Aggregate view over a batch of verdicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub total_communications: usize,
    pub compliant_count: usize,
    pub non_compliant_count: usize,
    pub requires_review_count: usize,
    /// Percentage of compliant verdicts, two decimals
    pub compliance_rate: f64,
    pub average_confidence: f64,
    /// Rule id → number of verdicts it fired in
    pub common_violations: BTreeMap<String, usize>,
}

pub fn summarize<'a, I>(verdicts: I) -> ComplianceSummary
where
    I: IntoIterator<Item = &'a Verdict>,
{
    let mut summary = ComplianceSummary {
        total_communications: 0,
        compliant_count: 0,
        non_compliant_count: 0,
        requires_review_count: 0,
        compliance_rate: 0.0,
        average_confidence: 0.0,
        common_violations: BTreeMap::new(),
    };
    let mut confidence_total = 0.0;

    for verdict in verdicts {
        summary.total_communications += 1;
        confidence_total += verdict.confidence_score;

        match verdict.status {
            ComplianceStatus::Compliant => summary.compliant_count += 1,
            ComplianceStatus::NonCompliant => summary.non_compliant_count += 1,
            ComplianceStatus::RequiresReview => summary.requires_review_count += 1,
        }

        for v in &verdict.violations {
            *summary.common_violations.entry(v.rule_id.clone()).or_insert(0) += 1;
        }
    }

    if summary.total_communications > 0 {
        let total = summary.total_communications as f64;
        summary.compliance_rate = (summary.compliant_count as f64 / total * 10_000.0).round() / 100.0;
        summary.average_confidence = (confidence_total / total * 100.0).round() / 100.0;
    }

    summary
}
