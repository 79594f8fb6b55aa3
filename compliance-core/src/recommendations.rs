//! Prioritized remediation advice for a single verdict

use serde::{Deserialize, Serialize};

use super::rules::remediation_for;
use super::types::{Severity, Verdict};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedRecommendations {
    /// Remediation for severe violations; these block approval
    pub critical_fixes: Vec<String>,
    /// Remediation for soft violations
    pub suggested_improvements: Vec<String>,
}

impl PrioritizedRecommendations {
    pub fn is_empty(&self) -> bool {
        self.critical_fixes.is_empty() && self.suggested_improvements.is_empty()
    }
}

/// Split a verdict's remediation by the severity of the violation that caused it
pub fn prioritize(verdict: &Verdict) -> PrioritizedRecommendations {
    let mut out = PrioritizedRecommendations::default();

    for violation in &verdict.violations {
        let text = remediation_for(violation.category).to_string();
        let bucket = match violation.severity {
            Severity::Severe => &mut out.critical_fixes,
            Severity::Soft => &mut out.suggested_improvements,
        };
        if !bucket.contains(&text) {
            bucket.push(text);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;
    use crate::record::CommunicationRecord;

    #[test]
    fn test_split_by_severity() {
        let mut record = CommunicationRecord::fully_compliant("hi");
        record.consent_obtained = false;
        record.opt_out_available = false;

        let prioritized = prioritize(&evaluate(&record));
        assert_eq!(
            prioritized.critical_fixes,
            vec!["Obtain documented consent before communication".to_string()]
        );
        assert_eq!(prioritized.suggested_improvements.len(), 1);
        assert!(prioritized.suggested_improvements[0].contains("STOP"));
    }

    #[test]
    fn test_compliant_has_nothing_to_fix() {
        let verdict = evaluate(&CommunicationRecord::fully_compliant("hi"));
        assert!(prioritize(&verdict).is_empty());
    }
}
