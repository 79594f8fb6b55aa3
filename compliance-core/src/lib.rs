//! Compliance Engine
//!
//! Evaluates one debt-collection communication against the TCPA, FDCPA and
//! CFPB rule groups and produces a verdict. Pure and stateless: no I/O, no
//! shared mutable state, safe to call from any number of threads.
//!
//! ## Structure
//! - `types`: Core types (Verdict, Violation, ComplianceStatus, Severity)
//! - `record`: Input record and lenient JSON intake
//! - `config`: Engine configuration (calling window, keywords, penalties)
//! - `rules`: Declarative rule table
//! - `engine`: Evaluation and verdict aggregation
//! - `batch`: Parallel batch evaluation and summaries
//! - `recommendations`: Severity-ordered remediation
//!
//! ## Usage
//! ```ignore
//! use compliance_core::{evaluate, CommunicationRecord, ComplianceStatus};
//!
//! let verdict = evaluate(&record);
//! match verdict.status {
//!     ComplianceStatus::Compliant => send(),
//!     ComplianceStatus::RequiresReview => queue_for_review(),
//!     ComplianceStatus::NonCompliant => block(),
//! }
//! ```

pub mod types;
pub mod record;
pub mod config;
pub mod rules;
pub mod engine;
pub mod batch;
pub mod recommendations;


// Re-export main types for convenience
pub use types::{
    ComplianceStatus,
    Regime,
    Severity,
    Verdict,
    Violation,
    ViolationCategory,
};

pub use record::{CommunicationRecord, RecordError, TimeSent};

pub use config::{CallingWindow, EngineConfig};

pub use rules::{ComplianceRule, RULES, RULES_VERSION};

pub use engine::{evaluate, evaluate_with_config, unparseable_verdict};

pub use batch::{evaluate_batch, evaluate_value, expand_messages, summarize, BatchItem, ComplianceSummary};

pub use recommendations::{prioritize, PrioritizedRecommendations};
