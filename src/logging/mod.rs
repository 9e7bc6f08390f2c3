// Audit logging for truth-guard decisions
//
// Records every corrected/forwarded decision to JSONL so misinformation
// hits can be reviewed later without storing prompt text.

pub mod audit_logger;

pub use audit_logger::{hash_prompt, read_entries, AuditEntry, AuditLogger, DecisionKind};
