//! Constants used throughout the discharge core crate.
//!
//! Keyword tables, permission names and scoring weights live here so the classifier,
//! the derived-attribute rules and the workflow all read from one place.

// ============================================================================
// Permissions
// ============================================================================

pub const APPROVE_DISCHARGE: &str = "approve:discharge";
pub const REJECT_DISCHARGE: &str = "reject:discharge";
pub const VIEW_PATIENT_RECORDS: &str = "view:patient_records";
pub const UPDATE_DIAGNOSIS: &str = "update:diagnosis";
pub const UPDATE_TREATMENT_NOTES: &str = "update:treatment_notes";
pub const MARK_NURSING_TASK_COMPLETE: &str = "mark:nursing_task_complete";
pub const VERIFY_MEDS_BEFORE_DISCHARGE: &str = "verify:meds_before_discharge";
pub const EDIT_BILLING: &str = "edit:billing";
pub const GENERATE_BILL: &str = "generate:bill";
pub const MARK_BILL_PAID: &str = "mark:bill_paid";
pub const MANAGE_ROLES: &str = "manage:roles";
pub const VIEW_AUDIT_LOGS: &str = "view:audit_logs";
pub const CONFIGURE_INTEGRATIONS: &str = "configure:integrations";

/// Domain appended to the demo login subject.
pub const DEMO_EMAIL_DOMAIN: &str = "hospital.com";

// ============================================================================
// Derived attribute rules
// ============================================================================

pub const URGENCY_BASE: u8 = 5;
pub const COMPLEXITY_BASE: u8 = 3;
pub const SCORE_CAP: u8 = 10;

/// A patient at or above this score counts as high urgency / high complexity.
pub const HIGH_SCORE_THRESHOLD: u8 = 8;

/// Diagnosis terms that add the urgency bonus.
pub const URGENT_DIAGNOSIS_TERMS: [&str; 4] = ["cardiac", "surgery", "replacement", "monitoring"];

/// Diagnosis terms that each add one complexity point.
pub const COMPLEX_DIAGNOSIS_TERMS: [&str; 4] = ["surgery", "replacement", "monitoring", "management"];

pub const MAX_KEYWORDS: usize = 10;

/// Average stay above this many days raises the extended stay insight.
pub const EXTENDED_STAY_DAYS: f64 = 7.0;

// ============================================================================
// Intent classification
// ============================================================================

pub const ANALYTICS_PHRASES: [&str; 7] = [
    "how many", "count", "average", "metrics", "summary", "overview", "today",
];

pub const STATUS_WORDS: [&str; 5] = ["status", "ready", "pending", "delayed", "discharge"];

pub const WORKFLOW_WORDS: [&str; 6] = ["transport", "medication", "document", "room", "bed", "family"];

pub const HELP_PHRASES: [&str; 3] = ["help", "what can you do", "how to"];

pub const TIME_WORDS: [&str; 4] = ["today", "tomorrow", "now", "tonight"];

/// Canned responses only win the fallback when the match score is strictly above this.
pub const CANNED_MATCH_THRESHOLD: f64 = 0.3;

// ============================================================================
// Runtime defaults
// ============================================================================

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAIL_RELAY_URL: &str = "http://localhost:5000";
pub const DEFAULT_MAIL_RELAY_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CHAT_DELAY_MS: u64 = 1_200;
pub const DEFAULT_LOGIN_DELAY_MS: u64 = 500;
