//! # Discharge Core
//!
//! Core logic for the hospital discharge coordination assistant.
//!
//! This crate contains the pure domain operations:
//! - The patient roster and the attributes derived from it (urgency, complexity, barriers)
//! - Intent classification and report rendering for the chat assistant
//! - Roster analytics and dashboard insights
//! - Demo sessions, role permissions and the discharge request workflow with its audit trail
//!
//! **No API concerns**: HTTP servers, the mail relay and the command line live in `api-rest`,
//! `mail-relay` and `cli`.

pub mod analytics;
pub mod assistant;
pub mod audit;
pub mod canned;
pub mod config;
pub mod constants;
pub mod derived;
pub mod discharge;
pub mod error;
pub mod intent;
pub mod patient;
pub mod response;
pub mod session;
pub mod text_match;

pub use analytics::{Insight, RosterSummary};
pub use assistant::{Assistant, AssistantReply, ChatCommand, ConversationContext};
pub use audit::{AuditEvent, AuditOutcome};
pub use config::CoreConfig;
pub use derived::EnhancedPatient;
pub use discharge::{DischargeAction, DischargeRequest, DischargeWorkflow, RequestStatus};
pub use error::{DischargeError, DischargeResult};
pub use intent::{Classification, Entity, IntentKind};
pub use patient::{DischargeStatus, Patient, PatientRegistry};
pub use session::{Role, Session};
pub use text_match::{TextMatcher, TokenOverlapMatcher};
