//! The discharge assistant.
//!
//! [`Assistant`] is immutable once built. Anything that has to survive between turns lives in a
//! [`ConversationContext`] owned by the caller, so concurrent conversations never share state.

use crate::derived::EnhancedPatient;
use crate::intent::{classify, Classification, Entity, IntentKind};
use crate::patient::PatientRegistry;
use crate::response::ResponseGenerator;
use crate::text_match::{TextMatcher, TokenOverlapMatcher};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Reply shown when an email command names nobody.
pub const MISSING_STAFF_NAME_MESSAGE: &str = "❌ Please specify the staff name to send the email.";

/// What the previous turn was about.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationContext {
    pub last_intent: Option<IntentKind>,
    /// Entities from the most recent turn that had any.
    pub last_entities: Vec<Entity>,
}

impl ConversationContext {
    fn record(&mut self, classification: &Classification) {
        if !classification.entities.is_empty() {
            self.last_entities = classification.entities.clone();
        }
        self.last_intent = Some(classification.intent);
    }
}

/// One answered utterance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssistantReply {
    pub intent: IntentKind,
    pub confidence: f64,
    pub entities: Vec<Entity>,
    pub text: String,
}

pub struct Assistant {
    patients: Vec<EnhancedPatient>,
    matcher: Box<dyn TextMatcher>,
}

impl Assistant {
    /// Builds an assistant over the registry using the token-overlap matcher.
    pub fn new(registry: &PatientRegistry) -> Self {
        Self::with_matcher(registry, Box::new(TokenOverlapMatcher))
    }

    pub fn with_matcher(registry: &PatientRegistry, matcher: Box<dyn TextMatcher>) -> Self {
        Self {
            patients: EnhancedPatient::from_registry(registry),
            matcher,
        }
    }

    /// Enhanced roster in registry order.
    pub fn patients(&self) -> &[EnhancedPatient] {
        &self.patients
    }

    pub fn patient(&self, id: &str) -> Option<&EnhancedPatient> {
        self.patients.iter().find(|p| p.id.as_str() == id)
    }

    pub fn classify(&self, input: &str) -> Classification {
        classify(input, &self.patients)
    }

    pub fn responder(&self, now: DateTime<Utc>) -> ResponseGenerator<'_> {
        ResponseGenerator::new(&self.patients, self.matcher.as_ref(), now)
    }

    /// Classifies and answers one utterance, then records it in `context`.
    pub fn process(
        &self,
        context: &mut ConversationContext,
        input: &str,
        now: DateTime<Utc>,
    ) -> AssistantReply {
        let classification = self.classify(input);
        context.record(&classification);
        let text = self.responder(now).render(&classification, input);

        tracing::debug!(
            intent = classification.intent.as_str(),
            entities = classification.entities.len(),
            "answered chat query"
        );

        AssistantReply {
            intent: classification.intent,
            confidence: classification.confidence,
            entities: classification.entities,
            text,
        }
    }
}

// ============================================================================
// Chat commands
// ============================================================================

/// How a chat line should be handled before it reaches the assistant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatCommand {
    /// Ask the mail relay to send today's discharge summary to a staff member.
    SendEmail { staff_name: String },
    /// An email command that names nobody.
    MissingStaffName,
    /// Anything else goes to the assistant.
    Query,
}

static STAFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)to ([\w\s]+)").expect("staff pattern is valid"));

impl ChatCommand {
    pub fn parse(input: &str) -> Self {
        if !input.to_lowercase().contains("email") {
            return Self::Query;
        }

        let staff_name = STAFF
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|name| !name.is_empty());

        match staff_name {
            Some(name) => Self::SendEmail {
                staff_name: name.to_owned(),
            },
            None => Self::MissingStaffName,
        }
    }
}

/// Progress line shown while the relay call is in flight.
pub fn sending_notice(staff_name: &str) -> String {
    format!("📤 Sending discharge email to {staff_name}...")
}
