//! Audit trail for discharge decisions.

use crate::discharge::{DischargeAction, RequestStatus};
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What happened to an approve/reject attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AuditOutcome {
    Applied {
        from: RequestStatus,
        to: RequestStatus,
    },
    PermissionDenied,
    NotPending {
        status: RequestStatus,
    },
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub request_id: String,
    pub actor_sub: String,
    pub actor_name: String,
    pub action: DischargeAction,
    pub outcome: AuditOutcome,
}

/// Append-only list of audit events, oldest first.
#[derive(Clone, Debug, Default)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        actor: &Session,
        request_id: &str,
        action: DischargeAction,
        outcome: AuditOutcome,
        at: DateTime<Utc>,
    ) -> &AuditEvent {
        let event = AuditEvent {
            id: Uuid::new_v4(),
            at,
            request_id: request_id.to_owned(),
            actor_sub: actor.sub.clone(),
            actor_name: actor.name.clone(),
            action,
            outcome,
        };
        tracing::debug!(event_id = %event.id, request_id, ?outcome, "audit event recorded");
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
