//! Wire types shared by the API surfaces.
//!
//! Field names are camelCase on the wire. Every type carries an OpenAPI schema.

use chrono::{DateTime, Utc};
use discharge_core::analytics::{length_of_stay, Insight, RosterSummary};
use discharge_core::{
    AssistantReply, AuditEvent, AuditOutcome, DischargeRequest, EnhancedPatient, Entity, Session,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

// ============================================================================
// Sessions
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    /// `Doctor`, `Nurse`, `Billing Staff` or `Admin`.
    pub role: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRes {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    /// Primary role, the first entry of `roles`.
    pub role: String,
    pub permissions: Vec<String>,
    pub login_time: DateTime<Utc>,
}

impl From<&Session> for SessionRes {
    fn from(session: &Session) -> Self {
        Self {
            sub: session.sub.clone(),
            email: session.email.clone(),
            name: session.name.clone(),
            roles: session.roles.clone(),
            role: session.primary_role().to_owned(),
            permissions: session
                .permissions
                .iter()
                .map(|p| p.as_str().to_owned())
                .collect(),
            login_time: session.login_time,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub token: String,
    pub session: SessionRes,
}

// ============================================================================
// Patients and analytics
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub room: String,
    pub diagnosis: String,
    /// ISO calendar date.
    pub admission_date: String,
    pub discharge_status: String,
    pub physician: String,
    pub keywords: Vec<String>,
    pub urgency: u8,
    pub complexity: u8,
    pub barriers: Vec<String>,
    pub next_steps: Vec<String>,
    pub length_of_stay: i64,
}

impl PatientRes {
    pub fn from_enhanced(patient: &EnhancedPatient, now: DateTime<Utc>) -> Self {
        Self {
            id: patient.id.as_str().to_owned(),
            name: patient.name.as_str().to_owned(),
            age: patient.age,
            room: patient.room.clone(),
            diagnosis: patient.diagnosis.clone(),
            admission_date: patient.admission_date.to_string(),
            discharge_status: patient.discharge_status.as_str().to_owned(),
            physician: patient.physician.clone(),
            keywords: patient.keywords.clone(),
            urgency: patient.urgency,
            complexity: patient.complexity,
            barriers: patient.barriers.iter().map(|s| s.to_string()).collect(),
            next_steps: patient.next_steps.iter().map(|s| s.to_string()).collect(),
            length_of_stay: length_of_stay(patient.admission_date, now),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct InsightRes {
    /// `alert`, `success`, `warning` or `info`.
    pub kind: String,
    pub title: String,
    pub message: String,
    /// `high`, `medium` or `low`.
    pub priority: String,
}

impl From<&Insight> for InsightRes {
    fn from(insight: &Insight) -> Self {
        Self {
            kind: insight.kind.as_str().to_owned(),
            title: insight.title.to_owned(),
            message: insight.message.clone(),
            priority: insight.priority.as_str().to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRes {
    pub total: usize,
    pub ready: usize,
    pub pending: usize,
    pub delayed: usize,
    pub ready_percent: f64,
    pub pending_percent: f64,
    pub delayed_percent: f64,
    pub average_urgency: f64,
    pub average_complexity: f64,
    pub average_length_of_stay: f64,
    pub high_urgency: usize,
    pub high_complexity: usize,
    pub insights: Vec<InsightRes>,
}

impl From<&RosterSummary> for AnalyticsRes {
    fn from(summary: &RosterSummary) -> Self {
        Self {
            total: summary.total,
            ready: summary.ready,
            pending: summary.pending,
            delayed: summary.delayed,
            ready_percent: summary.ready_percent,
            pending_percent: summary.pending_percent,
            delayed_percent: summary.delayed_percent,
            average_urgency: summary.average_urgency,
            average_complexity: summary.average_complexity,
            average_length_of_stay: discharge_core::analytics::one_decimal(
                summary.average_length_of_stay,
            ),
            high_urgency: summary.high_urgency,
            high_complexity: summary.high_complexity,
            insights: summary.insights().iter().map(InsightRes::from).collect(),
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatReq {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EntityRes {
    /// `patient`, `room` or `time`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Patient id, room code or time word.
    pub value: String,
    /// Patient display name, for patient entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Entity> for EntityRes {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::Patient(p) => Self {
                kind: "patient".into(),
                value: p.id.clone(),
                name: Some(p.name.clone()),
            },
            Entity::Room(code) => Self {
                kind: "room".into(),
                value: code.clone(),
                name: None,
            },
            Entity::Time(word) => Self {
                kind: "time".into(),
                value: (*word).to_owned(),
                name: None,
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRes {
    /// Intent label, or `email_command` for relay commands.
    pub intent: String,
    pub confidence: f64,
    pub entities: Vec<EntityRes>,
    pub response: String,
}

impl From<AssistantReply> for ChatRes {
    fn from(reply: AssistantReply) -> Self {
        Self {
            intent: reply.intent.as_str().to_owned(),
            confidence: reply.confidence,
            entities: reply.entities.iter().map(EntityRes::from).collect(),
            response: reply.text,
        }
    }
}

// ============================================================================
// Discharge requests
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DischargeRequestRes {
    pub id: String,
    pub patient_name: String,
    pub patient_id: String,
    pub room: String,
    pub diagnosis: String,
    pub request_date: String,
    /// `Pending`, `Approved`, `Rejected` or `Completed`.
    pub status: String,
    pub doctor: String,
    pub notes: String,
    pub priority: String,
}

impl From<&DischargeRequest> for DischargeRequestRes {
    fn from(request: &DischargeRequest) -> Self {
        Self {
            id: request.id.clone(),
            patient_name: request.patient_name.clone(),
            patient_id: request.patient_id.clone(),
            room: request.room.clone(),
            diagnosis: request.diagnosis.clone(),
            request_date: request.request_date.to_string(),
            status: request.status.as_str().to_owned(),
            doctor: request.doctor.clone(),
            notes: request.notes.clone(),
            priority: request.priority.as_str().to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDischargeRequestsRes {
    pub requests: Vec<DischargeRequestRes>,
    /// Whether the caller may approve pending requests.
    pub can_approve: bool,
    pub can_reject: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventRes {
    pub id: String,
    pub at: DateTime<Utc>,
    pub request_id: String,
    pub actor_sub: String,
    pub actor_name: String,
    /// `approve` or `reject`.
    pub action: String,
    /// `applied`, `permission_denied`, `not_pending` or `not_found`.
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl From<&AuditEvent> for AuditEventRes {
    fn from(event: &AuditEvent) -> Self {
        let (outcome, from, to) = match event.outcome {
            AuditOutcome::Applied { from, to } => (
                "applied",
                Some(from.as_str().to_owned()),
                Some(to.as_str().to_owned()),
            ),
            AuditOutcome::PermissionDenied => ("permission_denied", None, None),
            AuditOutcome::NotPending { status } => {
                ("not_pending", Some(status.as_str().to_owned()), None)
            }
            AuditOutcome::NotFound => ("not_found", None, None),
        };
        Self {
            id: event.id.to_string(),
            at: event.at,
            request_id: event.request_id.clone(),
            actor_sub: event.actor_sub.clone(),
            actor_name: event.actor_name.clone(),
            action: event.action.as_str().to_owned(),
            outcome: outcome.to_owned(),
            from,
            to,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListAuditRes {
    pub events: Vec<AuditEventRes>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_core::{DischargeWorkflow, PatientRegistry, Role};

    #[test]
    fn session_res_exposes_primary_role() {
        let session = Session::demo_login(Role::Doctor, Utc::now());
        let res = SessionRes::from(&session);
        assert_eq!(res.role, "Doctor");
        assert_eq!(res.permissions.len(), 5);
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("loginTime").is_some());
    }

    #[test]
    fn patient_res_uses_camel_case_and_lowercase_status() {
        let patients = EnhancedPatient::from_registry(&PatientRegistry::seed());
        let res = PatientRes::from_enhanced(&patients[2], Utc::now());
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["dischargeStatus"], "delayed");
        assert_eq!(json["admissionDate"], "2025-01-17");
        assert_eq!(json["urgency"], 10);
    }

    #[test]
    fn insight_labels_are_lowercase() {
        let patients = EnhancedPatient::from_registry(&PatientRegistry::seed());
        let summary = RosterSummary::compute(&patients, Utc::now());
        let res = AnalyticsRes::from(&summary);
        assert_eq!(res.insights[0].kind, "alert");
        assert_eq!(res.insights[0].priority, "high");
    }

    #[test]
    fn request_res_keeps_pascal_case_labels() {
        let workflow = DischargeWorkflow::seed();
        let res = DischargeRequestRes::from(workflow.get("3").unwrap());
        assert_eq!(res.status, "Pending");
        assert_eq!(res.priority, "High");
        assert_eq!(res.request_date, "2024-01-21");
    }

    #[test]
    fn patient_entity_carries_name() {
        let entity = Entity::Patient(discharge_core::intent::PatientRef {
            id: "PT001".into(),
            name: "Margaret Johnson".into(),
        });
        let json = serde_json::to_value(EntityRes::from(&entity)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "patient", "value": "PT001", "name": "Margaret Johnson"})
        );
    }
}
