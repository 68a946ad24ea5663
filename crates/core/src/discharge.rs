//! Discharge request workflow.
//!
//! Requests start `Pending` and move once, to `Approved` or `Rejected`, when a session holding
//! the matching permission acts on them. Every attempt lands in the audit log whatever its
//! outcome. `Completed` exists for data received from elsewhere; nothing here produces it.

use crate::audit::{AuditEvent, AuditLog, AuditOutcome};
use crate::constants::{APPROVE_DISCHARGE, REJECT_DISCHARGE, VIEW_AUDIT_LOGS};
use crate::error::{DischargeError, DischargeResult};
use crate::session::Session;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = DischargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            other => Err(DischargeError::InvalidInput(format!(
                "unknown request status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// The two decisions a clinician can make on a pending request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DischargeAction {
    Approve,
    Reject,
}

impl DischargeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    pub fn required_permission(self) -> &'static str {
        match self {
            Self::Approve => APPROVE_DISCHARGE,
            Self::Reject => REJECT_DISCHARGE,
        }
    }

    /// Status a pending request moves to.
    pub fn target(self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DischargeRequest {
    pub id: String,
    pub patient_name: String,
    pub patient_id: String,
    pub room: String,
    pub diagnosis: String,
    pub request_date: NaiveDate,
    pub status: RequestStatus,
    pub doctor: String,
    pub notes: String,
    pub priority: Priority,
}

#[derive(Debug)]
pub struct DischargeWorkflow {
    requests: Vec<DischargeRequest>,
    audit: AuditLog,
}

impl DischargeWorkflow {
    pub fn new(requests: Vec<DischargeRequest>) -> Self {
        Self {
            requests,
            audit: AuditLog::new(),
        }
    }

    /// The three demo requests.
    pub fn seed() -> Self {
        let request = |id: &str,
                       patient_name: &str,
                       patient_id: &str,
                       room: &str,
                       diagnosis: &str,
                       (y, m, d): (i32, u32, u32),
                       status: RequestStatus,
                       notes: &str,
                       priority: Priority| DischargeRequest {
            id: id.to_owned(),
            patient_name: patient_name.to_owned(),
            patient_id: patient_id.to_owned(),
            room: room.to_owned(),
            diagnosis: diagnosis.to_owned(),
            request_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            status,
            doctor: "Dr. Sarah Wilson".to_owned(),
            notes: notes.to_owned(),
            priority,
        };

        Self::new(vec![
            request(
                "1",
                "John Smith",
                "P001",
                "A-101",
                "Pneumonia - Fully recovered",
                (2024, 1, 20),
                RequestStatus::Pending,
                "Patient has completed antibiotic course and chest X-ray is clear.",
                Priority::Medium,
            ),
            request(
                "2",
                "Mary Johnson",
                "P002",
                "B-205",
                "Post-surgical recovery",
                (2024, 1, 19),
                RequestStatus::Approved,
                "Wound healing well, patient mobile and pain controlled.",
                Priority::Low,
            ),
            request(
                "3",
                "Robert Davis",
                "P003",
                "C-301",
                "Cardiac monitoring",
                (2024, 1, 21),
                RequestStatus::Pending,
                "Requires cardiology clearance before discharge.",
                Priority::High,
            ),
        ])
    }

    /// Requests in insertion order, optionally restricted to one status.
    pub fn list(&self, status: Option<RequestStatus>) -> Vec<&DischargeRequest> {
        self.requests
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect()
    }

    pub fn get(&self, id: &str) -> DischargeResult<&DischargeRequest> {
        self.requests
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| DischargeError::RequestNotFound(id.to_owned()))
    }

    pub fn can_approve(session: &Session) -> bool {
        session.has_permission(APPROVE_DISCHARGE)
    }

    pub fn can_reject(session: &Session) -> bool {
        session.has_permission(REJECT_DISCHARGE)
    }

    pub fn approve(
        &mut self,
        session: &Session,
        id: &str,
        now: DateTime<Utc>,
    ) -> DischargeResult<&DischargeRequest> {
        self.apply(session, id, DischargeAction::Approve, now)
    }

    pub fn reject(
        &mut self,
        session: &Session,
        id: &str,
        now: DateTime<Utc>,
    ) -> DischargeResult<&DischargeRequest> {
        self.apply(session, id, DischargeAction::Reject, now)
    }

    /// Permission first, then existence, then the pending check. Only a full pass mutates.
    fn apply(
        &mut self,
        session: &Session,
        id: &str,
        action: DischargeAction,
        now: DateTime<Utc>,
    ) -> DischargeResult<&DischargeRequest> {
        let permission = action.required_permission();
        if let Err(err) = session.require(permission) {
            tracing::warn!(
                request_id = id,
                actor = %session.sub,
                ?action,
                "discharge decision refused: missing {permission}"
            );
            self.audit
                .record(session, id, action, AuditOutcome::PermissionDenied, now);
            return Err(err);
        }

        let Some(index) = self.requests.iter().position(|r| r.id == id) else {
            tracing::warn!(request_id = id, ?action, "discharge request not found");
            self.audit
                .record(session, id, action, AuditOutcome::NotFound, now);
            return Err(DischargeError::RequestNotFound(id.to_owned()));
        };

        let from = self.requests[index].status;
        if from != RequestStatus::Pending {
            tracing::warn!(request_id = id, ?action, status = %from, "discharge request is not pending");
            self.audit
                .record(session, id, action, AuditOutcome::NotPending { status: from }, now);
            return Err(DischargeError::NotPending {
                id: id.to_owned(),
                status: from,
            });
        }

        let to = action.target();
        self.requests[index].status = to;
        self.audit
            .record(session, id, action, AuditOutcome::Applied { from, to }, now);
        tracing::info!(request_id = id, actor = %session.sub, %from, %to, "discharge request updated");

        Ok(&self.requests[index])
    }

    /// Audit trail, oldest first. Requires `view:audit_logs`.
    pub fn audit_events(&self, session: &Session) -> DischargeResult<&[AuditEvent]> {
        session.require(VIEW_AUDIT_LOGS)?;
        Ok(self.audit.events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    fn session(role: Role) -> Session {
        Session::demo_login(role, Utc::now())
    }

    #[test]
    fn seed_has_three_requests() {
        let workflow = DischargeWorkflow::seed();
        assert_eq!(workflow.list(None).len(), 3);
        let pending: Vec<&str> = workflow
            .list(Some(RequestStatus::Pending))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(pending, ["1", "3"]);
        assert_eq!(workflow.get("2").unwrap().priority, Priority::Low);
    }

    #[test]
    fn doctor_approves_pending_request() {
        let mut workflow = DischargeWorkflow::seed();
        let doctor = session(Role::Doctor);
        let updated = workflow.approve(&doctor, "1", Utc::now()).unwrap();
        assert_eq!(updated.status, RequestStatus::Approved);
        assert_eq!(workflow.get("1").unwrap().status, RequestStatus::Approved);
    }

    #[test]
    fn doctor_rejects_pending_request() {
        let mut workflow = DischargeWorkflow::seed();
        let doctor = session(Role::Doctor);
        workflow.reject(&doctor, "3", Utc::now()).unwrap();
        assert_eq!(workflow.get("3").unwrap().status, RequestStatus::Rejected);
    }

    #[test]
    fn nurse_reject_leaves_request_pending() {
        let mut workflow = DischargeWorkflow::seed();
        let nurse = session(Role::Nurse);
        let result = workflow.reject(&nurse, "1", Utc::now());
        assert!(matches!(result, Err(DischargeError::PermissionDenied("reject:discharge"))));
        assert_eq!(workflow.get("1").unwrap().status, RequestStatus::Pending);
    }

    #[test]
    fn nurse_approve_leaves_request_pending() {
        let mut workflow = DischargeWorkflow::seed();
        let nurse = session(Role::Nurse);
        let result = workflow.approve(&nurse, "1", Utc::now());
        assert!(matches!(result, Err(DischargeError::PermissionDenied("approve:discharge"))));
        assert_eq!(workflow.get("1").unwrap().status, RequestStatus::Pending);
        assert_eq!(workflow.list(Some(RequestStatus::Pending)).len(), 2);
    }

    #[test]
    fn approving_a_decided_request_changes_nothing() {
        let mut workflow = DischargeWorkflow::seed();
        let doctor = session(Role::Doctor);
        let result = workflow.approve(&doctor, "2", Utc::now());
        assert!(matches!(
            result,
            Err(DischargeError::NotPending { status: RequestStatus::Approved, .. })
        ));

        workflow.reject(&doctor, "1", Utc::now()).unwrap();
        assert!(workflow.approve(&doctor, "1", Utc::now()).is_err());
        assert_eq!(workflow.get("1").unwrap().status, RequestStatus::Rejected);
    }

    #[test]
    fn unknown_request_is_not_found() {
        let mut workflow = DischargeWorkflow::seed();
        let doctor = session(Role::Doctor);
        assert!(matches!(
            workflow.approve(&doctor, "99", Utc::now()),
            Err(DischargeError::RequestNotFound(id)) if id == "99"
        ));
    }

    #[test]
    fn every_attempt_is_audited() {
        let mut workflow = DischargeWorkflow::seed();
        let doctor = session(Role::Doctor);
        let nurse = session(Role::Nurse);
        let admin = session(Role::Admin);

        let _ = workflow.approve(&nurse, "1", Utc::now());
        let _ = workflow.approve(&doctor, "1", Utc::now());
        let _ = workflow.approve(&doctor, "1", Utc::now());
        let _ = workflow.reject(&doctor, "42", Utc::now());

        let outcomes: Vec<AuditOutcome> = workflow
            .audit_events(&admin)
            .unwrap()
            .iter()
            .map(|e| e.outcome)
            .collect();
        assert_eq!(
            outcomes,
            [
                AuditOutcome::PermissionDenied,
                AuditOutcome::Applied {
                    from: RequestStatus::Pending,
                    to: RequestStatus::Approved
                },
                AuditOutcome::NotPending {
                    status: RequestStatus::Approved
                },
                AuditOutcome::NotFound,
            ]
        );
    }

    #[test]
    fn audit_requires_permission() {
        let workflow = DischargeWorkflow::seed();
        assert!(matches!(
            workflow.audit_events(&session(Role::Doctor)),
            Err(DischargeError::PermissionDenied("view:audit_logs"))
        ));
    }

    #[test]
    fn affordance_flags_follow_permissions() {
        assert!(DischargeWorkflow::can_approve(&session(Role::Doctor)));
        assert!(DischargeWorkflow::can_reject(&session(Role::Admin)));
        assert!(!DischargeWorkflow::can_approve(&session(Role::BillingStaff)));
        assert!(!DischargeWorkflow::can_reject(&session(Role::Nurse)));
    }

    #[test]
    fn request_status_parses_case_insensitively() {
        assert_eq!("approved".parse::<RequestStatus>().unwrap(), RequestStatus::Approved);
        assert!("done".parse::<RequestStatus>().is_err());
        assert!(RequestStatus::Completed.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
    }
}
