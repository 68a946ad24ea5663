//! Sessions and role permissions.
//!
//! A session is carried between requests as an unsigned token: standard base64 over the JSON
//! form of the session. Restoring a session checks the token's shape, nothing more.

use crate::constants::{
    APPROVE_DISCHARGE, CONFIGURE_INTEGRATIONS, DEMO_EMAIL_DOMAIN, EDIT_BILLING, GENERATE_BILL,
    MANAGE_ROLES, MARK_BILL_PAID, MARK_NURSING_TASK_COMPLETE, REJECT_DISCHARGE,
    UPDATE_DIAGNOSIS, UPDATE_TREATMENT_NOTES, VERIFY_MEDS_BEFORE_DISCHARGE, VIEW_AUDIT_LOGS,
    VIEW_PATIENT_RECORDS,
};
use crate::error::{DischargeError, DischargeResult};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use dc_types::Permission;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DOCTOR_PERMISSIONS: [&str; 5] = [
    APPROVE_DISCHARGE,
    REJECT_DISCHARGE,
    VIEW_PATIENT_RECORDS,
    UPDATE_DIAGNOSIS,
    UPDATE_TREATMENT_NOTES,
];
const NURSE_PERMISSIONS: [&str; 3] = [
    VIEW_PATIENT_RECORDS,
    MARK_NURSING_TASK_COMPLETE,
    VERIFY_MEDS_BEFORE_DISCHARGE,
];
const BILLING_PERMISSIONS: [&str; 4] =
    [VIEW_PATIENT_RECORDS, EDIT_BILLING, GENERATE_BILL, MARK_BILL_PAID];
const ADMIN_ONLY_PERMISSIONS: [&str; 3] = [MANAGE_ROLES, VIEW_AUDIT_LOGS, CONFIGURE_INTEGRATIONS];

/// Staff roles offered at demo login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Doctor,
    Nurse,
    #[serde(rename = "Billing Staff")]
    BillingStaff,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Doctor, Self::Nurse, Self::BillingStaff, Self::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "Doctor",
            Self::Nurse => "Nurse",
            Self::BillingStaff => "Billing Staff",
            Self::Admin => "Admin",
        }
    }

    /// Permission names granted to the role, in grant order.
    ///
    /// Admin holds the union of the other roles, first occurrence kept, plus its own three.
    pub fn permission_names(self) -> Vec<&'static str> {
        match self {
            Self::Doctor => DOCTOR_PERMISSIONS.to_vec(),
            Self::Nurse => NURSE_PERMISSIONS.to_vec(),
            Self::BillingStaff => BILLING_PERMISSIONS.to_vec(),
            Self::Admin => {
                let mut names: Vec<&'static str> = Vec::new();
                for name in DOCTOR_PERMISSIONS
                    .iter()
                    .chain(&NURSE_PERMISSIONS)
                    .chain(&BILLING_PERMISSIONS)
                    .chain(&ADMIN_ONLY_PERMISSIONS)
                {
                    if !names.contains(name) {
                        names.push(*name);
                    }
                }
                names
            }
        }
    }

    pub fn permissions(self) -> Vec<Permission> {
        self.permission_names()
            .into_iter()
            .map(|name| Permission::new(name).expect("built-in permission is well formed"))
            .collect()
    }

    /// Display name of the demo account for this role.
    pub fn demo_name(self) -> &'static str {
        match self {
            Self::Doctor => "Dr. Sarah Wilson",
            Self::Nurse => "Jennifer Martinez, RN",
            Self::BillingStaff => "Michael Chen",
            Self::Admin => "Administrator",
        }
    }

    /// Demo mailbox: the lower-cased role with its first space removed.
    pub fn demo_email(self) -> String {
        let local = self.as_str().to_lowercase().replacen(' ', "", 1);
        format!("{local}@{DEMO_EMAIL_DOMAIN}")
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DischargeError;

    /// Accepts the display label in any case, with or without the space or an underscore.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "doctor" => Ok(Self::Doctor),
            "nurse" => Ok(Self::Nurse),
            "billingstaff" => Ok(Self::BillingStaff),
            "admin" => Ok(Self::Admin),
            _ => Err(DischargeError::UnknownRole(s.trim().to_owned())),
        }
    }
}

/// An authenticated user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub sub: String,
    pub email: String,
    pub name: String,
    /// The first role is the primary one.
    pub roles: Vec<String>,
    pub permissions: Vec<Permission>,
    pub login_time: DateTime<Utc>,
}

impl Session {
    /// Manufactures the demo session for `role`.
    pub fn demo_login(role: Role, now: DateTime<Utc>) -> Self {
        let email = role.demo_email();
        Self {
            sub: email.clone(),
            email,
            name: role.demo_name().to_owned(),
            roles: vec![role.as_str().to_owned()],
            permissions: role.permissions(),
            login_time: now,
        }
    }

    pub fn primary_role(&self) -> &str {
        self.roles.first().map(String::as_str).unwrap_or_default()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Fails with [`DischargeError::PermissionDenied`] unless the session holds `permission`.
    pub fn require(&self, permission: &'static str) -> DischargeResult<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(DischargeError::PermissionDenied(permission))
        }
    }

    pub fn to_token(&self) -> DischargeResult<String> {
        let json = serde_json::to_vec(self).map_err(DischargeError::TokenEncode)?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Restores a session from a token.
    ///
    /// `sub`, `email`, `name` must be non-empty strings, `roles` a non-empty array of strings and
    /// `permissions` an array of `verb:object` strings. A missing `loginTime` becomes `now`.
    pub fn from_token(token: &str, now: DateTime<Utc>) -> DischargeResult<Self> {
        let bytes = general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|e| invalid(format!("not base64: {e}")))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| invalid(format!("not JSON: {e}")))?;

        let sub = required_text(&value, "sub")?;
        let email = required_text(&value, "email")?;
        let name = required_text(&value, "name")?;

        let roles = match value.get("roles") {
            None | Some(Value::Null) => return Err(invalid("Missing required field: roles")),
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| invalid("Roles must be strings"))
                })
                .collect::<DischargeResult<Vec<_>>>()?,
            Some(_) => return Err(invalid("Roles must be a non-empty array")),
        };

        let permissions = match value.get("permissions") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let text = item
                        .as_str()
                        .ok_or_else(|| invalid("Permissions must be strings"))?;
                    Permission::new(text).map_err(|e| invalid(e.to_string()))
                })
                .collect::<DischargeResult<Vec<_>>>()?,
            _ => return Err(invalid("Permissions must be an array")),
        };

        let login_time = match value.get("loginTime") {
            None | Some(Value::Null) => now,
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .map_err(|e| invalid(format!("bad loginTime: {e}")))?
                .with_timezone(&Utc),
            Some(_) => return Err(invalid("loginTime must be a string")),
        };

        Ok(Self {
            sub,
            email,
            name,
            roles,
            permissions,
            login_time,
        })
    }
}

fn invalid(message: impl Into<String>) -> DischargeError {
    DischargeError::InvalidToken(message.into())
}

fn required_text(value: &Value, field: &str) -> DischargeResult<String> {
    match value.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(invalid(format!("Missing required field: {field}")))
        }
        Some(_) => Err(invalid(format!("{field} must be a string"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 21, 9, 30, 0).unwrap()
    }

    fn encode(value: Value) -> String {
        general_purpose::STANDARD.encode(value.to_string())
    }

    fn err_message(token: &str) -> String {
        Session::from_token(token, now()).unwrap_err().to_string()
    }

    #[test]
    fn admin_holds_union_in_order() {
        assert_eq!(
            Role::Admin.permission_names(),
            [
                "approve:discharge",
                "reject:discharge",
                "view:patient_records",
                "update:diagnosis",
                "update:treatment_notes",
                "mark:nursing_task_complete",
                "verify:meds_before_discharge",
                "edit:billing",
                "generate:bill",
                "mark:bill_paid",
                "manage:roles",
                "view:audit_logs",
                "configure:integrations",
            ]
        );
    }

    #[test]
    fn demo_login_builds_role_identity() {
        let session = Session::demo_login(Role::BillingStaff, now());
        assert_eq!(session.sub, "billingstaff@hospital.com");
        assert_eq!(session.email, session.sub);
        assert_eq!(session.name, "Michael Chen");
        assert_eq!(session.roles, ["Billing Staff"]);
        assert_eq!(session.primary_role(), "Billing Staff");
        assert!(session.has_permission("generate:bill"));
        assert!(!session.has_permission("approve:discharge"));
        assert_eq!(session.login_time, now());
    }

    #[test]
    fn nurse_cannot_approve() {
        let nurse = Session::demo_login(Role::Nurse, now());
        assert!(matches!(
            nurse.require(APPROVE_DISCHARGE),
            Err(DischargeError::PermissionDenied("approve:discharge"))
        ));
        assert!(nurse.require(VIEW_PATIENT_RECORDS).is_ok());
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        for role in Role::ALL {
            let session = Session::demo_login(role, now());
            let token = session.to_token().unwrap();
            let restored = Session::from_token(&token, Utc::now()).unwrap();
            assert_eq!(restored, session);
        }
    }

    #[test]
    fn token_json_uses_camel_case() {
        let token = Session::demo_login(Role::Doctor, now()).to_token().unwrap();
        let bytes = general_purpose::STANDARD.decode(token).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["loginTime"], "2025-01-21T09:30:00Z");
        assert_eq!(value["roles"], json!(["Doctor"]));
    }

    #[test]
    fn missing_login_time_defaults_to_now() {
        let token = encode(json!({
            "sub": "a@b", "email": "a@b", "name": "A", "roles": ["Nurse"], "permissions": []
        }));
        let session = Session::from_token(&token, now()).unwrap();
        assert_eq!(session.login_time, now());
        assert!(session.permissions.is_empty());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(err_message("%%%").contains("not base64"));
        assert!(err_message(&general_purpose::STANDARD.encode("nope")).contains("not JSON"));

        let base = json!({
            "sub": "a@b", "email": "a@b", "name": "A", "roles": ["Nurse"], "permissions": []
        });

        let mut missing_email = base.clone();
        missing_email.as_object_mut().unwrap().remove("email");
        assert_eq!(
            err_message(&encode(missing_email)),
            "invalid authentication token: Missing required field: email"
        );

        let mut blank_name = base.clone();
        blank_name["name"] = json!("");
        assert!(err_message(&encode(blank_name)).ends_with("Missing required field: name"));

        let mut empty_roles = base.clone();
        empty_roles["roles"] = json!([]);
        assert!(err_message(&encode(empty_roles)).ends_with("Roles must be a non-empty array"));

        let mut bad_permissions = base.clone();
        bad_permissions["permissions"] = json!("approve:discharge");
        assert!(err_message(&encode(bad_permissions)).ends_with("Permissions must be an array"));

        let mut no_permissions = base;
        no_permissions.as_object_mut().unwrap().remove("permissions");
        assert!(err_message(&encode(no_permissions)).ends_with("Permissions must be an array"));
    }

    #[test]
    fn role_parsing_is_lenient() {
        assert_eq!("billing staff".parse::<Role>().unwrap(), Role::BillingStaff);
        assert_eq!("Billing_Staff".parse::<Role>().unwrap(), Role::BillingStaff);
        assert_eq!(" ADMIN ".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!(
            "janitor".parse::<Role>(),
            Err(DischargeError::UnknownRole(r)) if r == "janitor"
        ));
    }
}
