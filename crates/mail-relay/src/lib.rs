//! # Mail Relay
//!
//! Client for the external relay that emails today's discharge summary to a staff member.
//!
//! The relay is an opaque notification sink: `POST {base}/send-discharge-email` with
//! `{ "staffName": ... }`. Its status code decides the outcome; the body is only read on
//! success. Calls are never retried.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum MailRelayError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("mail relay unreachable at {url}: {source}")]
    Unreachable { url: String, source: reqwest::Error },
    #[error("mail relay timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to parse mail relay response: {0}")]
    ResponseParsing(reqwest::Error),
}

impl MailRelayError {
    /// Chat text for a relay call that never produced a usable answer.
    pub fn chat_message(&self) -> String {
        "⚠️ Could not connect to server.".to_owned()
    }
}

/// How the relay answered.
#[derive(Clone, Debug, PartialEq)]
pub enum EmailOutcome {
    /// 200: `message` names the recipient.
    Sent {
        message: String,
        patients: Vec<serde_json::Value>,
    },
    /// 204
    NoDischarges,
    /// 404
    StaffNotFound,
    /// Any other status.
    Failed { status: u16 },
}

impl EmailOutcome {
    pub fn chat_message(&self) -> String {
        match self {
            Self::Sent { message, .. } => format!("✅ Email sent to {message}"),
            Self::NoDischarges => "⚠️ No discharges today.".to_owned(),
            Self::StaffNotFound => "❌ Staff not found.".to_owned(),
            Self::Failed { .. } => "❌ Something went wrong.".to_owned(),
        }
    }
}

/// Chat text for the result of a relay call.
pub fn chat_message(result: &Result<EmailOutcome, MailRelayError>) -> String {
    match result {
        Ok(outcome) => outcome.chat_message(),
        Err(err) => err.chat_message(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    staff_name: &'a str,
}

#[derive(Deserialize)]
struct SentResponse {
    message: String,
    #[serde(default)]
    patients: Vec<serde_json::Value>,
}

#[derive(Clone, Debug)]
pub struct MailRelayClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl MailRelayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MailRelayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MailRelayError::Client)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send_discharge_email(
        &self,
        staff_name: &str,
    ) -> Result<EmailOutcome, MailRelayError> {
        let url = format!("{}/send-discharge-email", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&SendRequest { staff_name })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(%url, "mail relay request failed: {e}");
                if e.is_timeout() {
                    MailRelayError::Timeout(self.timeout)
                } else {
                    MailRelayError::Unreachable {
                        url: url.clone(),
                        source: e,
                    }
                }
            })?;

        let outcome = match response.status() {
            StatusCode::OK => {
                let body: SentResponse = response.json().await.map_err(|e| {
                    tracing::error!("mail relay returned an unreadable body: {e}");
                    MailRelayError::ResponseParsing(e)
                })?;
                EmailOutcome::Sent {
                    message: body.message,
                    patients: body.patients,
                }
            }
            StatusCode::NO_CONTENT => EmailOutcome::NoDischarges,
            StatusCode::NOT_FOUND => EmailOutcome::StaffNotFound,
            other => {
                tracing::error!(status = other.as_u16(), staff_name, "mail relay failed");
                EmailOutcome::Failed {
                    status: other.as_u16(),
                }
            }
        };

        tracing::info!(staff_name, ?outcome, "mail relay answered");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn relay_stub(Json(body): Json<Value>) -> Response {
        match body["staffName"].as_str() {
            Some("Rohit") => Json(json!({
                "message": "Discharge email sent to Rohit (rohit@hospital.com)",
                "patients": [{"name": "Margaret Johnson"}]
            }))
            .into_response(),
            Some("Quiet Ward") => AxumStatus::NO_CONTENT.into_response(),
            Some("Garbled") => "not json".into_response(),
            Some("Broken") => (
                AxumStatus::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "Failed to send email", "error": "smtp down"})),
            )
                .into_response(),
            _ => (AxumStatus::NOT_FOUND, Json(json!({"message": "Staff not found"}))).into_response(),
        }
    }

    async fn spawn_stub() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/send-discharge-email", post(relay_stub));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> MailRelayClient {
        MailRelayClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn trims_trailing_slash() {
        assert_eq!(client("http://localhost:5000/").base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn sent_outcome_carries_relay_message() {
        let relay = client(&spawn_stub().await);
        let outcome = relay.send_discharge_email("Rohit").await.unwrap();
        assert_eq!(
            outcome.chat_message(),
            "✅ Email sent to Discharge email sent to Rohit (rohit@hospital.com)"
        );
        match outcome {
            EmailOutcome::Sent { patients, .. } => assert_eq!(patients.len(), 1),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_codes_map_to_outcomes() {
        let relay = client(&spawn_stub().await);
        assert_eq!(
            relay.send_discharge_email("Quiet Ward").await.unwrap(),
            EmailOutcome::NoDischarges
        );
        assert_eq!(
            relay.send_discharge_email("Nobody").await.unwrap(),
            EmailOutcome::StaffNotFound
        );
        assert_eq!(
            relay.send_discharge_email("Broken").await.unwrap(),
            EmailOutcome::Failed { status: 500 }
        );
    }

    #[tokio::test]
    async fn unreadable_success_body_is_an_error() {
        let relay = client(&spawn_stub().await);
        let result = relay.send_discharge_email("Garbled").await;
        assert!(matches!(result, Err(MailRelayError::ResponseParsing(_))));
        assert_eq!(chat_message(&result), "⚠️ Could not connect to server.");
    }

    #[tokio::test]
    async fn unreachable_relay_reports_connection_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{addr}"))
            .send_discharge_email("Rohit")
            .await;
        assert!(result.is_err());
        assert_eq!(chat_message(&result), "⚠️ Could not connect to server.");
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(EmailOutcome::NoDischarges.chat_message(), "⚠️ No discharges today.");
        assert_eq!(EmailOutcome::StaffNotFound.chat_message(), "❌ Staff not found.");
        assert_eq!(
            EmailOutcome::Failed { status: 502 }.chat_message(),
            "❌ Something went wrong."
        );
    }
}
