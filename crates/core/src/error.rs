use crate::discharge::RequestStatus;

#[derive(Debug, thiserror::Error)]
pub enum DischargeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] dc_types::TextError),

    #[error("invalid roster: {0}")]
    InvalidRoster(String),
    #[error("failed to read roster file: {0}")]
    RosterRead(std::io::Error),
    #[error("duplicate patient id: {0}")]
    DuplicatePatientId(String),
    #[error("patient not found: {0}")]
    PatientNotFound(String),

    #[error("invalid authentication token: {0}")]
    InvalidToken(String),
    #[error("failed to encode session token: {0}")]
    TokenEncode(serde_json::Error),
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("discharge request not found: {0}")]
    RequestNotFound(String),
    #[error("missing permission: {0}")]
    PermissionDenied(&'static str),
    #[error("discharge request {id} is {status:?}, only pending requests can change")]
    NotPending { id: String, status: RequestStatus },
}

pub type DischargeResult<T> = std::result::Result<T, DischargeError>;
