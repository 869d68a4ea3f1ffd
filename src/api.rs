use serde::{Deserialize, Serialize};

pub const DELETED_MESSAGE: &str = "Book deleted successfully";
pub const GENERIC_ERROR: &str = "internal server error";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        ErrorResponse { error: msg.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn deleted() -> Self {
        MessageResponse {
            message: DELETED_MESSAGE.to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        HealthResponse {
            status: "ok".to_owned(),
        }
    }
}
