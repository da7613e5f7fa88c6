//! Response envelope
//!
//! Every request to the form endpoint is answered with one of these,
//! serialised as `{"isError": bool, "messages": [...], "data": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SubmissionError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "isError")]
    pub is_error: bool,
    pub messages: Vec<String>,
    pub data: Map<String, Value>,
}

impl ResponseEnvelope {
    /// A fresh envelope: not an error, no messages, no data.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            is_error: false,
            messages: vec![message.into()],
            data: Map::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            messages: vec![message.into()],
            data: Map::new(),
        }
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Mark the envelope as failed and record the error's message.
    pub fn fail(&mut self, error: &SubmissionError) {
        self.is_error = true;
        self.messages.push(error.to_string());
    }

    pub fn insert_data(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<SubmissionError> for ResponseEnvelope {
    fn from(error: SubmissionError) -> Self {
        Self::error(error.to_string())
    }
}
