//! The message published on every attempt

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message body plus the properties sent with it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishMessage {
    /// Raw payload
    pub body: Vec<u8>,

    /// MIME content type property
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Application headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl PublishMessage {
    /// Create a message with the given body
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add or replace a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Payload size in bytes
    pub fn size(&self) -> u64 {
        self.body.len() as u64
    }
}
