//! The seam between the typed client and the wire.
//!
//! A [`Transport`] moves one [`ApiRequest`] to the backend and hands back the
//! decoded JSON body. It knows nothing about attendance rules; deciding
//! whether a reply means "accepted" happens in [`super::wire`].

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    PunchIn,
    Break,
    PunchOut,
    Visit,
    Followup,
    AttendanceStatus,
    AttendanceReport,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::PunchIn => "attendance/punch-in",
            Endpoint::Break => "attendance/break",
            Endpoint::PunchOut => "attendance/punch-out",
            Endpoint::Visit => "visitor",
            Endpoint::Followup => "followup",
            Endpoint::AttendanceStatus => "attendance/status",
            Endpoint::AttendanceReport => "attendance/report",
        }
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    pub fields: Vec<MultipartField>,
}

impl MultipartPayload {
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(MultipartField::Text {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        self.fields.push(MultipartField::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        });
        self
    }

    /// Value of a text field, if present.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            MultipartField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn has_file(&self) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(f, MultipartField::File { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartPayload),
    Query(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn json(endpoint: Endpoint, body: Value) -> Self {
        Self {
            endpoint,
            body: RequestBody::Json(body),
        }
    }

    pub fn multipart(endpoint: Endpoint, payload: MultipartPayload) -> Self {
        Self {
            endpoint,
            body: RequestBody::Multipart(payload),
        }
    }

    pub fn query(endpoint: Endpoint, params: Vec<(String, String)>) -> Self {
        Self {
            endpoint,
            body: RequestBody::Query(params),
        }
    }

    /// JSON body, when the request carries one.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn multipart_body(&self) -> Option<&MultipartPayload> {
        match &self.body {
            RequestBody::Multipart(p) => Some(p),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}
