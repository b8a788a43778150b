//! Backend contract: transport seam, wire payloads, typed client.

pub mod client;
pub mod http;
pub mod transport;
pub mod wire;

pub use client::TrackerClient;
pub use transport::{ApiRequest, Endpoint, MultipartPayload, RequestBody, Transport};
