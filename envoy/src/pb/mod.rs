//! Hand-maintained subset of the Envoy v3 xDS protobuf schema.
//!
//! Only the messages this controller actually places on the wire are
//! modeled; field numbers follow the published data-plane API so the prost
//! encoding is byte-compatible with generated code.

pub mod cluster;
pub mod core;
pub mod discovery;
pub mod endpoint;
pub mod filters;
pub mod listener;
pub mod route;
pub mod tls;
pub mod type_urls;
