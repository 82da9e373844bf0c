//! Types shared between the routing document kinds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The host a routing document accepts traffic for. Only roots carry one.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct VirtualHost {
    #[serde(default)]
    pub fqdn: String,
    pub tls: Option<Tls>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tls {
    /// `name` or `namespace/name` of the TLS secret; the latter requires a
    /// matching certificate delegation.
    #[serde(default)]
    pub secret_name: String,
    #[serde(default)]
    pub minimum_protocol_version: String,
    /// Forward the TLS session to the backend untouched, selecting it by
    /// SNI.
    #[serde(default)]
    pub passthrough: bool,
}

/// One upstream of a route or TCP proxy.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteService {
    pub name: String,
    /// Validated to 1-65535 at build time, so wide enough to hold whatever
    /// the user wrote.
    pub port: i32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub strategy: String,
    pub health_check: Option<HealthCheck>,
    #[serde(rename = "validation")]
    pub upstream_validation: Option<UpstreamValidation>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub interval_seconds: u32,
    #[serde(default)]
    pub timeout_seconds: u32,
    #[serde(default)]
    pub unhealthy_threshold_count: u32,
    #[serde(default)]
    pub healthy_threshold_count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamValidation {
    /// Name of a CA secret in the document's namespace.
    pub ca_certificate: String,
    pub subject_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct TimeoutPolicy {
    /// A duration string, or `infinity` to disable the timeout.
    #[serde(default)]
    pub request: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub per_try_timeout: String,
}

/// Weighted L4 forwarding for a virtual host.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct TcpProxy {
    #[serde(default)]
    pub services: Vec<RouteService>,
}

/// The status written back onto routing documents.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStatus {
    #[serde(default)]
    pub current_status: String,
    #[serde(default)]
    pub description: String,
}
