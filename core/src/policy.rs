//! Per-route and per-upstream policy tuples.
//!
//! A [`Cluster`] is identified on the wire by its upstream plus the policy
//! tuple; two routes that differ only in weight share a cluster, while a
//! change in load-balancing strategy or upstream validation produces a new
//! one. See [`crate::names::cluster_name`].

use std::time::Duration;

use crate::dag::ServicePort;

/// Reference to an upstream service:port with the policies that shape the
/// emitted cluster. `weight` deliberately does not participate in identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    pub upstream: ServicePort,
    pub weight: u32,
    /// Raw strategy string from the routing document; empty means the
    /// proxy's round-robin default.
    pub lb_strategy: String,
    pub health_check: Option<HealthCheckPolicy>,
    pub upstream_validation: Option<UpstreamValidation>,
}

impl Cluster {
    pub fn name(&self) -> String {
        crate::names::cluster_name(self)
    }
}

/// Active HTTP health checking parameters. Zero values mean "use the
/// projection defaults"; only non-zero values participate in the cluster
/// identity hash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HealthCheckPolicy {
    pub path: String,
    pub host: String,
    pub timeout_seconds: u32,
    pub interval_seconds: u32,
    pub unhealthy_threshold: u32,
    pub healthy_threshold: u32,
}

/// Upstream certificate validation: a CA bundle plus the subject name the
/// presented certificate must carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamValidation {
    /// Name of the CA secret as written in the routing document. Part of
    /// the cluster identity so that switching CAs rolls the cluster.
    pub ca_secret_name: String,
    pub ca: Vec<u8>,
    pub subject_name: String,
}

/// Circuit breaker thresholds sourced from service annotations. Malformed
/// annotation values never reach this struct; they read as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CircuitBreakers {
    pub max_connections: Option<u32>,
    pub max_pending_requests: Option<u32>,
    pub max_requests: Option<u32>,
    pub max_retries: Option<u32>,
}

/// Protocol spoken to the upstream, selected per service port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpstreamProtocol {
    Tls,
    H2,
    H2c,
}

/// A route's request timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeout {
    /// Explicitly unbounded ("infinity", or a value we could not parse).
    Infinite,
    Duration(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub request: Timeout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_on: String,
    pub num_retries: u32,
    pub per_try_timeout: Option<Duration>,
}

/// Minimum TLS protocol version for a secure virtual host. The effective
/// version of a filter chain is the max of the document's and the global
/// floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    #[default]
    V1_1,
    V1_2,
    V1_3,
}

impl TlsVersion {
    /// Parses the `minimumProtocolVersion` field / annotation value.
    /// Anything unrecognized falls back to the 1.1 floor.
    pub fn parse(s: &str) -> Self {
        match s {
            "1.3" => TlsVersion::V1_3,
            "1.2" => TlsVersion::V1_2,
            _ => TlsVersion::V1_1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_version_parse() {
        assert_eq!(TlsVersion::parse("1.3"), TlsVersion::V1_3);
        assert_eq!(TlsVersion::parse("1.2"), TlsVersion::V1_2);
        assert_eq!(TlsVersion::parse("1.1"), TlsVersion::V1_1);
        assert_eq!(TlsVersion::parse("tls9000"), TlsVersion::V1_1);
    }

    #[test]
    fn tls_version_effective_floor_is_max() {
        assert_eq!(TlsVersion::V1_2.max(TlsVersion::V1_1), TlsVersion::V1_2);
        assert_eq!(TlsVersion::V1_2.max(TlsVersion::V1_3), TlsVersion::V1_3);
    }
}
