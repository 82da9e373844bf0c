//! Annotation parsing.
//!
//! Values that fail to parse behave as if the annotation were absent; a
//! user typo never takes a document out of service.

use std::collections::BTreeMap;
use std::time::Duration;

use gangway_core::{CircuitBreakers, RetryPolicy, Timeout, TimeoutPolicy, TlsVersion, UpstreamProtocol};

pub const ANNOTATION_INGRESS_CLASS: &str = "contour.heptio.com/ingress.class";
pub const ANNOTATION_K8S_INGRESS_CLASS: &str = "kubernetes.io/ingress.class";

const ANNOTATION_REQUEST_TIMEOUT: &str = "contour.heptio.com/request-timeout";
const ANNOTATION_WEBSOCKET_ROUTES: &str = "contour.heptio.com/websocket-routes";
const ANNOTATION_UPSTREAM_PROTOCOL: &str = "contour.heptio.com/upstream-protocol";
const ANNOTATION_MAX_CONNECTIONS: &str = "contour.heptio.com/max-connections";
const ANNOTATION_MAX_PENDING_REQUESTS: &str = "contour.heptio.com/max-pending-requests";
const ANNOTATION_MAX_REQUESTS: &str = "contour.heptio.com/max-requests";
const ANNOTATION_MAX_RETRIES: &str = "contour.heptio.com/max-retries";
const ANNOTATION_RETRY_ON: &str = "contour.heptio.com/retry-on";
const ANNOTATION_NUM_RETRIES: &str = "contour.heptio.com/num-retries";
const ANNOTATION_PER_TRY_TIMEOUT: &str = "contour.heptio.com/per-try-timeout";
const ANNOTATION_MIN_TLS_VERSION: &str = "contour.heptio.com/tls-minimum-protocol-version";

pub type Annotations = BTreeMap<String, String>;

fn get<'a>(annotations: Option<&'a Annotations>, key: &str) -> Option<&'a str> {
    annotations.and_then(|a| a.get(key)).map(|s| s.as_str())
}

/// Returns the ingress class annotation, preferring the project-specific
/// key over the kubernetes.io one.
pub fn ingress_class(annotations: Option<&Annotations>) -> Option<&str> {
    get(annotations, ANNOTATION_INGRESS_CLASS).or_else(|| get(annotations, ANNOTATION_K8S_INGRESS_CLASS))
}

/// True unless `kubernetes.io/ingress.allow-http` is explicitly "false".
pub fn http_allowed(annotations: Option<&Annotations>) -> bool {
    get(annotations, "kubernetes.io/ingress.allow-http") != Some("false")
}

/// True if `ingress.kubernetes.io/force-ssl-redirect` is "true".
pub fn tls_required(annotations: Option<&Annotations>) -> bool {
    get(annotations, "ingress.kubernetes.io/force-ssl-redirect") == Some("true")
}

/// Parses a base-10 u32; malformed or out-of-range values read as absent.
pub fn parse_u32(s: &str) -> Option<u32> {
    s.parse().ok()
}

fn parse_u32_annotation(annotations: Option<&Annotations>, key: &str) -> Option<u32> {
    get(annotations, key).and_then(parse_u32).filter(|v| *v > 0)
}

/// Circuit breaker thresholds from service annotations.
pub fn circuit_breakers(annotations: Option<&Annotations>) -> CircuitBreakers {
    CircuitBreakers {
        max_connections: parse_u32_annotation(annotations, ANNOTATION_MAX_CONNECTIONS),
        max_pending_requests: parse_u32_annotation(annotations, ANNOTATION_MAX_PENDING_REQUESTS),
        max_requests: parse_u32_annotation(annotations, ANNOTATION_MAX_REQUESTS),
        max_retries: parse_u32_annotation(annotations, ANNOTATION_MAX_RETRIES),
    }
}

/// Maps service port names and numbers to the protocol selected by the
/// `upstream-protocol.{tls,h2,h2c}` annotations.
pub fn upstream_protocols(annotations: Option<&Annotations>) -> BTreeMap<String, UpstreamProtocol> {
    let mut up = BTreeMap::new();
    for (suffix, protocol) in [
        ("tls", UpstreamProtocol::Tls),
        ("h2", UpstreamProtocol::H2),
        ("h2c", UpstreamProtocol::H2c),
    ] {
        let key = format!("{ANNOTATION_UPSTREAM_PROTOCOL}.{suffix}");
        if let Some(ports) = get(annotations, &key) {
            for port in ports.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                up.insert(port.to_string(), protocol);
            }
        }
    }
    up
}

/// The set of route prefixes upgraded to websockets.
pub fn websocket_routes(annotations: Option<&Annotations>) -> BTreeMap<String, bool> {
    let mut routes = BTreeMap::new();
    if let Some(v) = get(annotations, ANNOTATION_WEBSOCKET_ROUTES) {
        for route in v.split(',').map(str::trim).filter(|r| !r.is_empty()) {
            routes.insert(route.to_string(), true);
        }
    }
    routes
}

/// The per-route request timeout. Absent annotation means no policy;
/// `infinity` and unparseable values disable the timeout.
pub fn request_timeout(annotations: Option<&Annotations>) -> Option<TimeoutPolicy> {
    get(annotations, ANNOTATION_REQUEST_TIMEOUT).map(|v| TimeoutPolicy {
        request: parse_timeout(v),
    })
}

/// Parses a timeout field value.
pub fn parse_timeout(s: &str) -> Timeout {
    if s == "infinity" {
        return Timeout::Infinite;
    }
    parse_duration(s).map(Timeout::Duration).unwrap_or(Timeout::Infinite)
}

/// The retry policy, present only when `retry-on` names at least one
/// condition.
pub fn retry_policy(annotations: Option<&Annotations>) -> Option<RetryPolicy> {
    let retry_on = get(annotations, ANNOTATION_RETRY_ON)?;
    if retry_on.is_empty() {
        return None;
    }
    Some(RetryPolicy {
        retry_on: retry_on.to_string(),
        num_retries: parse_u32_annotation(annotations, ANNOTATION_NUM_RETRIES).unwrap_or(0),
        per_try_timeout: get(annotations, ANNOTATION_PER_TRY_TIMEOUT).and_then(parse_duration),
    })
}

/// The per-vhost minimum TLS version.
pub fn min_tls_version(annotations: Option<&Annotations>) -> Option<TlsVersion> {
    get(annotations, ANNOTATION_MIN_TLS_VERSION).map(TlsVersion::parse)
}

/// Parses a duration written as a sequence of `<number><unit>` terms, e.g.
/// `90s` or `1m30s`. Units: ms, s, m, h.
pub fn parse_duration(s: &str) -> Option<Duration> {
    if s.is_empty() {
        return None;
    }
    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        let value: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];
        let unit = if rest.starts_with("ms") {
            rest = &rest[2..];
            Duration::from_millis(value)
        } else if let Some(r) = rest.strip_prefix('s') {
            rest = r;
            Duration::from_secs(value)
        } else if let Some(r) = rest.strip_prefix('m') {
            rest = r;
            Duration::from_secs(value * 60)
        } else if let Some(r) = rest.strip_prefix('h') {
            rest = r;
            Duration::from_secs(value * 3600)
        } else {
            return None;
        };
        total += unit;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(kvs: &[(&str, &str)]) -> Annotations {
        kvs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn ingress_class_prefers_project_key() {
        let a = annotations(&[
            (ANNOTATION_INGRESS_CLASS, "linkerd"),
            (ANNOTATION_K8S_INGRESS_CLASS, "nginx"),
        ]);
        assert_eq!(ingress_class(Some(&a)), Some("linkerd"));

        let a = annotations(&[(ANNOTATION_K8S_INGRESS_CLASS, "nginx")]);
        assert_eq!(ingress_class(Some(&a)), Some("nginx"));
        assert_eq!(ingress_class(None), None);
    }

    #[test]
    fn malformed_numbers_read_as_absent() {
        let a = annotations(&[
            (ANNOTATION_MAX_PENDING_REQUESTS, "9999"),
            (ANNOTATION_MAX_REQUESTS, "1e6"),
            (ANNOTATION_MAX_RETRIES, "0"),
        ]);
        let cb = circuit_breakers(Some(&a));
        assert_eq!(cb.max_connections, None);
        assert_eq!(cb.max_pending_requests, Some(9999));
        assert_eq!(cb.max_requests, None);
        assert_eq!(cb.max_retries, None);
    }

    #[test]
    fn upstream_protocol_ports() {
        let a = annotations(&[("contour.heptio.com/upstream-protocol.tls", "securebackend,443")]);
        let up = upstream_protocols(Some(&a));
        assert_eq!(up.get("securebackend"), Some(&UpstreamProtocol::Tls));
        assert_eq!(up.get("443"), Some(&UpstreamProtocol::Tls));
        assert_eq!(up.get("80"), None);
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("bogus"), None);
    }

    #[test]
    fn timeouts() {
        assert_eq!(parse_timeout("infinity"), Timeout::Infinite);
        assert_eq!(
            parse_timeout("90s"),
            Timeout::Duration(Duration::from_secs(90))
        );
        // unparseable values disable the timeout rather than erroring
        assert_eq!(parse_timeout("not a duration"), Timeout::Infinite);
    }

    #[test]
    fn websocket_route_list() {
        let a = annotations(&[(ANNOTATION_WEBSOCKET_ROUTES, "/ws, /chat ,")]);
        let ws = websocket_routes(Some(&a));
        assert!(ws.contains_key("/ws"));
        assert!(ws.contains_key("/chat"));
        assert_eq!(ws.len(), 2);
    }
}
