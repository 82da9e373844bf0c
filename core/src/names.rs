//! Stable wire names for projected resources.
//!
//! Cluster names look like `<ns>/<svc>/<port>/<hash>` where the hash covers
//! the policy tuple but not the weight. Names longer than 60 characters are
//! shortened segment by segment, substituting a digest of the full natural
//! name so the result stays injective.

use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::dag::Secret;
use crate::policy::Cluster;

const MAX_CLUSTER_NAME_LEN: usize = 60;
const SHORT_HASH_LEN: usize = 6;

/// Hex digest of the cluster's policy tuple, truncated to 5 bytes. The
/// empty tuple hashes to `da39a3ee5e`.
pub fn policy_hash(c: &Cluster) -> String {
    let mut buf = String::new();
    buf.push_str(&c.lb_strategy);
    if let Some(hc) = &c.health_check {
        if hc.timeout_seconds > 0 {
            buf.push_str(&format!("{}s", hc.timeout_seconds));
        }
        if hc.interval_seconds > 0 {
            buf.push_str(&format!("{}s", hc.interval_seconds));
        }
        if hc.unhealthy_threshold > 0 {
            buf.push_str(&hc.unhealthy_threshold.to_string());
        }
        if hc.healthy_threshold > 0 {
            buf.push_str(&hc.healthy_threshold.to_string());
        }
        buf.push_str(&hc.path);
    }
    if let Some(uv) = &c.upstream_validation {
        buf.push_str(&uv.ca_secret_name);
        buf.push_str(&uv.subject_name);
    }
    short_sha1(buf.as_bytes())
}

/// The CDS name of a cluster.
pub fn cluster_name(c: &Cluster) -> String {
    hashname(
        MAX_CLUSTER_NAME_LEN,
        &[
            &c.upstream.namespace,
            &c.upstream.name,
            &c.upstream.port.to_string(),
            &policy_hash(c),
        ],
    )
}

/// The stat name of a cluster. Never truncated; Envoy has no length limit
/// on alt stat names.
pub fn alt_stat_name(c: &Cluster) -> String {
    format!(
        "{}_{}_{}",
        c.upstream.namespace, c.upstream.name, c.upstream.port
    )
}

/// The SDS name of a secret: `<ns>/<name>/<10 hex of the cert digest>`.
pub fn secret_name(s: &Secret) -> String {
    hashname(
        MAX_CLUSTER_NAME_LEN,
        &[&s.namespace, &s.name, &short_sha1(&s.cert)],
    )
}

/// Joins `parts` with `/`, shortening segments from the last toward the
/// first when the joined form reaches `limit`. A shortened segment keeps a
/// prefix and gains `-<6 hex of SHA-256(joined)>`, which keeps distinct
/// inputs distinct.
pub fn hashname(limit: usize, parts: &[&str]) -> String {
    let joined = parts.join("/");
    if limit > joined.len() {
        return joined;
    }

    let digest = hex(&Sha256::digest(joined.as_bytes()));
    let per_segment = limit / parts.len();
    let mut parts: Vec<String> = parts.iter().map(|s| s.to_string()).collect();
    for n in (0..parts.len()).rev() {
        parts[n] = truncate(per_segment, &parts[n], &digest[..SHORT_HASH_LEN]);
        let joined = parts.join("/");
        if limit > joined.len() {
            return joined;
        }
    }

    // Everything was shortened and the name still does not fit. Fall back
    // to the bare digest.
    digest[..limit.min(digest.len())].to_string()
}

/// Shortens `s` to at most `limit` characters, marking the cut with
/// `-<suffix>`.
fn truncate(limit: usize, s: &str, suffix: &str) -> String {
    if limit >= s.len() {
        return s.to_string();
    }
    if limit <= suffix.len() {
        return suffix[..limit.min(suffix.len())].to_string();
    }
    format!("{}-{}", &s[..limit - suffix.len() - 1], suffix)
}

fn short_sha1(data: &[u8]) -> String {
    let digest = Sha1::digest(data);
    hex(&digest[..5])
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CircuitBreakers, HealthCheckPolicy, UpstreamValidation};
    use crate::ServicePort;

    fn upstream(ns: &str, name: &str, port: u16) -> ServicePort {
        ServicePort {
            namespace: ns.to_string(),
            name: name.to_string(),
            port,
            port_name: String::new(),
            external_name: None,
            protocol: None,
            circuit_breakers: CircuitBreakers::default(),
        }
    }

    fn cluster(ns: &str, name: &str, port: u16) -> Cluster {
        Cluster {
            upstream: upstream(ns, name, port),
            weight: 0,
            lb_strategy: String::new(),
            health_check: None,
            upstream_validation: None,
        }
    }

    #[test]
    fn simple_cluster_name() {
        let c = cluster("default", "kuard", 80);
        assert_eq!(c.name(), "default/kuard/80/da39a3ee5e");
        assert_eq!(alt_stat_name(&c), "default_kuard_80");
    }

    #[test]
    fn long_service_names_are_truncated() {
        let c = cluster(
            "default",
            "kbujbkuhdod66gjdmwmijz8xzgsx1nkfbrloezdjiulquzk4x3p0nnvpzi8r",
            8080,
        );
        let name = c.name();
        assert_eq!(name, "default/kbujbkuh-c83ceb/8080/da39a3ee5e");
        assert!(name.len() <= 60);
        // the alt stat name is never truncated
        assert_eq!(
            alt_stat_name(&c),
            "default_kbujbkuhdod66gjdmwmijz8xzgsx1nkfbrloezdjiulquzk4x3p0nnvpzi8r_8080"
        );
    }

    #[test]
    fn truncation_is_injective_over_shared_prefixes() {
        let a = cluster(
            "default",
            "kbujbkuhdod66gjdmwmijz8xzgsx1nkfbrloezdjiulquzk4x3p0nnvpzi8r",
            8080,
        );
        let b = cluster(
            "default",
            "kbujbkuhdod66gjdmwmijz8xzgsx1nkfbrloezdjiulquzk4x3p0nnvpzi8s",
            8080,
        );
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn strategy_changes_the_hash() {
        let mut c = cluster("default", "kuard", 80);
        c.lb_strategy = "Random".to_string();
        assert_eq!(c.name(), "default/kuard/80/58d888c08a");
        c.lb_strategy = "WeightedLeastRequest".to_string();
        assert_eq!(c.name(), "default/kuard/80/8bf87fefba");
    }

    #[test]
    fn weight_does_not_change_the_name() {
        let mut a = cluster("default", "kuard", 80);
        let mut b = cluster("default", "kuard", 80);
        a.weight = 90;
        b.weight = 60;
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn health_check_changes_the_hash() {
        let mut c = cluster("default", "kuard", 80);
        c.health_check = Some(HealthCheckPolicy {
            path: "/healthz".to_string(),
            ..Default::default()
        });
        assert_eq!(c.name(), "default/kuard/80/bc862a33ca");
    }

    #[test]
    fn upstream_validation_changes_the_hash() {
        let mut c = cluster("default", "kuard", 443);
        c.upstream_validation = Some(UpstreamValidation {
            ca_secret_name: "foo".to_string(),
            ca: b"ca".to_vec(),
            subject_name: "subjname".to_string(),
        });
        assert_eq!(c.name(), "default/kuard/443/98c0f31c72");
    }

    #[test]
    fn secret_names_track_the_certificate() {
        let s = Secret {
            namespace: "default".to_string(),
            name: "secret".to_string(),
            cert: b"cert".to_vec(),
            key: b"key".to_vec(),
        };
        assert_eq!(s.wire_name(), "default/secret/cd1b506996");

        let a = Secret {
            name: "secret-a".to_string(),
            cert: b"cert-a".to_vec(),
            key: b"key-a".to_vec(),
            ..s.clone()
        };
        assert_eq!(a.wire_name(), "default/secret-a/ff2a9f58ca");

        let rotated = Secret {
            cert: b"cert-b".to_vec(),
            ..s
        };
        assert_ne!(rotated.wire_name(), "default/secret/cd1b506996");
    }
}
