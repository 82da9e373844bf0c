//! Cluster (CDS) message construction.

use gangway_core::{names, Cluster as ClusterVertex, UpstreamProtocol};

use crate::pb::cluster::{circuit_breakers, cluster, CircuitBreakers, Cluster};
use crate::pb::core as pbcore;
use crate::pb::type_urls;

/// Upstream connections are considered failed if they take longer than this
/// to establish.
const CONNECT_TIMEOUT_MS: i32 = 250;

/// Default active health checking parameters, applied where the policy
/// leaves a value unset.
const HC_TIMEOUT_SECS: i64 = 2;
const HC_INTERVAL_SECS: i64 = 10;
const HC_UNHEALTHY_THRESHOLD: u32 = 3;
const HC_HEALTHY_THRESHOLD: u32 = 2;
const HC_HOST: &str = "gangway-envoy-healthcheck";

/// The config source proxies use to reach this controller's EDS endpoint.
/// The named cluster is defined statically in the proxy's bootstrap.
pub fn config_source() -> pbcore::ConfigSource {
    pbcore::ConfigSource {
        config_source_specifier: Some(pbcore::config_source::ConfigSourceSpecifier::ApiConfigSource(
            pbcore::ApiConfigSource {
                api_type: pbcore::api_config_source::ApiType::Grpc as i32,
                cluster_names: Vec::new(),
                grpc_services: vec![pbcore::GrpcService {
                    target_specifier: Some(pbcore::grpc_service::TargetSpecifier::EnvoyGrpc(
                        pbcore::grpc_service::EnvoyGrpc {
                            cluster_name: crate::XDS_CLUSTER_NAME.to_string(),
                        },
                    )),
                }],
                transport_api_version: pbcore::ApiVersion::V3 as i32,
            },
        )),
        resource_api_version: pbcore::ApiVersion::V3 as i32,
    }
}

/// Projects one DAG cluster vertex to its CDS message.
pub fn cluster(c: &ClusterVertex) -> Cluster {
    let mut out = Cluster {
        name: c.name(),
        alt_stat_name: names::alt_stat_name(c),
        connect_timeout: Some(millis(CONNECT_TIMEOUT_MS)),
        lb_policy: lb_policy(&c.lb_strategy) as i32,
        common_lb_config: Some(cluster::CommonLbConfig {
            healthy_panic_threshold: Some(pbcore::Percent { value: 0.0 }),
        }),
        ..Default::default()
    };

    match &c.upstream.external_name {
        // ExternalName services have no endpoints in the cluster; resolve
        // the DNS name on the proxy and synthesize the assignment here.
        Some(dns_name) => {
            out.cluster_discovery_type = Some(cluster::ClusterDiscoveryType::Type(
                cluster::DiscoveryType::StrictDns as i32,
            ));
            out.load_assignment = Some(crate::endpoint::cluster_load_assignment(
                &c.upstream.eds_name(),
                vec![crate::endpoint::lb_endpoint(dns_name, c.upstream.port)],
            ));
        }
        None => {
            out.cluster_discovery_type = Some(cluster::ClusterDiscoveryType::Type(
                cluster::DiscoveryType::Eds as i32,
            ));
            out.eds_cluster_config = Some(cluster::EdsClusterConfig {
                eds_config: Some(config_source()),
                service_name: c.upstream.eds_name(),
            });
        }
    }

    if let Some(t) = thresholds(c) {
        out.circuit_breakers = Some(CircuitBreakers {
            thresholds: vec![t],
        });
    }

    if let Some(hc) = &c.health_check {
        out.health_checks = vec![pbcore::HealthCheck {
            timeout: Some(seconds(opt(hc.timeout_seconds as i64, HC_TIMEOUT_SECS))),
            interval: Some(seconds(opt(hc.interval_seconds as i64, HC_INTERVAL_SECS))),
            unhealthy_threshold: Some(if hc.unhealthy_threshold > 0 {
                hc.unhealthy_threshold
            } else {
                HC_UNHEALTHY_THRESHOLD
            }),
            healthy_threshold: Some(if hc.healthy_threshold > 0 {
                hc.healthy_threshold
            } else {
                HC_HEALTHY_THRESHOLD
            }),
            health_checker: Some(pbcore::health_check::HealthChecker::HttpHealthCheck(
                pbcore::health_check::HttpHealthCheck {
                    host: if hc.host.is_empty() {
                        HC_HOST.to_string()
                    } else {
                        hc.host.clone()
                    },
                    path: hc.path.clone(),
                },
            )),
        }];
        out.ignore_health_on_host_removal = true;
    }

    match c.upstream.protocol {
        Some(UpstreamProtocol::Tls) => {
            out.transport_socket = Some(upstream_tls_transport_socket(c, &[]));
        }
        Some(UpstreamProtocol::H2) => {
            out.transport_socket = Some(upstream_tls_transport_socket(c, &["h2"]));
        }
        // h2c is cleartext; nothing to install at this layer.
        Some(UpstreamProtocol::H2c) | None => {}
    }

    out
}

fn upstream_tls_transport_socket(c: &ClusterVertex, alpn: &[&str]) -> pbcore::TransportSocket {
    let ctx = crate::secret::upstream_tls_context(c.upstream_validation.as_ref(), alpn);
    pbcore::TransportSocket {
        name: "envoy.transport_sockets.tls".to_string(),
        config_type: Some(pbcore::transport_socket::ConfigType::TypedConfig(
            crate::any(type_urls::UPSTREAM_TLS_CONTEXT, &ctx),
        )),
    }
}

fn lb_policy(strategy: &str) -> cluster::LbPolicy {
    match strategy {
        "WeightedLeastRequest" => cluster::LbPolicy::LeastRequest,
        "Random" => cluster::LbPolicy::Random,
        "RingHash" | "Cookie" => cluster::LbPolicy::RingHash,
        "Maglev" => cluster::LbPolicy::Maglev,
        _ => cluster::LbPolicy::RoundRobin,
    }
}

fn thresholds(c: &ClusterVertex) -> Option<circuit_breakers::Thresholds> {
    let cb = &c.upstream.circuit_breakers;
    if cb.max_connections.is_none()
        && cb.max_pending_requests.is_none()
        && cb.max_requests.is_none()
        && cb.max_retries.is_none()
    {
        return None;
    }
    Some(circuit_breakers::Thresholds {
        max_connections: cb.max_connections,
        max_pending_requests: cb.max_pending_requests,
        max_requests: cb.max_requests,
        max_retries: cb.max_retries,
    })
}

fn opt(v: i64, default: i64) -> i64 {
    if v > 0 {
        v
    } else {
        default
    }
}

pub(crate) fn seconds(secs: i64) -> prost_types::Duration {
    prost_types::Duration {
        seconds: secs,
        nanos: 0,
    }
}

pub(crate) fn millis(ms: i32) -> prost_types::Duration {
    prost_types::Duration {
        seconds: (ms / 1000) as i64,
        nanos: (ms % 1000) * 1_000_000,
    }
}
