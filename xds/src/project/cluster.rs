//! The CDS projection.

use std::collections::BTreeMap;

use gangway_core::Dag;
use gangway_envoy::pb::cluster::Cluster;

/// One cluster per unique cluster vertex. Vertices that differ only in
/// weight collapse onto the same name, and the first occurrence wins.
pub fn clusters(dag: &Dag) -> BTreeMap<String, Cluster> {
    let mut out = BTreeMap::new();
    for vertex in dag.clusters() {
        out.entry(vertex.name())
            .or_insert_with(|| gangway_envoy::cluster(vertex));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::testutil::*;
    use gangway_core::{HealthCheckPolicy, UpstreamProtocol, UpstreamValidation};
    use gangway_envoy::pb::cluster::{circuit_breakers, cluster as pb, CircuitBreakers};
    use gangway_envoy::pb::core as pbcore;

    fn expected_eds_cluster(name: &str, service_name: &str, stat_name: &str) -> Cluster {
        Cluster {
            name: name.to_string(),
            alt_stat_name: stat_name.to_string(),
            cluster_discovery_type: Some(pb::ClusterDiscoveryType::Type(
                pb::DiscoveryType::Eds as i32,
            )),
            eds_cluster_config: Some(pb::EdsClusterConfig {
                eds_config: Some(gangway_envoy::config_source()),
                service_name: service_name.to_string(),
            }),
            connect_timeout: Some(prost_types::Duration {
                seconds: 0,
                nanos: 250_000_000,
            }),
            lb_policy: pb::LbPolicy::RoundRobin as i32,
            common_lb_config: Some(pb::CommonLbConfig {
                healthy_panic_threshold: Some(pbcore::Percent { value: 0.0 }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn default_backend_projects_one_eds_cluster() {
        let dag = dag_with_vhost("*", vec![route("/", vec![cluster("default", "kuard", 80)])]);
        let got = clusters(&dag);
        assert_eq!(got.len(), 1);
        assert_eq!(
            got["default/kuard/80/da39a3ee5e"],
            expected_eds_cluster("default/kuard/80/da39a3ee5e", "default/kuard", "default_kuard_80"),
        );
    }

    #[test]
    fn long_service_names_are_truncated_but_stat_names_are_not() {
        let dag = dag_with_vhost(
            "*",
            vec![route(
                "/",
                vec![cluster(
                    "default",
                    "kbujbkuhdod66gjdmwmijz8xzgsx1nkfbrloezdjiulquzk4x3p0nnvpzi8r",
                    8080,
                )],
            )],
        );
        let got = clusters(&dag);
        let c = &got["default/kbujbkuh-c83ceb/8080/da39a3ee5e"];
        assert_eq!(
            c.alt_stat_name,
            "default_kbujbkuhdod66gjdmwmijz8xzgsx1nkfbrloezdjiulquzk4x3p0nnvpzi8r_8080"
        );
        assert_eq!(
            c.eds_cluster_config.as_ref().unwrap().service_name,
            "default/kbujbkuhdod66gjdmwmijz8xzgsx1nkfbrloezdjiulquzk4x3p0nnvpzi8r"
        );
    }

    #[test]
    fn weights_share_a_cluster_but_strategies_do_not() {
        let mut a = cluster("default", "kuard", 80);
        a.weight = 90;
        let mut b = cluster("default", "kuard", 80);
        b.weight = 60;
        let dag = dag_with_vhost(
            "www.example.com",
            vec![route("/a", vec![a]), route("/b", vec![b])],
        );
        assert_eq!(clusters(&dag).len(), 1);

        let mut a = cluster("default", "kuard", 80);
        a.lb_strategy = "Random".to_string();
        let mut b = cluster("default", "kuard", 80);
        b.lb_strategy = "WeightedLeastRequest".to_string();
        let dag = dag_with_vhost(
            "www.example.com",
            vec![route("/a", vec![a]), route("/b", vec![b])],
        );
        let got = clusters(&dag);
        assert_eq!(got.len(), 2);
        assert_eq!(
            got["default/kuard/80/58d888c08a"].lb_policy,
            pb::LbPolicy::Random as i32
        );
        assert_eq!(
            got["default/kuard/80/8bf87fefba"].lb_policy,
            pb::LbPolicy::LeastRequest as i32
        );
    }

    #[test]
    fn circuit_breaker_annotations_become_thresholds() {
        let mut vertex = cluster("default", "kuard", 8080);
        vertex.upstream.circuit_breakers.max_connections = Some(9000);
        vertex.upstream.circuit_breakers.max_pending_requests = Some(4096);
        vertex.upstream.circuit_breakers.max_requests = Some(404);
        vertex.upstream.circuit_breakers.max_retries = Some(7);
        let dag = dag_with_vhost("*", vec![route("/", vec![vertex])]);
        let got = clusters(&dag);
        assert_eq!(
            got["default/kuard/8080/da39a3ee5e"].circuit_breakers,
            Some(CircuitBreakers {
                thresholds: vec![circuit_breakers::Thresholds {
                    max_connections: Some(9000),
                    max_pending_requests: Some(4096),
                    max_requests: Some(404),
                    max_retries: Some(7),
                }],
            })
        );
    }

    #[test]
    fn external_name_services_use_strict_dns() {
        let mut vertex = cluster("default", "kuard", 80);
        vertex.upstream.external_name = Some("foo.io".to_string());
        let dag = dag_with_vhost("*", vec![route("/", vec![vertex])]);
        let got = clusters(&dag);
        let c = &got["default/kuard/80/da39a3ee5e"];
        assert_eq!(
            c.cluster_discovery_type,
            Some(pb::ClusterDiscoveryType::Type(
                pb::DiscoveryType::StrictDns as i32
            ))
        );
        assert!(c.eds_cluster_config.is_none());
        let assignment = c.load_assignment.as_ref().unwrap();
        assert_eq!(assignment.cluster_name, "default/kuard");
        assert_eq!(assignment.endpoints.len(), 1);
    }

    #[test]
    fn tls_upstreams_get_a_transport_socket() {
        let mut vertex = cluster("default", "kuard", 443);
        vertex.upstream.protocol = Some(UpstreamProtocol::Tls);
        let dag = dag_with_vhost("*", vec![route("/", vec![vertex])]);
        let got = clusters(&dag);
        let socket = got["default/kuard/443/da39a3ee5e"]
            .transport_socket
            .as_ref()
            .unwrap();
        assert_eq!(socket.name, "envoy.transport_sockets.tls");
    }

    #[test]
    fn upstream_validation_changes_the_cluster_name() {
        let mut vertex = cluster("default", "kuard", 443);
        vertex.upstream.protocol = Some(UpstreamProtocol::Tls);
        vertex.upstream_validation = Some(UpstreamValidation {
            ca_secret_name: "foo".to_string(),
            ca: b"ca".to_vec(),
            subject_name: "subjname".to_string(),
        });
        let dag = dag_with_vhost("*", vec![route("/", vec![vertex])]);
        let got = clusters(&dag);
        assert!(got.contains_key("default/kuard/443/98c0f31c72"));
    }

    #[test]
    fn health_checks_apply_projection_defaults() {
        let mut vertex = cluster("default", "kuard", 80);
        vertex.health_check = Some(HealthCheckPolicy {
            path: "/healthz".to_string(),
            ..Default::default()
        });
        let dag = dag_with_vhost("*", vec![route("/", vec![vertex])]);
        let got = clusters(&dag);
        let c = &got["default/kuard/80/bc862a33ca"];
        let hc = &c.health_checks[0];
        assert_eq!(hc.timeout, Some(prost_types::Duration { seconds: 2, nanos: 0 }));
        assert_eq!(hc.interval, Some(prost_types::Duration { seconds: 10, nanos: 0 }));
        assert_eq!(hc.unhealthy_threshold, Some(3));
        assert_eq!(hc.healthy_threshold, Some(2));
        assert!(c.ignore_health_on_host_removal);
    }
}
