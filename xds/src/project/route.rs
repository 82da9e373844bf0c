//! The RDS projection.

use std::collections::BTreeMap;

use gangway_core::{Dag, Route as RouteVertex};
use gangway_envoy::pb::route::{Route, RouteConfiguration, VirtualHost};

use super::listener::{INGRESS_HTTP, INGRESS_HTTPS};

/// One route configuration per listener. Both are always emitted so that a
/// proxy subscribed by name never waits on a config that will not come.
pub fn routes(dag: &Dag) -> BTreeMap<String, RouteConfiguration> {
    let mut out = BTreeMap::new();

    let insecure = dag
        .virtual_hosts
        .values()
        .filter(|vh| !vh.routes.is_empty())
        .map(|vh| virtual_host(&vh.fqdn, vh.routes.values()))
        .collect();
    out.insert(
        INGRESS_HTTP.to_string(),
        RouteConfiguration {
            name: INGRESS_HTTP.to_string(),
            virtual_hosts: insecure,
        },
    );

    let secure = dag
        .secure_virtual_hosts
        .values()
        .filter(|vh| vh.secret.is_some() && !vh.routes.is_empty())
        .map(|vh| virtual_host(&vh.fqdn, vh.routes.values()))
        .collect();
    out.insert(
        INGRESS_HTTPS.to_string(),
        RouteConfiguration {
            name: INGRESS_HTTPS.to_string(),
            virtual_hosts: secure,
        },
    );

    out
}

fn virtual_host<'a>(fqdn: &str, routes: impl Iterator<Item = &'a RouteVertex>) -> VirtualHost {
    let mut sorted: Vec<&RouteVertex> = routes.collect();
    // longest prefix first; ties broken lexicographically
    sorted.sort_by(|a, b| {
        b.prefix
            .len()
            .cmp(&a.prefix.len())
            .then_with(|| a.prefix.cmp(&b.prefix))
    });

    let domains = if fqdn == "*" {
        vec!["*".to_string()]
    } else {
        vec![fqdn.to_string(), format!("{fqdn}:*")]
    };

    VirtualHost {
        name: fqdn.to_string(),
        domains,
        routes: sorted.into_iter().map(envoy_route).collect(),
    }
}

fn envoy_route(vertex: &RouteVertex) -> Route {
    if vertex.https_upgrade {
        gangway_envoy::route_upgrade_https(&vertex.prefix)
    } else {
        gangway_envoy::route_route(vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::testutil::*;
    use gangway_envoy::pb::route::{route, route_action, route_match};

    fn prefixes(vh: &VirtualHost) -> Vec<String> {
        vh.routes
            .iter()
            .map(|r| match r.r#match.as_ref().unwrap().path_specifier.as_ref().unwrap() {
                route_match::PathSpecifier::Prefix(p) => p.clone(),
                route_match::PathSpecifier::Path(p) => p.clone(),
            })
            .collect()
    }

    #[test]
    fn both_route_configurations_are_always_emitted() {
        let got = routes(&Dag::default());
        assert_eq!(got.len(), 2);
        assert!(got[INGRESS_HTTP].virtual_hosts.is_empty());
        assert!(got[INGRESS_HTTPS].virtual_hosts.is_empty());
    }

    #[test]
    fn routes_sort_longest_prefix_first() {
        let dag = dag_with_vhost(
            "example.com",
            vec![
                route("/", vec![cluster("default", "a", 80)]),
                route("/kuarder", vec![cluster("default", "b", 80)]),
                route("/kuard", vec![cluster("default", "c", 80)]),
                route("/kuarded", vec![cluster("default", "d", 80)]),
            ],
        );
        let got = routes(&dag);
        let vh = &got[INGRESS_HTTP].virtual_hosts[0];
        assert_eq!(vh.domains, vec!["example.com", "example.com:*"]);
        assert_eq!(prefixes(vh), ["/kuarded", "/kuarder", "/kuard", "/"]);
    }

    #[test]
    fn upgrade_routes_redirect_on_the_insecure_listener() {
        let mut upgraded = route("/", vec![cluster("default", "backend", 80)]);
        upgraded.https_upgrade = true;
        let dag = dag_with_vhost("example.com", vec![upgraded]);
        let got = routes(&dag);
        let r = &got[INGRESS_HTTP].virtual_hosts[0].routes[0];
        assert!(matches!(r.action, Some(route::Action::Redirect(_))));
    }

    #[test]
    fn weighted_routes_normalize_all_zero_weights() {
        let dag = dag_with_vhost(
            "example.com",
            vec![route(
                "/",
                vec![cluster("default", "a", 80), cluster("default", "b", 80)],
            )],
        );
        let got = routes(&dag);
        let r = &got[INGRESS_HTTP].virtual_hosts[0].routes[0];
        let action = match &r.action {
            Some(route::Action::Route(action)) => action,
            other => panic!("expected a forwarding action, got {other:?}"),
        };
        let weighted = match action.cluster_specifier.as_ref().unwrap() {
            route_action::ClusterSpecifier::WeightedClusters(wc) => wc,
            other => panic!("expected weighted clusters, got {other:?}"),
        };
        assert_eq!(weighted.clusters.len(), 2);
        assert!(weighted.clusters.iter().all(|c| c.weight == Some(1)));
    }

    #[test]
    fn websocket_routes_carry_an_upgrade_config() {
        let mut ws = route("/ws", vec![cluster("default", "backend", 80)]);
        ws.websocket = true;
        let dag = dag_with_vhost("example.com", vec![ws]);
        let got = routes(&dag);
        let r = &got[INGRESS_HTTP].virtual_hosts[0].routes[0];
        let action = match &r.action {
            Some(route::Action::Route(action)) => action,
            other => panic!("expected a forwarding action, got {other:?}"),
        };
        assert_eq!(action.upgrade_configs[0].upgrade_type, "websocket");
    }

    #[test]
    fn hsts_routes_insert_the_header_on_the_secure_side() {
        use gangway_core::{SecureVirtualHost, TlsVersion};
        use std::collections::BTreeMap;

        let mut secure_route = route("/", vec![cluster("default", "backend", 80)]);
        secure_route.hsts = true;
        let mut dag = Dag::default();
        dag.secure_virtual_hosts.insert(
            "example.com".to_string(),
            SecureVirtualHost {
                fqdn: "example.com".to_string(),
                routes: [(secure_route.prefix.clone(), secure_route)]
                    .into_iter()
                    .collect::<BTreeMap<_, _>>(),
                secret: Some(gangway_core::Secret {
                    namespace: "default".to_string(),
                    name: "secret".to_string(),
                    cert: b"cert".to_vec(),
                    key: b"key".to_vec(),
                }),
                min_tls_version: TlsVersion::V1_1,
                tcp_proxy: None,
            },
        );
        let got = routes(&dag);
        let r = &got[INGRESS_HTTPS].virtual_hosts[0].routes[0];
        let header = r.response_headers_to_add[0].header.as_ref().unwrap();
        assert_eq!(header.key, "Strict-Transport-Security");
    }
}
