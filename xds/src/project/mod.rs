//! Projection: read-only visitors turning the routing graph into the
//! name-keyed discovery resource maps.

use gangway_core::TlsVersion;

mod cluster;
mod listener;
mod route;
mod secret;

pub use self::cluster::clusters;
pub use self::listener::listeners;
pub use self::route::routes;
pub use self::secret::secrets;

/// Listener-shaping configuration, fixed at startup.
#[derive(Clone, Debug)]
pub struct ListenerConfig {
    pub http_address: String,
    pub http_port: u16,
    pub http_access_log: String,
    pub https_address: String,
    pub https_port: u16,
    pub https_access_log: String,
    pub stats_address: String,
    pub stats_port: u16,
    pub use_proxy_proto: bool,
    /// Cluster-wide floor; a document may raise but never lower it.
    pub minimum_tls_version: TlsVersion,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ListenerConfig {
            http_address: "0.0.0.0".to_string(),
            http_port: 8080,
            http_access_log: "/dev/stdout".to_string(),
            https_address: "0.0.0.0".to_string(),
            https_port: 8443,
            https_access_log: "/dev/stdout".to_string(),
            stats_address: "0.0.0.0".to_string(),
            stats_port: 8002,
            use_proxy_proto: false,
            minimum_tls_version: TlsVersion::V1_1,
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use gangway_core::{CircuitBreakers, Cluster, Dag, Route, ServicePort};
    use std::collections::BTreeMap;

    pub fn upstream(ns: &str, name: &str, port: u16) -> ServicePort {
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

    pub fn cluster(ns: &str, name: &str, port: u16) -> Cluster {
        Cluster {
            upstream: upstream(ns, name, port),
            weight: 0,
            lb_strategy: String::new(),
            health_check: None,
            upstream_validation: None,
        }
    }

    pub fn route(prefix: &str, clusters: Vec<Cluster>) -> Route {
        let mut r = Route::new(prefix);
        r.clusters = clusters;
        r
    }

    pub fn dag_with_vhost(fqdn: &str, routes: Vec<Route>) -> Dag {
        let mut dag = Dag::default();
        let vh = dag
            .virtual_hosts
            .entry(fqdn.to_string())
            .or_insert_with(|| gangway_core::VirtualHost {
                fqdn: fqdn.to_string(),
                routes: BTreeMap::new(),
            });
        for r in routes {
            vh.routes.insert(r.prefix.clone(), r);
        }
        dag
    }
}
