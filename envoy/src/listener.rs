//! Listener (LDS) message construction.

use gangway_core::{Secret, TcpProxy as TcpProxyVertex, TlsVersion};

use crate::pb::core as pbcore;
use crate::pb::filters::{
    self, AccessLog, FileAccessLog, HttpConnectionManager, HttpFilter, ProxyProtocol, Rds, Router,
    TcpProxy, TlsInspector,
};
use crate::pb::listener::{Filter, FilterChain, FilterChainMatch, Listener, ListenerFilter};
use crate::pb::route::{self, RouteConfiguration};
use crate::pb::type_urls;

/// TCP proxy sessions are torn down after this much idle time. Generous on
/// purpose: long-lived TLS passthrough sessions are the norm here.
const TCP_IDLE_TIMEOUT_SECS: i64 = 9001;

/// The static cluster (from the proxy bootstrap) backing the stats vhost.
const STATS_CLUSTER: &str = "service-stats";

pub fn socket_address(address: &str, port: u16) -> pbcore::Address {
    pbcore::Address {
        address: Some(pbcore::address::Address::SocketAddress(
            pbcore::SocketAddress {
                protocol: pbcore::socket_address::Protocol::Tcp as i32,
                address: address.to_string(),
                port_specifier: Some(pbcore::socket_address::PortSpecifier::PortValue(
                    port as u32,
                )),
            },
        )),
    }
}

fn file_access_log(path: &str) -> AccessLog {
    AccessLog {
        name: "envoy.access_loggers.file".to_string(),
        config_type: Some(filters::access_log::ConfigType::TypedConfig(crate::any(
            type_urls::FILE_ACCESS_LOG,
            &FileAccessLog {
                path: path.to_string(),
            },
        ))),
    }
}

fn router() -> HttpFilter {
    HttpFilter {
        name: "envoy.filters.http.router".to_string(),
        config_type: Some(filters::http_filter::ConfigType::TypedConfig(crate::any(
            type_urls::ROUTER,
            &Router {},
        ))),
    }
}

/// An HTTP connection manager bound to the RDS route configuration of the
/// same name.
pub fn http_connection_manager(route_config_name: &str, access_log_path: &str) -> Filter {
    let hcm = HttpConnectionManager {
        stat_prefix: route_config_name.to_string(),
        route_specifier: Some(filters::http_connection_manager::RouteSpecifier::Rds(Rds {
            config_source: Some(crate::cluster::config_source()),
            route_config_name: route_config_name.to_string(),
        })),
        http_filters: vec![router()],
        use_remote_address: Some(true),
        access_log: vec![file_access_log(access_log_path)],
    };
    Filter {
        name: "envoy.filters.network.http_connection_manager".to_string(),
        config_type: Some(crate::pb::listener::filter::ConfigType::TypedConfig(
            crate::any(type_urls::HTTP_CONNECTION_MANAGER, &hcm),
        )),
    }
}

/// A TCP proxy network filter forwarding to the vertex's clusters.
pub fn tcp_proxy(stat_prefix: &str, proxy: &TcpProxyVertex, access_log_path: &str) -> Filter {
    let cluster_specifier = if proxy.clusters.len() == 1 {
        filters::tcp_proxy::ClusterSpecifier::Cluster(proxy.clusters[0].name())
    } else {
        let mut clusters: Vec<_> = proxy
            .clusters
            .iter()
            .map(|c| filters::tcp_proxy::weighted_cluster::ClusterWeight {
                name: c.name(),
                weight: c.weight.max(1),
            })
            .collect();
        clusters.sort_by(|a, b| a.name.cmp(&b.name));
        filters::tcp_proxy::ClusterSpecifier::WeightedClusters(
            filters::tcp_proxy::WeightedCluster { clusters },
        )
    };
    let proxy = TcpProxy {
        stat_prefix: stat_prefix.to_string(),
        cluster_specifier: Some(cluster_specifier),
        access_log: vec![file_access_log(access_log_path)],
        idle_timeout: Some(crate::cluster::seconds(TCP_IDLE_TIMEOUT_SECS)),
    };
    Filter {
        name: "envoy.filters.network.tcp_proxy".to_string(),
        config_type: Some(crate::pb::listener::filter::ConfigType::TypedConfig(
            crate::any(type_urls::TCP_PROXY, &proxy),
        )),
    }
}

pub fn tls_inspector() -> ListenerFilter {
    ListenerFilter {
        name: "envoy.filters.listener.tls_inspector".to_string(),
        config_type: Some(crate::pb::listener::listener_filter::ConfigType::TypedConfig(
            crate::any(type_urls::TLS_INSPECTOR, &TlsInspector {}),
        )),
    }
}

pub fn proxy_protocol() -> ListenerFilter {
    ListenerFilter {
        name: "envoy.filters.listener.proxy_protocol".to_string(),
        config_type: Some(crate::pb::listener::listener_filter::ConfigType::TypedConfig(
            crate::any(type_urls::PROXY_PROTOCOL, &ProxyProtocol {}),
        )),
    }
}

/// A filter chain selected by SNI. `secret` present means we terminate TLS
/// on this chain; absent means passthrough and the caller installs a TCP
/// proxy filter only.
pub fn filter_chain_tls(
    fqdn: &str,
    secret: Option<&Secret>,
    min_tls_version: TlsVersion,
    alpn: &[&str],
    filters: Vec<Filter>,
) -> FilterChain {
    FilterChain {
        filter_chain_match: Some(FilterChainMatch {
            server_names: vec![fqdn.to_string()],
        }),
        transport_socket: secret.map(|s| {
            let ctx = crate::secret::downstream_tls_context(s, min_tls_version, alpn);
            pbcore::TransportSocket {
                name: "envoy.transport_sockets.tls".to_string(),
                config_type: Some(pbcore::transport_socket::ConfigType::TypedConfig(
                    crate::any(type_urls::DOWNSTREAM_TLS_CONTEXT, &ctx),
                )),
            }
        }),
        filters,
    }
}

/// The always-on stats listener: a static vhost routing `/stats` to the
/// bootstrap's stats cluster.
pub fn stats_listener(address: &str, port: u16) -> Listener {
    let route_config = RouteConfiguration {
        name: "stats".to_string(),
        virtual_hosts: vec![route::VirtualHost {
            name: "backend".to_string(),
            domains: vec!["*".to_string()],
            routes: vec![route::Route {
                r#match: Some(route::RouteMatch {
                    path_specifier: Some(route::route_match::PathSpecifier::Prefix(
                        "/stats".to_string(),
                    )),
                }),
                action: Some(route::route::Action::Route(route::RouteAction {
                    cluster_specifier: Some(route::route_action::ClusterSpecifier::Cluster(
                        STATS_CLUSTER.to_string(),
                    )),
                    ..Default::default()
                })),
                response_headers_to_add: Vec::new(),
            }],
        }],
    };
    let hcm = HttpConnectionManager {
        stat_prefix: "stats".to_string(),
        route_specifier: Some(filters::http_connection_manager::RouteSpecifier::RouteConfig(
            route_config,
        )),
        http_filters: vec![router()],
        use_remote_address: Some(true),
        access_log: Vec::new(),
    };
    Listener {
        name: "stats".to_string(),
        address: Some(socket_address(address, port)),
        filter_chains: vec![FilterChain {
            filter_chain_match: None,
            filters: vec![Filter {
                name: "envoy.filters.network.http_connection_manager".to_string(),
                config_type: Some(crate::pb::listener::filter::ConfigType::TypedConfig(
                    crate::any(type_urls::HTTP_CONNECTION_MANAGER, &hcm),
                )),
            }],
            transport_socket: None,
        }],
        listener_filters: Vec::new(),
    }
}
