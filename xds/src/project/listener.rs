//! The LDS projection.

use std::collections::BTreeMap;

use gangway_core::Dag;
use gangway_envoy::pb::listener::Listener;

use super::ListenerConfig;

pub const INGRESS_HTTP: &str = "ingress_http";
pub const INGRESS_HTTPS: &str = "ingress_https";

/// The stats listener is always served; `ingress_http` appears when some
/// plain-text virtual host has routes, `ingress_https` when any secure
/// virtual host exists.
pub fn listeners(dag: &Dag, config: &ListenerConfig) -> BTreeMap<String, Listener> {
    let mut out = BTreeMap::new();

    let stats = gangway_envoy::stats_listener(&config.stats_address, config.stats_port);
    out.insert(stats.name.clone(), stats);

    let mut base_filters = Vec::new();
    if config.use_proxy_proto {
        base_filters.push(gangway_envoy::proxy_protocol());
    }

    if dag.virtual_hosts.values().any(|vh| !vh.routes.is_empty()) {
        out.insert(
            INGRESS_HTTP.to_string(),
            Listener {
                name: INGRESS_HTTP.to_string(),
                address: Some(gangway_envoy::socket_address(
                    &config.http_address,
                    config.http_port,
                )),
                filter_chains: vec![gangway_envoy::pb::listener::FilterChain {
                    filter_chain_match: None,
                    filters: vec![gangway_envoy::http_connection_manager(
                        INGRESS_HTTP,
                        &config.http_access_log,
                    )],
                    transport_socket: None,
                }],
                listener_filters: base_filters.clone(),
            },
        );
    }

    if !dag.secure_virtual_hosts.is_empty() {
        let mut listener_filters = base_filters;
        listener_filters.push(gangway_envoy::tls_inspector());

        let mut filter_chains = Vec::new();
        for vhost in dag.secure_virtual_hosts.values() {
            let min = vhost.min_tls_version.max(config.minimum_tls_version);
            let chain = match &vhost.tcp_proxy {
                Some(proxy) => gangway_envoy::filter_chain_tls(
                    &vhost.fqdn,
                    vhost.secret.as_ref(),
                    min,
                    &[],
                    vec![gangway_envoy::tcp_proxy(
                        INGRESS_HTTPS,
                        proxy,
                        &config.https_access_log,
                    )],
                ),
                None => gangway_envoy::filter_chain_tls(
                    &vhost.fqdn,
                    vhost.secret.as_ref(),
                    min,
                    &["h2", "http/1.1"],
                    vec![gangway_envoy::http_connection_manager(
                        INGRESS_HTTPS,
                        &config.https_access_log,
                    )],
                ),
            };
            filter_chains.push(chain);
        }

        out.insert(
            INGRESS_HTTPS.to_string(),
            Listener {
                name: INGRESS_HTTPS.to_string(),
                address: Some(gangway_envoy::socket_address(
                    &config.https_address,
                    config.https_port,
                )),
                filter_chains,
                listener_filters,
            },
        );
    }

    out
}
