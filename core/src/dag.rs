//! Vertex types of the routing graph.

use std::collections::BTreeMap;

use crate::policy::{CircuitBreakers, Cluster, RetryPolicy, TimeoutPolicy, TlsVersion, UpstreamProtocol};

/// A resolved service port. Carries everything the cluster projector needs
/// so that projection never reaches back into the object cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServicePort {
    pub namespace: String,
    pub name: String,
    pub port: u16,
    /// The service port's name; empty when unnamed.
    pub port_name: String,
    /// Set for ExternalName services; the projector synthesizes a DNS
    /// cluster instead of an EDS reference.
    pub external_name: Option<String>,
    pub protocol: Option<UpstreamProtocol>,
    pub circuit_breakers: CircuitBreakers,
}

impl ServicePort {
    /// The EDS service name: `<ns>/<name>` or `<ns>/<name>/<port-name>`.
    pub fn eds_name(&self) -> String {
        if self.port_name.is_empty() {
            format!("{}/{}", self.namespace, self.name)
        } else {
            format!("{}/{}/{}", self.namespace, self.name, self.port_name)
        }
    }
}

/// One path-prefix match and its weighted upstream clusters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub clusters: Vec<Cluster>,
    pub websocket: bool,
    /// Respond with a 301 to the https scheme on the insecure listener.
    pub https_upgrade: bool,
    /// Insert a Strict-Transport-Security header on the secure listener.
    pub hsts: bool,
    pub prefix_rewrite: Option<String>,
    pub timeout_policy: Option<TimeoutPolicy>,
    pub retry_policy: Option<RetryPolicy>,
}

impl Route {
    pub fn new(prefix: impl Into<String>) -> Self {
        Route {
            prefix: prefix.into(),
            clusters: Vec::new(),
            websocket: false,
            https_upgrade: false,
            hsts: false,
            prefix_rewrite: None,
            timeout_policy: None,
            retry_policy: None,
        }
    }
}

/// A TLS secret attached to a secure virtual host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secret {
    pub namespace: String,
    pub name: String,
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

impl Secret {
    /// The name this secret is published under on SDS. Certificate rotation
    /// changes the name, which forces proxies to reload their TLS contexts.
    pub fn wire_name(&self) -> String {
        crate::names::secret_name(self)
    }
}

/// Weighted TCP forwarding for a secure virtual host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpProxy {
    pub clusters: Vec<Cluster>,
}

/// A plain-text virtual host keyed by FQDN.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualHost {
    pub fqdn: String,
    pub routes: BTreeMap<String, Route>,
}

/// A TLS virtual host. `secret` is `None` in passthrough mode, where the
/// proxy selects a TCP backend by SNI without terminating TLS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecureVirtualHost {
    pub fqdn: String,
    pub routes: BTreeMap<String, Route>,
    pub secret: Option<Secret>,
    pub min_tls_version: TlsVersion,
    pub tcp_proxy: Option<TcpProxy>,
}

/// The assembled routing graph. Rebuilt from scratch on every build pass;
/// immutable once published. BTreeMaps keep iteration deterministic so the
/// projections are a pure function of the object cache snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dag {
    pub virtual_hosts: BTreeMap<String, VirtualHost>,
    pub secure_virtual_hosts: BTreeMap<String, SecureVirtualHost>,
}

impl Dag {
    /// Visits every cluster vertex reachable from a route or TCP proxy.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        let insecure = self
            .virtual_hosts
            .values()
            .flat_map(|vh| vh.routes.values())
            .flat_map(|r| r.clusters.iter());
        let secure = self
            .secure_virtual_hosts
            .values()
            .flat_map(|vh| vh.routes.values())
            .flat_map(|r| r.clusters.iter());
        let tcp = self
            .secure_virtual_hosts
            .values()
            .filter_map(|vh| vh.tcp_proxy.as_ref())
            .flat_map(|t| t.clusters.iter());
        insecure.chain(secure).chain(tcp)
    }

    /// Visits every secret bound to a terminating secure virtual host.
    /// Passthrough hosts carry no secret, so everything yielded here is
    /// referenced by a filter chain in the listener projection.
    pub fn secrets(&self) -> impl Iterator<Item = &Secret> {
        self.secure_virtual_hosts
            .values()
            .filter_map(|vh| vh.secret.as_ref())
    }
}
