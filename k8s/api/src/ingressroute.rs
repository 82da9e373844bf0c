//! The legacy hierarchical routing document.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{ObjectStatus, RetryPolicy, RouteService, TcpProxy, TimeoutPolicy, VirtualHost};

/// A rooted routing document. A root declares a virtual host; non-roots are
/// delegation targets addressed by `Delegate` references.
#[derive(Clone, Debug, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "contour.heptio.com",
    version = "v1beta1",
    kind = "IngressRoute",
    plural = "ingressroutes",
    namespaced,
    status = "ObjectStatus"
)]
pub struct IngressRouteSpec {
    #[serde(rename = "virtualhost")]
    pub virtual_host: Option<VirtualHost>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(rename = "tcpproxy")]
    pub tcp_proxy: Option<TcpProxy>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Path prefix this route matches. A delegated document's prefixes must
    /// extend the prefix of the delegating route.
    #[serde(default, rename = "match")]
    pub match_prefix: String,
    #[serde(default)]
    pub services: Vec<RouteService>,
    /// Hands authority over this prefix to another document. Mutually
    /// exclusive with `services`.
    pub delegate: Option<Delegate>,
    pub timeout_policy: Option<TimeoutPolicy>,
    pub retry_policy: Option<RetryPolicy>,
    #[serde(default)]
    pub enable_websockets: bool,
    #[serde(default)]
    pub prefix_rewrite: String,
    #[serde(default)]
    pub permit_insecure: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Delegate {
    pub name: String,
    /// Defaults to the delegating document's namespace.
    #[serde(default)]
    pub namespace: String,
}
