//! The successor routing document. Delegation is spelled `include` and
//! route matches live in `Condition` blocks.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{ObjectStatus, RetryPolicy, RouteService, TcpProxy, TimeoutPolicy, VirtualHost};

#[derive(Clone, Debug, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "projectcontour.io",
    version = "v1alpha1",
    kind = "HTTPProxy",
    plural = "httpproxies",
    namespaced,
    status = "ObjectStatus"
)]
pub struct HTTPProxySpec {
    #[serde(rename = "virtualhost")]
    pub virtual_host: Option<VirtualHost>,
    #[serde(default)]
    pub includes: Vec<Include>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(rename = "tcpproxy")]
    pub tcp_proxy: Option<TcpProxy>,
}

/// Inclusion of another HTTPProxy under a path prefix.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Include {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub condition: Condition,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Condition {
    #[serde(default)]
    pub prefix: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub condition: Option<Condition>,
    #[serde(default)]
    pub services: Vec<RouteService>,
    pub timeout_policy: Option<TimeoutPolicy>,
    pub retry_policy: Option<RetryPolicy>,
    #[serde(default)]
    pub enable_websockets: bool,
    #[serde(default)]
    pub prefix_rewrite: String,
    #[serde(default)]
    pub permit_insecure: bool,
}
