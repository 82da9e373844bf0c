#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Envoy v3 message construction.
//!
//! `pb` holds a hand-maintained subset of the Envoy v3 protobuf schema —
//! just the messages this controller emits — with real prost derives so the
//! wire encoding is exact. The sibling modules build those messages from
//! DAG vertices.

pub mod cluster;
pub mod endpoint;
pub mod listener;
pub mod pb;
pub mod route;
pub mod secret;

pub use self::cluster::{cluster, config_source};
pub use self::endpoint::cluster_load_assignment;
pub use self::listener::{
    filter_chain_tls, http_connection_manager, proxy_protocol, socket_address, stats_listener,
    tcp_proxy, tls_inspector,
};
pub use self::route::{route_route, route_upgrade_https};
pub use self::secret::{downstream_tls_context, secret, upstream_tls_context};

/// The name of the bootstrap cluster pointing back at this controller's
/// xDS endpoint; EDS config sources refer to it.
pub const XDS_CLUSTER_NAME: &str = "gangway";

/// Packs a message into `google.protobuf.Any`.
pub fn any<M: prost::Message>(type_url: &str, msg: &M) -> prost_types::Any {
    prost_types::Any {
        type_url: type_url.to_string(),
        value: msg.encode_to_vec(),
    }
}
