//! The discovery resource families.

use gangway_envoy::pb::{cluster, endpoint, listener, route, tls, type_urls};

/// A message type served on one discovery family. Every resource carries a
/// stable name used for filtering and for sorted responses.
pub trait ResourceType: prost::Message + Clone + Default + PartialEq {
    const TYPE_URL: &'static str;

    fn name(&self) -> &str;
}

impl ResourceType for cluster::Cluster {
    const TYPE_URL: &'static str = type_urls::CLUSTER;

    fn name(&self) -> &str {
        &self.name
    }
}

impl ResourceType for endpoint::ClusterLoadAssignment {
    const TYPE_URL: &'static str = type_urls::ENDPOINT;

    fn name(&self) -> &str {
        &self.cluster_name
    }
}

impl ResourceType for listener::Listener {
    const TYPE_URL: &'static str = type_urls::LISTENER;

    fn name(&self) -> &str {
        &self.name
    }
}

impl ResourceType for route::RouteConfiguration {
    const TYPE_URL: &'static str = type_urls::ROUTE;

    fn name(&self) -> &str {
        &self.name
    }
}

impl ResourceType for tls::Secret {
    const TYPE_URL: &'static str = type_urls::SECRET;

    fn name(&self) -> &str {
        &self.name
    }
}
