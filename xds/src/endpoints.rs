//! Endpoints → ClusterLoadAssignment translation.
//!
//! Endpoint data bypasses the routing graph entirely: the translator is fed
//! straight from the Endpoints watch and keeps the EDS cache current. The
//! assignment name is `<ns>/<svc>` for unnamed ports and
//! `<ns>/<svc>/<port-name>` for named ones, matching the names the cluster
//! projector writes into EDS configs.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use gangway_envoy::pb::endpoint::{ClusterLoadAssignment, LbEndpoint};
use gangway_k8s_api::{Endpoints, ResourceExt};
use gangway_k8s_index::Meta;

use crate::cache::ResourceCache;

#[derive(Debug)]
pub struct EndpointsTranslator {
    cache: Arc<ResourceCache<ClusterLoadAssignment>>,
    endpoints: BTreeMap<Meta, Endpoints>,
}

pub type SharedEndpointsTranslator = Arc<RwLock<EndpointsTranslator>>;

impl EndpointsTranslator {
    pub fn new(cache: Arc<ResourceCache<ClusterLoadAssignment>>) -> Self {
        EndpointsTranslator {
            cache,
            endpoints: BTreeMap::new(),
        }
    }

    pub fn shared(cache: Arc<ResourceCache<ClusterLoadAssignment>>) -> SharedEndpointsTranslator {
        Arc::new(RwLock::new(EndpointsTranslator::new(cache)))
    }

    fn recompute(&self) {
        let mut grouped: BTreeMap<String, Vec<LbEndpoint>> = BTreeMap::new();
        for (meta, endpoints) in &self.endpoints {
            for subset in endpoints.subsets.iter().flatten() {
                // addresses are sorted so that the projection does not
                // depend on apiserver ordering
                let mut addresses: Vec<&str> = subset
                    .addresses
                    .iter()
                    .flatten()
                    .map(|a| a.ip.as_str())
                    .collect();
                addresses.sort_unstable();

                for port in subset.ports.iter().flatten() {
                    let name = match port.name.as_deref().filter(|n| !n.is_empty()) {
                        Some(port_name) => format!("{meta}/{port_name}"),
                        None => meta.to_string(),
                    };
                    let entry = grouped.entry(name).or_default();
                    for ip in &addresses {
                        entry.push(gangway_envoy::pb::endpoint::LbEndpoint {
                            host_identifier: Some(
                                gangway_envoy::pb::endpoint::lb_endpoint::HostIdentifier::Endpoint(
                                    gangway_envoy::pb::endpoint::Endpoint {
                                        address: Some(gangway_envoy::socket_address(
                                            ip,
                                            port.port as u16,
                                        )),
                                    },
                                ),
                            ),
                        });
                    }
                }
            }
        }

        let assignments = grouped
            .into_iter()
            .map(|(name, endpoints)| {
                let cla = gangway_envoy::cluster_load_assignment(&name, endpoints);
                (name, cla)
            })
            .collect();
        self.cache.update(assignments);
    }
}

impl kubert::index::IndexNamespacedResource<Endpoints> for EndpointsTranslator {
    fn apply(&mut self, endpoints: Endpoints) {
        let meta = Meta {
            namespace: endpoints.namespace().unwrap_or_default(),
            name: endpoints.name_unchecked(),
        };
        tracing::trace!(endpoints = %meta, "apply");
        self.endpoints.insert(meta, endpoints);
        self.recompute();
    }

    fn delete(&mut self, namespace: String, name: String) {
        let meta = Meta { namespace, name };
        tracing::trace!(endpoints = %meta, "delete");
        if self.endpoints.remove(&meta).is_some() {
            self.recompute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_k8s_api::{EndpointAddress, EndpointPort, EndpointSubset};
    use kubert::index::IndexNamespacedResource;

    fn endpoints(ns: &str, name: &str, ips: &[&str], ports: &[(&str, i32)]) -> Endpoints {
        Endpoints {
            metadata: gangway_k8s_api::ObjectMeta {
                namespace: Some(ns.to_string()),
                name: Some(name.to_string()),
                ..Default::default()
            },
            subsets: Some(vec![EndpointSubset {
                addresses: Some(
                    ips.iter()
                        .map(|ip| EndpointAddress {
                            ip: ip.to_string(),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ports: Some(
                    ports
                        .iter()
                        .map(|(name, port)| EndpointPort {
                            name: if name.is_empty() {
                                None
                            } else {
                                Some(name.to_string())
                            },
                            port: *port,
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }]),
        }
    }

    #[test]
    fn unnamed_ports_key_by_service_identity() {
        let cache = Arc::new(ResourceCache::default());
        let mut translator = EndpointsTranslator::new(cache.clone());
        translator.apply(endpoints("default", "kuard", &["10.0.0.1"], &[("", 8080)]));

        let contents = cache.contents();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].cluster_name, "default/kuard");
        assert_eq!(contents[0].endpoints[0].lb_endpoints.len(), 1);
    }

    #[test]
    fn named_ports_key_by_port_name() {
        let cache = Arc::new(ResourceCache::default());
        let mut translator = EndpointsTranslator::new(cache.clone());
        translator.apply(endpoints(
            "default",
            "kuard",
            &["10.0.0.1", "10.0.0.2"],
            &[("http", 8080), ("https", 8443)],
        ));

        let names: Vec<_> = cache.contents().iter().map(|c| c.cluster_name.clone()).collect();
        assert_eq!(names, ["default/kuard/http", "default/kuard/https"]);
    }

    #[test]
    fn addresses_are_sorted() {
        let cache = Arc::new(ResourceCache::default());
        let mut translator = EndpointsTranslator::new(cache.clone());
        translator.apply(endpoints("default", "kuard", &["10.0.0.9", "10.0.0.1"], &[("", 80)]));
        let a = cache.contents();
        translator.apply(endpoints("default", "kuard", &["10.0.0.1", "10.0.0.9"], &[("", 80)]));
        // same addresses in a different order: projection unchanged
        assert_eq!(cache.contents(), a);
        assert_eq!(cache.version(), 1);
    }

    #[test]
    fn deletion_clears_the_assignment() {
        let cache = Arc::new(ResourceCache::default());
        let mut translator = EndpointsTranslator::new(cache.clone());
        translator.apply(endpoints("default", "kuard", &["10.0.0.1"], &[("", 80)]));
        translator.delete("default".to_string(), "kuard".to_string());
        assert!(cache.contents().is_empty());
    }
}
