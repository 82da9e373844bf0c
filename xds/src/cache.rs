//! Versioned, thread-safe storage for one discovery family.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use gangway_envoy::pb::{cluster, endpoint, listener, route, tls};

use crate::resource::ResourceType;

/// Holds the current projection for one family. The version advances only
/// when the contents actually change, so unrelated cluster events never
/// force proxies to re-ACK.
#[derive(Debug)]
pub struct ResourceCache<T> {
    values: Mutex<BTreeMap<String, T>>,
    version: watch::Sender<u64>,
}

impl<T: ResourceType> Default for ResourceCache<T> {
    fn default() -> Self {
        let (version, _) = watch::channel(0);
        ResourceCache {
            values: Mutex::new(BTreeMap::new()),
            version,
        }
    }
}

impl<T: ResourceType> ResourceCache<T> {
    /// Replaces the contents, bumping the version iff anything changed.
    pub fn update(&self, new: BTreeMap<String, T>) {
        let mut values = self.values.lock();
        if *values == new {
            return;
        }
        *values = new;
        self.version.send_modify(|v| *v += 1);
    }

    /// The full contents, sorted by name.
    pub fn contents(&self) -> Vec<T> {
        self.values.lock().values().cloned().collect()
    }

    /// The subset matching `names`, sorted by name. Unknown names are
    /// omitted: a resource such as a cluster has required fields (its
    /// discovery type among them) that a blank could not supply.
    pub fn query(&self, names: &[String]) -> Vec<T> {
        let values = self.values.lock();
        let mut out: BTreeMap<&String, T> = BTreeMap::new();
        for name in names {
            if let Some(v) = values.get(name) {
                out.insert(name, v.clone());
            }
        }
        out.into_values().collect()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Registers for change notification; the receiver observes every
    /// version advance from the point of subscription.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

/// The five per-family caches.
#[derive(Debug, Default)]
pub struct Caches {
    pub clusters: Arc<ResourceCache<cluster::Cluster>>,
    pub endpoints: Arc<ResourceCache<endpoint::ClusterLoadAssignment>>,
    pub listeners: Arc<ResourceCache<listener::Listener>>,
    pub routes: Arc<ResourceCache<route::RouteConfiguration>>,
    pub secrets: Arc<ResourceCache<tls::Secret>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(name: &str) -> cluster::Cluster {
        cluster::Cluster {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn map(names: &[&str]) -> BTreeMap<String, cluster::Cluster> {
        names
            .iter()
            .map(|n| (n.to_string(), cluster(n)))
            .collect()
    }

    #[test]
    fn versions_advance_only_on_change() {
        let cache = ResourceCache::<cluster::Cluster>::default();
        assert_eq!(cache.version(), 0);

        cache.update(map(&["a"]));
        assert_eq!(cache.version(), 1);

        // identical contents: no bump
        cache.update(map(&["a"]));
        assert_eq!(cache.version(), 1);

        cache.update(map(&["a", "b"]));
        assert_eq!(cache.version(), 2);

        cache.update(map(&[]));
        assert_eq!(cache.version(), 3);
    }

    #[test]
    fn contents_are_sorted_by_name() {
        let cache = ResourceCache::<cluster::Cluster>::default();
        cache.update(map(&["b", "a", "c"]));
        let names: Vec<_> = cache.contents().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn query_omits_unknown_names() {
        let cache = ResourceCache::<cluster::Cluster>::default();
        cache.update(map(&["a", "b"]));
        let got = cache.query(&["b".to_string(), "nope".to_string()]);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "b");

        assert!(cache.query(&["nope".to_string()]).is_empty());
    }

    #[tokio::test]
    async fn subscribers_observe_version_advances() {
        let cache = ResourceCache::<cluster::Cluster>::default();
        let mut rx = cache.subscribe();
        cache.update(map(&["a"]));
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), 1);
    }
}
