//! The single-writer rebuild loop.
//!
//! Relevant cache events bump a trigger counter; the handler coalesces a
//! burst of events into one build by waiting out a debounce window from the
//! first event, then snapshots the cache, builds the graph, distributes the
//! projections, and ships the status batch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;

use gangway_k8s_index::{build, SharedIndex};
use gangway_k8s_status::{StatusSender, StatusUpdate};

use crate::cache::Caches;
use crate::project::{self, ListenerConfig};

/// Events within this window of the first one coalesce into a single
/// rebuild.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

pub struct EventHandler {
    index: SharedIndex,
    trigger: watch::Receiver<u64>,
    caches: Arc<Caches>,
    listener_config: ListenerConfig,
    status_tx: StatusSender,
    debounce: Duration,
    rebuilds: Arc<AtomicU64>,
}

impl EventHandler {
    pub fn new(
        index: SharedIndex,
        trigger: watch::Receiver<u64>,
        caches: Arc<Caches>,
        listener_config: ListenerConfig,
        status_tx: StatusSender,
        debounce: Duration,
    ) -> Self {
        EventHandler {
            index,
            trigger,
            caches,
            listener_config,
            status_tx,
            debounce,
            rebuilds: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Counter of completed builds, observable from outside the loop.
    pub fn rebuild_counter(&self) -> Arc<AtomicU64> {
        self.rebuilds.clone()
    }

    pub async fn run(mut self) {
        while self.trigger.changed().await.is_ok() {
            // the window is fixed from the first event; later events in
            // the window join this build rather than scheduling their own
            loop {
                tokio::select! {
                    _ = sleep(self.debounce) => break,
                    changed = self.trigger.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            self.rebuild();
        }

        // watch adapters are gone; run a final build so nothing queued is
        // lost, then let the cache notifiers release their waiters
        self.rebuild();
        tracing::debug!("event handler shutting down");
    }

    /// One full build pass over the current cache contents.
    pub fn rebuild(&self) {
        let snapshot = self.index.read().cache().snapshot();
        let (dag, statuses) = build(&snapshot);

        self.caches.clusters.update(project::clusters(&dag));
        self.caches.listeners.update(project::listeners(&dag, &self.listener_config));
        self.caches.routes.update(project::routes(&dag));
        self.caches.secrets.update(project::secrets(&dag));

        let status_count = statuses.len();
        for ((kind, meta), status) in statuses {
            // the receiver only disappears at shutdown
            let _ = self.status_tx.send(StatusUpdate { kind, meta, status });
        }

        self.rebuilds.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            clusters = self.caches.clusters.version(),
            listeners = self.caches.listeners.version(),
            routes = self.caches.routes.version(),
            secrets = self.caches.secrets.version(),
            statuses = status_count,
            "rebuilt"
        );
    }
}
