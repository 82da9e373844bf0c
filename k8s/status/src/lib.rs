#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Writes build outcomes back onto routing documents.
//!
//! The controller consumes the status batch emitted after every build and
//! merge-patches the status subresource of each document. Writes equal to
//! the last written value are skipped, so a rebuild that changes nothing
//! costs no API traffic.

use ahash::AHashMap;
use anyhow::Result;
use tokio::sync::mpsc;

use gangway_k8s_api::{
    Api, Client, HTTPProxy, IngressRoute, ObjectStatus, Patch, PatchParams,
};
use gangway_k8s_index::{DocKind, Meta, Status};

/// One document's status, as produced by a build pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    pub kind: DocKind,
    pub meta: Meta,
    pub status: Status,
}

pub type StatusSender = mpsc::UnboundedSender<StatusUpdate>;
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusUpdate>;

pub fn channel() -> (StatusSender, StatusReceiver) {
    mpsc::unbounded_channel()
}

pub struct Controller {
    client: Client,
    updates: StatusReceiver,
    written: AHashMap<(DocKind, Meta), ObjectStatus>,
}

impl Controller {
    pub fn new(client: Client, updates: StatusReceiver) -> Self {
        Controller {
            client,
            updates,
            written: AHashMap::new(),
        }
    }

    pub async fn run(mut self) {
        while let Some(update) = self.updates.recv().await {
            let desired = ObjectStatus {
                current_status: update.status.status.to_string(),
                description: update.status.description.clone(),
            };
            if !should_write(&mut self.written, &update, &desired) {
                continue;
            }
            if let Err(error) = self.patch(&update, &desired).await {
                // The watch redelivers on resync; a failed write heals on
                // the next build.
                tracing::warn!(%error, kind = update.kind.as_str(), doc = %update.meta, "failed to write status");
                self.written.remove(&(update.kind, update.meta));
            }
        }
    }

    async fn patch(&self, update: &StatusUpdate, desired: &ObjectStatus) -> Result<()> {
        let patch = serde_json::json!({ "status": desired });
        let params = PatchParams::default();
        match update.kind {
            DocKind::IngressRoute => {
                Api::<IngressRoute>::namespaced(self.client.clone(), &update.meta.namespace)
                    .patch_status(&update.meta.name, &params, &Patch::Merge(&patch))
                    .await?;
            }
            DocKind::HTTPProxy => {
                Api::<HTTPProxy>::namespaced(self.client.clone(), &update.meta.namespace)
                    .patch_status(&update.meta.name, &params, &Patch::Merge(&patch))
                    .await?;
            }
        }
        tracing::debug!(
            kind = update.kind.as_str(),
            doc = %update.meta,
            status = %desired.current_status,
            "wrote status"
        );
        Ok(())
    }
}

/// Records the desired value, reporting whether it differs from the last
/// write. Equal-value updates are tolerated and skipped.
fn should_write(
    written: &mut AHashMap<(DocKind, Meta), ObjectStatus>,
    update: &StatusUpdate,
    desired: &ObjectStatus,
) -> bool {
    let key = (update.kind, update.meta.clone());
    if written.get(&key) == Some(desired) {
        return false;
    }
    written.insert(key, desired.clone());
    true
}
