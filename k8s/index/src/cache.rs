//! The object cache: the authoritative input set for the build pass.
//!
//! Insert and Remove return whether the event is relevance-affecting, so
//! the watch adapters only wake the rebuild loop for changes that can move
//! the projected output. No semantic validation happens here.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use gangway_k8s_api::{
    self as k8s, HTTPProxy, Ingress, IngressRoute, ResourceExt, Secret, Service,
    TLSCertificateDelegation, CA_CERTIFICATE_KEY, SECRET_TYPE_TLS,
};

use crate::annotations::{self, Annotations};
use crate::Meta;

/// Documents without an ingress-class annotation belong to this class.
pub const DEFAULT_INGRESS_CLASS: &str = "contour";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Ingress,
    IngressRoute,
    HTTPProxy,
    Service,
    Secret,
    TLSCertificateDelegation,
}

/// A typed cluster object, as delivered by the watch adapters.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug)]
pub enum Object {
    Ingress(Ingress),
    IngressRoute(IngressRoute),
    HTTPProxy(HTTPProxy),
    Service(Service),
    Secret(Secret),
    TLSCertificateDelegation(TLSCertificateDelegation),
}

macro_rules! from_object {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Object {
            fn from(obj: $ty) -> Self {
                Object::$variant(obj)
            }
        }
    };
}

from_object!(Ingress, Ingress);
from_object!(IngressRoute, IngressRoute);
from_object!(HTTPProxy, HTTPProxy);
from_object!(Service, Service);
from_object!(Secret, Secret);
from_object!(TLSCertificateDelegation, TLSCertificateDelegation);

fn meta_of<T: ResourceExt>(obj: &T) -> Meta {
    Meta {
        namespace: obj.namespace().unwrap_or_default(),
        name: obj.name_unchecked(),
    }
}

/// A read-only copy of the cache contents handed to the build pass. The
/// maps hold `Arc`s, so taking a snapshot is cheap.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub root_namespaces: Vec<String>,
    pub ingresses: BTreeMap<Meta, Arc<Ingress>>,
    pub ingress_routes: BTreeMap<Meta, Arc<IngressRoute>>,
    pub http_proxies: BTreeMap<Meta, Arc<HTTPProxy>>,
    pub services: BTreeMap<Meta, Arc<Service>>,
    pub secrets: BTreeMap<Meta, Arc<Secret>>,
    pub delegations: BTreeMap<Meta, Arc<TLSCertificateDelegation>>,
}

#[derive(Debug, Default)]
pub struct Cache {
    ingress_class: String,
    root_namespaces: Vec<String>,
    ingresses: BTreeMap<Meta, Arc<Ingress>>,
    ingress_routes: BTreeMap<Meta, Arc<IngressRoute>>,
    http_proxies: BTreeMap<Meta, Arc<HTTPProxy>>,
    services: BTreeMap<Meta, Arc<Service>>,
    secrets: BTreeMap<Meta, Arc<Secret>>,
    delegations: BTreeMap<Meta, Arc<TLSCertificateDelegation>>,
}

impl Cache {
    pub fn new(ingress_class: impl Into<String>, root_namespaces: Vec<String>) -> Self {
        Cache {
            ingress_class: ingress_class.into(),
            root_namespaces,
            ..Default::default()
        }
    }

    /// The class this cache accepts routing documents for.
    pub fn ingress_class(&self) -> &str {
        if self.ingress_class.is_empty() {
            DEFAULT_INGRESS_CLASS
        } else {
            &self.ingress_class
        }
    }

    fn class_matches(&self, annotations: Option<&Annotations>) -> bool {
        match annotations::ingress_class(annotations) {
            None => true,
            Some(class) => class == self.ingress_class(),
        }
    }

    /// Stores the object, returning true iff the caller should trigger a
    /// rebuild.
    pub fn insert(&mut self, obj: Object) -> bool {
        match obj {
            Object::Ingress(i) => {
                let meta = meta_of(&i);
                if !self.class_matches(Some(i.annotations())) {
                    // A document moved to a foreign class still needs one
                    // rebuild to drop its previous contribution.
                    return self.ingresses.remove(&meta).is_some();
                }
                self.ingresses.insert(meta, Arc::new(i));
                true
            }
            Object::IngressRoute(ir) => {
                let meta = meta_of(&ir);
                if !self.class_matches(Some(ir.annotations())) {
                    return self.ingress_routes.remove(&meta).is_some();
                }
                self.ingress_routes.insert(meta, Arc::new(ir));
                true
            }
            Object::HTTPProxy(proxy) => {
                let meta = meta_of(&proxy);
                if !self.class_matches(Some(proxy.annotations())) {
                    return self.http_proxies.remove(&meta).is_some();
                }
                self.http_proxies.insert(meta, Arc::new(proxy));
                true
            }
            Object::Service(s) => {
                let meta = meta_of(&s);
                let relevant = self.service_referenced(&meta);
                self.services.insert(meta, Arc::new(s));
                relevant
            }
            Object::Secret(s) => {
                let meta = meta_of(&s);
                let tls_typed = s.type_.as_deref() == Some(SECRET_TYPE_TLS);
                let ca_bearing = has_data_key(&s, CA_CERTIFICATE_KEY);
                if !tls_typed && !ca_bearing {
                    return self.secrets.remove(&meta).is_some();
                }
                // TODO(builder): a CA secret is only interesting when some
                // route's upstream validation names it, but computing that
                // reference would repeat the build pass, so any CA secret
                // triggers a rebuild.
                let relevant = ca_bearing || self.secret_referenced(&meta);
                self.secrets.insert(meta, Arc::new(s));
                relevant
            }
            Object::TLSCertificateDelegation(d) => {
                let meta = meta_of(&d);
                self.delegations.insert(meta, Arc::new(d));
                true
            }
        }
    }

    /// Removes the object by identity, returning true iff it was present.
    pub fn remove(&mut self, kind: Kind, namespace: &str, name: &str) -> bool {
        let meta = Meta::new(namespace, name);
        match kind {
            Kind::Ingress => self.ingresses.remove(&meta).is_some(),
            Kind::IngressRoute => self.ingress_routes.remove(&meta).is_some(),
            Kind::HTTPProxy => self.http_proxies.remove(&meta).is_some(),
            Kind::Service => self.services.remove(&meta).is_some(),
            Kind::Secret => self.secrets.remove(&meta).is_some(),
            Kind::TLSCertificateDelegation => self.delegations.remove(&meta).is_some(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            root_namespaces: self.root_namespaces.clone(),
            ingresses: self.ingresses.clone(),
            ingress_routes: self.ingress_routes.clone(),
            http_proxies: self.http_proxies.clone(),
            services: self.services.clone(),
            secrets: self.secrets.clone(),
            delegations: self.delegations.clone(),
        }
    }

    /// True if some stored routing object names the service.
    fn service_referenced(&self, svc: &Meta) -> bool {
        for (meta, ingress) in &self.ingresses {
            if meta.namespace != svc.namespace {
                continue;
            }
            let spec = match &ingress.spec {
                Some(spec) => spec,
                None => continue,
            };
            if let Some(backend) = &spec.default_backend {
                if backend_names(backend) == Some(svc.name.as_str()) {
                    return true;
                }
            }
            for rule in spec.rules.iter().flatten() {
                for path in rule.http.iter().flat_map(|h| h.paths.iter()) {
                    if backend_names(&path.backend) == Some(svc.name.as_str()) {
                        return true;
                    }
                }
            }
        }

        for (meta, ir) in &self.ingress_routes {
            if meta.namespace != svc.namespace {
                continue;
            }
            let routes = ir.spec.routes.iter().flat_map(|r| r.services.iter());
            let tcp = ir.spec.tcp_proxy.iter().flat_map(|t| t.services.iter());
            if routes.chain(tcp).any(|s| s.name == svc.name) {
                return true;
            }
        }

        for (meta, proxy) in &self.http_proxies {
            if meta.namespace != svc.namespace {
                continue;
            }
            let routes = proxy.spec.routes.iter().flat_map(|r| r.services.iter());
            let tcp = proxy.spec.tcp_proxy.iter().flat_map(|t| t.services.iter());
            if routes.chain(tcp).any(|s| s.name == svc.name) {
                return true;
            }
        }

        false
    }

    /// True if some stored routing object references the TLS secret,
    /// directly in its own namespace or across namespaces through a
    /// certificate delegation.
    fn secret_referenced(&self, secret: &Meta) -> bool {
        let ingress_refs = self.ingresses.iter().flat_map(|(meta, ingress)| {
            ingress
                .spec
                .iter()
                .flat_map(|spec| spec.tls.iter().flatten())
                .filter_map(|tls| tls.secret_name.as_deref())
                .map(move |name| (meta, name))
        });
        let ir_refs = self.ingress_routes.iter().filter_map(|(meta, ir)| {
            ir.spec
                .virtual_host
                .as_ref()
                .and_then(|vh| vh.tls.as_ref())
                .map(|tls| (meta, tls.secret_name.as_str()))
        });
        let proxy_refs = self.http_proxies.iter().filter_map(|(meta, proxy)| {
            proxy
                .spec
                .virtual_host
                .as_ref()
                .and_then(|vh| vh.tls.as_ref())
                .map(|tls| (meta, tls.secret_name.as_str()))
        });

        for (doc, secret_name) in ingress_refs.chain(ir_refs).chain(proxy_refs) {
            if doc.namespace == secret.namespace && secret_name == secret.name {
                return true;
            }
            if secret_name == format!("{}/{}", secret.namespace, secret.name)
                && self.delegation_permits(secret, &doc.namespace)
            {
                return true;
            }
        }
        false
    }

    /// True if a delegation in the secret's namespace grants the secret to
    /// the target namespace (or to every namespace via `*`).
    pub fn delegation_permits(&self, secret: &Meta, target_namespace: &str) -> bool {
        self.delegations
            .iter()
            .filter(|(meta, _)| meta.namespace == secret.namespace)
            .flat_map(|(_, d)| d.spec.delegations.iter())
            .filter(|d| d.secret_name == secret.name)
            .any(|d| {
                d.target_namespaces
                    .iter()
                    .any(|ns| ns == "*" || ns == target_namespace)
            })
    }
}

fn backend_names(backend: &k8s::IngressBackend) -> Option<&str> {
    backend.service.as_ref().map(|s| s.name.as_str())
}

fn has_data_key(secret: &Secret, key: &str) -> bool {
    secret
        .data
        .as_ref()
        .map(|d| d.contains_key(key))
        .unwrap_or(false)
}

/// Wakes the rebuild loop. The counter value itself is meaningless; only
/// its advancement is observed.
#[derive(Debug)]
pub struct Trigger(watch::Sender<u64>);

impl Trigger {
    pub fn new() -> (Self, watch::Receiver<u64>) {
        let (tx, rx) = watch::channel(0);
        (Trigger(tx), rx)
    }

    pub fn notify(&self) {
        self.0.send_modify(|v| *v += 1);
    }
}

/// The cache plus its rebuild trigger, shared between the watch adapters
/// and the event handler.
#[derive(Debug)]
pub struct Index {
    cache: Cache,
    trigger: Trigger,
}

pub type SharedIndex = Arc<RwLock<Index>>;

impl Index {
    pub fn shared(
        ingress_class: impl Into<String>,
        root_namespaces: Vec<String>,
    ) -> (SharedIndex, watch::Receiver<u64>) {
        let (trigger, rx) = Trigger::new();
        let index = Index {
            cache: Cache::new(ingress_class, root_namespaces),
            trigger,
        };
        (Arc::new(RwLock::new(index)), rx)
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    fn ingest(&mut self, obj: Object) {
        if self.cache.insert(obj) {
            self.trigger.notify();
        }
    }

    fn forget(&mut self, kind: Kind, namespace: &str, name: &str) {
        if self.cache.remove(kind, namespace, name) {
            self.trigger.notify();
        }
    }
}

macro_rules! impl_index {
    ($ty:ty, $kind:expr) => {
        impl kubert::index::IndexNamespacedResource<$ty> for Index {
            fn apply(&mut self, resource: $ty) {
                tracing::trace!(kind = ?$kind, name = %resource.name_unchecked(), "apply");
                self.ingest(resource.into());
            }

            fn delete(&mut self, namespace: String, name: String) {
                tracing::trace!(kind = ?$kind, %namespace, %name, "delete");
                self.forget($kind, &namespace, &name);
            }
        }
    };
}

impl_index!(Ingress, Kind::Ingress);
impl_index!(IngressRoute, Kind::IngressRoute);
impl_index!(HTTPProxy, Kind::HTTPProxy);
impl_index!(Service, Kind::Service);
impl_index!(Secret, Kind::Secret);
impl_index!(TLSCertificateDelegation, Kind::TLSCertificateDelegation);
