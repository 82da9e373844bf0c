//! The build pass: compiles an object cache snapshot into a routing graph
//! plus one status per routing document.
//!
//! The pass is a pure function of the snapshot. User errors never abort it;
//! they mark the offending document invalid and the rest of the input keeps
//! building.

use std::collections::BTreeMap;

use gangway_core::{
    Cluster, Dag, HealthCheckPolicy, RetryPolicy, Route, Secret as SecretVertex,
    SecureVirtualHost, ServicePort, TcpProxy as TcpProxyVertex, TimeoutPolicy, TlsVersion,
    UpstreamValidation, VirtualHost,
};
use gangway_k8s_api::{
    self as k8s, ResourceExt, CA_CERTIFICATE_KEY, SECRET_TYPE_TLS, TLS_CERT_KEY,
    TLS_PRIVATE_KEY_KEY,
};

use crate::annotations;
use crate::cache::Snapshot;
use crate::status::{DocKind, Status, StatusMap, STATUS_INVALID, STATUS_VALID};
use crate::Meta;

/// Builds the routing graph and status table from a snapshot.
pub fn build(snapshot: &Snapshot) -> (Dag, StatusMap) {
    let mut pass = BuildPass {
        snapshot,
        dag: Dag::default(),
        statuses: StatusMap::new(),
    };
    pass.ingest_ingresses();
    pass.ingest_roots(DocKind::IngressRoute);
    pass.ingest_roots(DocKind::HTTPProxy);
    pass.orphan_sweep();
    (pass.dag, pass.statuses)
}

/// What the delegation walk knows about the root it started from.
struct RootCtx {
    fqdn: String,
    secret: Option<SecretVertex>,
    min_tls_version: TlsVersion,
}

enum ServiceError {
    PortRange,
    Missing,
}

struct BuildPass<'a> {
    snapshot: &'a Snapshot,
    dag: Dag,
    statuses: StatusMap,
}

impl<'a> BuildPass<'a> {
    fn set_status(&mut self, kind: DocKind, meta: Meta, status: Status) {
        // A document marked invalid stays invalid; later walks from other
        // parents must not launder it back to valid.
        if let Some(existing) = self.statuses.get(&(kind, meta.clone())) {
            if existing.status == STATUS_INVALID && status.status == STATUS_VALID {
                return;
            }
        }
        self.statuses.insert((kind, meta), status);
    }

    fn root_allowed(&self, meta: &Meta) -> bool {
        self.snapshot.root_namespaces.is_empty()
            || self.snapshot.root_namespaces.iter().any(|ns| ns == &meta.namespace)
    }

    // ---- Ingress (legacy, annotation-driven) ------------------------------

    fn ingest_ingresses(&mut self) {
        let snapshot = self.snapshot;
        for (meta, ingress) in &snapshot.ingresses {
            let spec = match &ingress.spec {
                Some(spec) => spec,
                None => continue,
            };
            let anns = Some(ingress.annotations());
            let http_allowed = annotations::http_allowed(anns);
            let tls_required = annotations::tls_required(anns);
            let websockets = annotations::websocket_routes(anns);
            let timeout_policy = annotations::request_timeout(anns);
            let retry_policy = annotations::retry_policy(anns);
            let min_tls_version = annotations::min_tls_version(anns).unwrap_or_default();

            // Hosts with a resolvable certificate terminate TLS.
            let mut secure_hosts: BTreeMap<String, SecretVertex> = BTreeMap::new();
            for tls in spec.tls.iter().flatten() {
                let secret_ref = match tls.secret_name.as_deref() {
                    Some(name) if !name.is_empty() => name,
                    _ => continue,
                };
                // Unresolvable secrets leave the host insecure; the Ingress
                // kind has no status to report the problem on.
                if let Ok(secret) = self.lookup_secret(&meta.namespace, secret_ref) {
                    for host in tls.hosts.iter().flatten() {
                        secure_hosts.insert(host.clone(), secret.clone());
                    }
                }
            }

            let add = |pass: &mut Self, host: &str, prefix: &str, backend: &k8s::IngressBackend| {
                let cluster = match pass.cluster_for_ingress_backend(&meta.namespace, backend) {
                    Some(cluster) => cluster,
                    // No backing service yet; the route vanishes until the
                    // service appears.
                    None => return,
                };
                let mut route = Route::new(prefix);
                route.clusters = vec![cluster];
                route.websocket = websockets.contains_key(prefix);
                route.timeout_policy = timeout_policy;
                route.retry_policy = retry_policy.clone();

                if http_allowed || tls_required {
                    let mut insecure = route.clone();
                    insecure.https_upgrade = tls_required;
                    let vh = pass
                        .dag
                        .virtual_hosts
                        .entry(host.to_string())
                        .or_insert_with(|| VirtualHost {
                            fqdn: host.to_string(),
                            ..Default::default()
                        });
                    vh.routes.insert(insecure.prefix.clone(), insecure);
                }
                if let Some(secret) = secure_hosts.get(host) {
                    let mut secure = route;
                    secure.hsts = tls_required;
                    let svh = pass
                        .dag
                        .secure_virtual_hosts
                        .entry(host.to_string())
                        .or_insert_with(|| SecureVirtualHost {
                            fqdn: host.to_string(),
                            routes: BTreeMap::new(),
                            secret: Some(secret.clone()),
                            min_tls_version,
                            tcp_proxy: None,
                        });
                    svh.routes.insert(secure.prefix.clone(), secure);
                }
            };

            if let Some(backend) = &spec.default_backend {
                add(self, "*", "/", backend);
            }
            for rule in spec.rules.iter().flatten() {
                let host = rule.host.as_deref().filter(|h| !h.is_empty()).unwrap_or("*");
                for path in rule.http.iter().flat_map(|h| h.paths.iter()) {
                    let prefix = path.path.as_deref().filter(|p| !p.is_empty()).unwrap_or("/");
                    add(self, host, prefix, &path.backend);
                }
            }
        }
    }

    // ---- Routing documents (IngressRoute / HTTPProxy) ---------------------

    /// Phase A for one document kind: classify roots, claim FQDNs, then
    /// walk the delegation graph under every uncontested root.
    fn ingest_roots(&mut self, kind: DocKind) {
        let snapshot = self.snapshot;
        let mut claims: BTreeMap<String, Vec<Meta>> = BTreeMap::new();

        let roots: Vec<(Meta, Option<&k8s::VirtualHost>)> = match kind {
            DocKind::IngressRoute => snapshot
                .ingress_routes
                .iter()
                .map(|(m, ir)| (m.clone(), ir.spec.virtual_host.as_ref()))
                .collect(),
            DocKind::HTTPProxy => snapshot
                .http_proxies
                .iter()
                .map(|(m, proxy)| (m.clone(), proxy.spec.virtual_host.as_ref()))
                .collect(),
        };

        for (meta, vhost) in roots {
            let vhost = match vhost {
                Some(vhost) => vhost,
                None => continue,
            };
            if vhost.fqdn.is_empty() {
                self.set_status(
                    kind,
                    meta,
                    Status::invalid("Spec.VirtualHost.Fqdn must be specified", ""),
                );
                continue;
            }
            if !self.root_allowed(&meta) {
                self.set_status(
                    kind,
                    meta,
                    Status::invalid(
                        format!("root {} cannot be defined in this namespace", kind.as_str()),
                        "",
                    ),
                );
                continue;
            }
            if vhost.fqdn.contains('*') {
                self.set_status(
                    kind,
                    meta.clone(),
                    Status::invalid(
                        format!(
                            "Spec.VirtualHost.Fqdn {:?} cannot use wildcards",
                            vhost.fqdn
                        ),
                        vhost.fqdn.clone(),
                    ),
                );
                continue;
            }
            claims.entry(vhost.fqdn.clone()).or_default().push(meta);
        }

        for (fqdn, claimants) in claims {
            if claimants.len() > 1 {
                let list = claimants
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let description = format!(
                    "fqdn {:?} is used in multiple {}: {}",
                    fqdn,
                    kind.plural(),
                    list
                );
                for meta in claimants {
                    self.set_status(kind, meta, Status::invalid(description.clone(), fqdn.clone()));
                }
                continue;
            }

            let meta = claimants.into_iter().next().expect("claimant");
            match kind {
                DocKind::IngressRoute => {
                    let doc = self.snapshot.ingress_routes[&meta].clone();
                    self.walk_ingressroute_root(&meta, &doc, &fqdn);
                }
                DocKind::HTTPProxy => {
                    let doc = self.snapshot.http_proxies[&meta].clone();
                    self.walk_httpproxy_root(&meta, &doc, &fqdn);
                }
            }
        }
    }

    /// Phase D for one root: resolve the TLS block into a secret (or
    /// passthrough), failing the whole document on a bad reference.
    fn resolve_root_tls(
        &mut self,
        kind: DocKind,
        meta: &Meta,
        fqdn: &str,
        tls: Option<&k8s::Tls>,
        has_tcp_proxy: bool,
    ) -> Result<(Option<SecretVertex>, bool, TlsVersion), ()> {
        let tls = match tls {
            Some(tls) => tls,
            None => return Ok((None, false, TlsVersion::default())),
        };
        let min = TlsVersion::parse(&tls.minimum_protocol_version);
        if tls.passthrough {
            if !has_tcp_proxy {
                self.set_status(
                    kind,
                    meta.clone(),
                    Status::invalid(
                        "Spec.VirtualHost.TLS.Passthrough requires a TCPProxy to be defined",
                        fqdn,
                    ),
                );
                return Err(());
            }
            return Ok((None, true, min));
        }
        if tls.secret_name.is_empty() {
            return Ok((None, false, min));
        }
        match self.lookup_secret(&meta.namespace, &tls.secret_name) {
            Ok(secret) => Ok((Some(secret), false, min)),
            Err(description) => {
                self.set_status(kind, meta.clone(), Status::invalid(description, fqdn));
                Err(())
            }
        }
    }

    fn walk_ingressroute_root(&mut self, meta: &Meta, doc: &k8s::IngressRoute, fqdn: &str) {
        let vhost = doc.spec.virtual_host.as_ref().expect("root");
        let (secret, passthrough, min_tls_version) = match self.resolve_root_tls(
            DocKind::IngressRoute,
            meta,
            fqdn,
            vhost.tls.as_ref(),
            doc.spec.tcp_proxy.is_some(),
        ) {
            Ok(tls) => tls,
            Err(()) => return,
        };

        let ctx = RootCtx {
            fqdn: fqdn.to_string(),
            secret,
            min_tls_version,
        };

        // A document carrying a TCP proxy forwards whole connections; its
        // HTTP routes are not served.
        if let Some(tp) = &doc.spec.tcp_proxy {
            if passthrough || ctx.secret.is_some() {
                match self.tcp_proxy_for(&meta.namespace, tp) {
                    Ok(proxy) => {
                        self.attach_tcp_proxy(&ctx, proxy);
                        self.set_status(
                            DocKind::IngressRoute,
                            meta.clone(),
                            Status::valid(DocKind::IngressRoute, fqdn),
                        );
                    }
                    Err(description) => {
                        self.set_status(
                            DocKind::IngressRoute,
                            meta.clone(),
                            Status::invalid(description, fqdn),
                        );
                    }
                }
                return;
            }
        }

        let mut path = vec![meta.clone()];
        self.walk_ingressroute(meta, doc, None, &mut path, &ctx, true);
        self.set_status(
            DocKind::IngressRoute,
            meta.clone(),
            Status::valid(DocKind::IngressRoute, fqdn),
        );
    }

    /// Phase B/C for the legacy kind. Returns false when the document was
    /// marked invalid.
    fn walk_ingressroute(
        &mut self,
        doc_meta: &Meta,
        doc: &k8s::IngressRoute,
        parent_prefix: Option<&str>,
        path: &mut Vec<Meta>,
        ctx: &RootCtx,
        is_root: bool,
    ) -> bool {
        let kind = DocKind::IngressRoute;
        let vhost = if is_root { ctx.fqdn.as_str() } else { "" };

        for route in &doc.spec.routes {
            let m = &route.match_prefix;

            if route.delegate.is_some() && !route.services.is_empty() {
                self.set_status(
                    kind,
                    doc_meta.clone(),
                    Status::invalid(
                        format!(
                            "route {m:?}: cannot specify services and delegate in the same route"
                        ),
                        vhost,
                    ),
                );
                return false;
            }

            if let Some(parent) = parent_prefix {
                if !m.starts_with(parent) {
                    self.set_status(
                        kind,
                        doc_meta.clone(),
                        Status::invalid(
                            format!(
                                "the path prefix {m:?} does not match the parent's path prefix {parent:?}"
                            ),
                            vhost,
                        ),
                    );
                    return false;
                }
            }

            if let Some(delegate) = &route.delegate {
                let child_ns = if delegate.namespace.is_empty() {
                    doc_meta.namespace.as_str()
                } else {
                    delegate.namespace.as_str()
                };
                let child_meta = Meta::new(child_ns, &delegate.name);
                let child = match self.snapshot.ingress_routes.get(&child_meta) {
                    Some(child) => child.clone(),
                    // Delegation to a document that does not exist yet is
                    // not an error; the prefix simply has no routes.
                    None => continue,
                };

                if child.spec.virtual_host.is_some() {
                    self.set_status(
                        kind,
                        doc_meta.clone(),
                        Status::invalid(
                            "root ingressroute cannot delegate to another root ingressroute",
                            vhost,
                        ),
                    );
                    return false;
                }

                if path.contains(&child_meta) {
                    let mut names: Vec<String> = path.iter().map(|m| m.to_string()).collect();
                    names.push(child_meta.to_string());
                    self.set_status(
                        kind,
                        child_meta,
                        Status::invalid(
                            format!("route creates a delegation cycle: {}", names.join(" -> ")),
                            "",
                        ),
                    );
                    continue;
                }

                path.push(child_meta.clone());
                let ok = self.walk_ingressroute(&child_meta, &child, Some(m), path, ctx, false);
                path.pop();
                if ok {
                    self.set_status(kind, child_meta, Status::valid(kind, ""));
                }
                continue;
            }

            let mut clusters = Vec::new();
            let mut failed = false;
            for rs in &route.services {
                match self.cluster_for(&doc_meta.namespace, rs) {
                    Ok(cluster) => clusters.push(cluster),
                    Err(ServiceError::PortRange) => {
                        self.set_status(
                            kind,
                            doc_meta.clone(),
                            Status::invalid(
                                format!(
                                    "route {m:?}: service {:?}: port must be in the range 1-65535",
                                    rs.name
                                ),
                                vhost,
                            ),
                        );
                        return false;
                    }
                    Err(ServiceError::Missing) => {
                        self.set_status(
                            kind,
                            doc_meta.clone(),
                            Status::invalid(
                                format!("Service [{}:{}] is invalid or missing", rs.name, rs.port),
                                vhost,
                            ),
                        );
                        failed = true;
                        break;
                    }
                }
            }
            if failed {
                return false;
            }
            if clusters.is_empty() {
                continue;
            }

            let mut vertex = Route::new(if m.is_empty() { "/" } else { m.as_str() });
            vertex.clusters = clusters;
            vertex.websocket = route.enable_websockets;
            if !route.prefix_rewrite.is_empty() {
                vertex.prefix_rewrite = Some(route.prefix_rewrite.clone());
            }
            vertex.timeout_policy = route.timeout_policy.as_ref().map(timeout_policy);
            vertex.retry_policy = route.retry_policy.as_ref().and_then(retry_policy);
            self.attach_route(ctx, vertex);
        }

        true
    }

    fn walk_httpproxy_root(&mut self, meta: &Meta, doc: &k8s::HTTPProxy, fqdn: &str) {
        let vhost = doc.spec.virtual_host.as_ref().expect("root");
        let (secret, passthrough, min_tls_version) = match self.resolve_root_tls(
            DocKind::HTTPProxy,
            meta,
            fqdn,
            vhost.tls.as_ref(),
            doc.spec.tcp_proxy.is_some(),
        ) {
            Ok(tls) => tls,
            Err(()) => return,
        };

        let ctx = RootCtx {
            fqdn: fqdn.to_string(),
            secret,
            min_tls_version,
        };

        if let Some(tp) = &doc.spec.tcp_proxy {
            if passthrough || ctx.secret.is_some() {
                match self.tcp_proxy_for(&meta.namespace, tp) {
                    Ok(proxy) => {
                        self.attach_tcp_proxy(&ctx, proxy);
                        self.set_status(
                            DocKind::HTTPProxy,
                            meta.clone(),
                            Status::valid(DocKind::HTTPProxy, fqdn),
                        );
                    }
                    Err(description) => {
                        self.set_status(
                            DocKind::HTTPProxy,
                            meta.clone(),
                            Status::invalid(description, fqdn),
                        );
                    }
                }
                return;
            }
        }

        let mut path = vec![meta.clone()];
        self.walk_httpproxy(meta, doc, "", &mut path, &ctx, true);
        self.set_status(
            DocKind::HTTPProxy,
            meta.clone(),
            Status::valid(DocKind::HTTPProxy, fqdn),
        );
    }

    /// Phase B/C for the include-based kind. Include prefixes accumulate
    /// onto the routes beneath them.
    fn walk_httpproxy(
        &mut self,
        doc_meta: &Meta,
        doc: &k8s::HTTPProxy,
        prefix: &str,
        path: &mut Vec<Meta>,
        ctx: &RootCtx,
        is_root: bool,
    ) -> bool {
        let kind = DocKind::HTTPProxy;
        let vhost = if is_root { ctx.fqdn.as_str() } else { "" };

        for route in &doc.spec.routes {
            let own = route
                .condition
                .as_ref()
                .map(|c| c.prefix.as_str())
                .filter(|p| !p.is_empty())
                .unwrap_or("/");
            let m = join_prefix(prefix, own);

            let mut clusters = Vec::new();
            let mut failed = false;
            for rs in &route.services {
                match self.cluster_for(&doc_meta.namespace, rs) {
                    Ok(cluster) => clusters.push(cluster),
                    Err(ServiceError::PortRange) => {
                        self.set_status(
                            kind,
                            doc_meta.clone(),
                            Status::invalid(
                                format!(
                                    "route {m:?}: service {:?}: port must be in the range 1-65535",
                                    rs.name
                                ),
                                vhost,
                            ),
                        );
                        return false;
                    }
                    Err(ServiceError::Missing) => {
                        self.set_status(
                            kind,
                            doc_meta.clone(),
                            Status::invalid(
                                format!("Service [{}:{}] is invalid or missing", rs.name, rs.port),
                                vhost,
                            ),
                        );
                        failed = true;
                        break;
                    }
                }
            }
            if failed {
                return false;
            }
            if clusters.is_empty() {
                continue;
            }

            let mut vertex = Route::new(m);
            vertex.clusters = clusters;
            vertex.websocket = route.enable_websockets;
            if !route.prefix_rewrite.is_empty() {
                vertex.prefix_rewrite = Some(route.prefix_rewrite.clone());
            }
            vertex.timeout_policy = route.timeout_policy.as_ref().map(timeout_policy);
            vertex.retry_policy = route.retry_policy.as_ref().and_then(retry_policy);
            self.attach_route(ctx, vertex);
        }

        for include in &doc.spec.includes {
            let child_ns = if include.namespace.is_empty() {
                doc_meta.namespace.as_str()
            } else {
                include.namespace.as_str()
            };
            let child_meta = Meta::new(child_ns, &include.name);
            let child = match self.snapshot.http_proxies.get(&child_meta) {
                Some(child) => child.clone(),
                None => continue,
            };

            if child.spec.virtual_host.is_some() {
                self.set_status(
                    kind,
                    doc_meta.clone(),
                    Status::invalid(
                        "root httpproxy cannot delegate to another root httpproxy",
                        ctx.fqdn.clone(),
                    ),
                );
                return false;
            }

            if path.contains(&child_meta) {
                let mut names: Vec<String> = path.iter().map(|m| m.to_string()).collect();
                names.push(child_meta.to_string());
                self.set_status(
                    kind,
                    child_meta,
                    Status::invalid(
                        format!("include creates a delegation cycle: {}", names.join(" -> ")),
                        ctx.fqdn.clone(),
                    ),
                );
                continue;
            }

            let child_prefix = join_prefix(prefix, &include.condition.prefix);
            path.push(child_meta.clone());
            let ok = self.walk_httpproxy(&child_meta, &child, &child_prefix, path, ctx, false);
            path.pop();
            if ok {
                self.set_status(kind, child_meta, Status::valid(kind, ""));
            }
        }

        true
    }

    /// Phase F cleanup: non-roots never reached from a valid root.
    fn orphan_sweep(&mut self) {
        let snapshot = self.snapshot;
        for (meta, ir) in &snapshot.ingress_routes {
            if ir.spec.virtual_host.is_none()
                && !self
                    .statuses
                    .contains_key(&(DocKind::IngressRoute, meta.clone()))
            {
                self.statuses.insert(
                    (DocKind::IngressRoute, meta.clone()),
                    Status::orphaned(DocKind::IngressRoute),
                );
            }
        }
        for (meta, proxy) in &snapshot.http_proxies {
            if proxy.spec.virtual_host.is_none()
                && !self
                    .statuses
                    .contains_key(&(DocKind::HTTPProxy, meta.clone()))
            {
                self.statuses.insert(
                    (DocKind::HTTPProxy, meta.clone()),
                    Status::orphaned(DocKind::HTTPProxy),
                );
            }
        }
    }

    // ---- Vertex attachment -------------------------------------------------

    /// Adds a route under the root's virtual host: the plain-text copy
    /// always, a TLS copy when the root terminates TLS.
    fn attach_route(&mut self, ctx: &RootCtx, route: Route) {
        let vh = self
            .dag
            .virtual_hosts
            .entry(ctx.fqdn.clone())
            .or_insert_with(|| VirtualHost {
                fqdn: ctx.fqdn.clone(),
                ..Default::default()
            });
        vh.routes.insert(route.prefix.clone(), route.clone());

        if ctx.secret.is_some() {
            let svh = self
                .dag
                .secure_virtual_hosts
                .entry(ctx.fqdn.clone())
                .or_insert_with(|| SecureVirtualHost {
                    fqdn: ctx.fqdn.clone(),
                    routes: BTreeMap::new(),
                    secret: ctx.secret.clone(),
                    min_tls_version: ctx.min_tls_version,
                    tcp_proxy: None,
                });
            svh.routes.insert(route.prefix.clone(), route);
        }
    }

    fn attach_tcp_proxy(&mut self, ctx: &RootCtx, proxy: TcpProxyVertex) {
        let svh = self
            .dag
            .secure_virtual_hosts
            .entry(ctx.fqdn.clone())
            .or_insert_with(|| SecureVirtualHost {
                fqdn: ctx.fqdn.clone(),
                routes: BTreeMap::new(),
                secret: ctx.secret.clone(),
                min_tls_version: ctx.min_tls_version,
                tcp_proxy: None,
            });
        svh.tcp_proxy = Some(proxy);
    }

    // ---- Reference resolution ----------------------------------------------

    /// Phase D lookup: resolves a `name` or `namespace/name` secret
    /// reference, enforcing certificate delegation across namespaces.
    fn lookup_secret(&self, doc_ns: &str, secret_ref: &str) -> Result<SecretVertex, String> {
        let (ns, name) = match secret_ref.split_once('/') {
            Some((ns, name)) => (ns, name),
            None => (doc_ns, secret_ref),
        };
        let meta = Meta::new(ns, name);
        let not_found = || format!("TLS Secret [{secret_ref}] not found or is malformed");

        let secret = self.snapshot.secrets.get(&meta).ok_or_else(not_found)?;

        if ns != doc_ns && !self.delegation_permits(&meta, doc_ns) {
            return Err(format!("{ns}/{name}: certificate delegation not permitted"));
        }

        if secret.type_.as_deref() != Some(SECRET_TYPE_TLS) {
            return Err(not_found());
        }
        let cert = secret_data(secret, TLS_CERT_KEY).ok_or_else(not_found)?;
        let key = secret_data(secret, TLS_PRIVATE_KEY_KEY).ok_or_else(not_found)?;

        Ok(SecretVertex {
            namespace: ns.to_string(),
            name: name.to_string(),
            cert,
            key,
        })
    }

    fn delegation_permits(&self, secret: &Meta, target_ns: &str) -> bool {
        self.snapshot
            .delegations
            .iter()
            .filter(|(meta, _)| meta.namespace == secret.namespace)
            .flat_map(|(_, d)| d.spec.delegations.iter())
            .filter(|d| d.secret_name == secret.name)
            .any(|d| d.target_namespaces.iter().any(|ns| ns == "*" || ns == target_ns))
    }

    /// Phase C/E: resolves a route's service reference into a cluster
    /// vertex carrying the per-route policy tuple.
    fn cluster_for(&self, ns: &str, rs: &k8s::RouteService) -> Result<Cluster, ServiceError> {
        if rs.port < 1 || rs.port > 65535 {
            return Err(ServiceError::PortRange);
        }
        let svc = self
            .snapshot
            .services
            .get(&Meta::new(ns, &rs.name))
            .ok_or(ServiceError::Missing)?;
        let spec = svc.spec.as_ref().ok_or(ServiceError::Missing)?;
        let port = spec
            .ports
            .iter()
            .flatten()
            .find(|p| p.port == rs.port)
            .ok_or(ServiceError::Missing)?;

        Ok(Cluster {
            upstream: self.upstream(ns, &rs.name, svc, port),
            weight: rs.weight,
            lb_strategy: rs.strategy.clone(),
            health_check: rs.health_check.as_ref().map(|hc| HealthCheckPolicy {
                path: hc.path.clone(),
                host: hc.host.clone(),
                timeout_seconds: hc.timeout_seconds,
                interval_seconds: hc.interval_seconds,
                unhealthy_threshold: hc.unhealthy_threshold_count,
                healthy_threshold: hc.healthy_threshold_count,
            }),
            upstream_validation: rs
                .upstream_validation
                .as_ref()
                .and_then(|uv| self.ca_for(ns, uv)),
        })
    }

    /// Ingress backends reference ports by number or name and carry no
    /// per-route policy.
    fn cluster_for_ingress_backend(
        &self,
        ns: &str,
        backend: &k8s::IngressBackend,
    ) -> Option<Cluster> {
        let service_backend = backend.service.as_ref()?;
        let port_ref = service_backend.port.as_ref()?;
        let svc = self.snapshot.services.get(&Meta::new(ns, &service_backend.name))?;
        let spec = svc.spec.as_ref()?;
        let port = spec.ports.iter().flatten().find(|p| match port_ref {
            k8s::ServiceBackendPort {
                number: Some(number),
                ..
            } => p.port == *number,
            k8s::ServiceBackendPort {
                name: Some(name), ..
            } => p.name.as_deref() == Some(name.as_str()),
            _ => false,
        })?;

        Some(Cluster {
            upstream: self.upstream(ns, &service_backend.name, svc, port),
            weight: 0,
            lb_strategy: String::new(),
            health_check: None,
            upstream_validation: None,
        })
    }

    fn upstream(
        &self,
        ns: &str,
        name: &str,
        svc: &k8s::Service,
        port: &k8s::ServicePort,
    ) -> ServicePort {
        let anns = Some(svc.annotations());
        let protocols = annotations::upstream_protocols(anns);
        let port_name = port.name.clone().unwrap_or_default();
        let protocol = protocols
            .get(&port_name)
            .or_else(|| protocols.get(&port.port.to_string()))
            .copied();
        let spec = svc.spec.as_ref();
        let external_name = spec
            .filter(|s| s.type_.as_deref() == Some("ExternalName"))
            .and_then(|s| s.external_name.clone());

        ServicePort {
            namespace: ns.to_string(),
            name: name.to_string(),
            port: port.port as u16,
            port_name,
            external_name,
            protocol,
            circuit_breakers: annotations::circuit_breakers(anns),
        }
    }

    /// Resolves an upstream validation block. A missing or empty CA secret
    /// drops the validation rather than failing the document.
    fn ca_for(&self, ns: &str, uv: &k8s::UpstreamValidation) -> Option<UpstreamValidation> {
        let secret = self.snapshot.secrets.get(&Meta::new(ns, &uv.ca_certificate))?;
        let ca = secret_data(secret, CA_CERTIFICATE_KEY)?;
        Some(UpstreamValidation {
            ca_secret_name: uv.ca_certificate.clone(),
            ca,
            subject_name: uv.subject_name.clone(),
        })
    }

    fn tcp_proxy_for(&self, ns: &str, tp: &k8s::TcpProxy) -> Result<TcpProxyVertex, String> {
        let mut clusters = Vec::new();
        for rs in &tp.services {
            match self.cluster_for(ns, rs) {
                Ok(cluster) => clusters.push(cluster),
                Err(ServiceError::PortRange) => {
                    return Err(format!(
                        "tcpproxy: service {:?}: port must be in the range 1-65535",
                        rs.name
                    ));
                }
                Err(ServiceError::Missing) => {
                    return Err(format!(
                        "Service [{}:{}] is invalid or missing",
                        rs.name, rs.port
                    ));
                }
            }
        }
        Ok(TcpProxyVertex { clusters })
    }
}

fn secret_data(secret: &k8s::Secret, key: &str) -> Option<Vec<u8>> {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .map(|b| b.0.clone())
        .filter(|b| !b.is_empty())
}

fn timeout_policy(tp: &k8s::TimeoutPolicy) -> TimeoutPolicy {
    TimeoutPolicy {
        request: annotations::parse_timeout(&tp.request),
    }
}

fn retry_policy(rp: &k8s::RetryPolicy) -> Option<RetryPolicy> {
    if rp.count == 0 && rp.per_try_timeout.is_empty() {
        return None;
    }
    Some(RetryPolicy {
        retry_on: "5xx".to_string(),
        num_retries: rp.count,
        per_try_timeout: annotations::parse_duration(&rp.per_try_timeout),
    })
}

/// Joins an accumulated include prefix with a route's own prefix.
fn join_prefix(parent: &str, child: &str) -> String {
    let child = if child.is_empty() { "/" } else { child };
    if parent.is_empty() || parent == "/" {
        return child.to_string();
    }
    if child == "/" {
        return parent.to_string();
    }
    format!("{}{}", parent.trim_end_matches('/'), child)
}
