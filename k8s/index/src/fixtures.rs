//! Object constructors shared by the cache and builder tests.
#![allow(dead_code)]

use gangway_k8s_api::{
    httpproxy, ingressroute, ByteString, CertificateDelegation, Condition, HTTPIngressPath,
    HTTPIngressRuleValue, HTTPProxy, Include, Ingress, IngressBackend, IngressRule,
    IngressRoute, IngressServiceBackend, IngressSpec, IngressTLS, ObjectMeta, ResourceExt,
    RouteService, Secret, Service, ServiceBackendPort, ServicePort, ServiceSpec,
    TLSCertificateDelegation, TcpProxy, Tls, VirtualHost,
};

pub fn meta(ns: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        namespace: Some(ns.to_string()),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn annotated<T: ResourceExt>(mut obj: T, key: &str, value: &str) -> T {
    obj.annotations_mut()
        .insert(key.to_string(), value.to_string());
    obj
}

pub fn service(ns: &str, name: &str, port: i32) -> Service {
    service_with(ns, name, vec![port_spec("http", port)])
}

pub fn service_with(ns: &str, name: &str, ports: Vec<ServicePort>) -> Service {
    Service {
        metadata: meta(ns, name),
        spec: Some(ServiceSpec {
            ports: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn port_spec(name: &str, port: i32) -> ServicePort {
    ServicePort {
        name: if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        },
        protocol: Some("TCP".to_string()),
        port,
        ..Default::default()
    }
}

pub fn external_name_service(ns: &str, name: &str, dns: &str, port: i32) -> Service {
    let mut svc = service_with(ns, name, vec![port_spec("", port)]);
    let spec = svc.spec.as_mut().unwrap();
    spec.type_ = Some("ExternalName".to_string());
    spec.external_name = Some(dns.to_string());
    svc
}

pub fn tls_secret(ns: &str, name: &str, cert: &str, key: &str) -> Secret {
    Secret {
        metadata: meta(ns, name),
        type_: Some("kubernetes.io/tls".to_string()),
        data: Some(
            [
                ("tls.crt".to_string(), ByteString(cert.as_bytes().to_vec())),
                ("tls.key".to_string(), ByteString(key.as_bytes().to_vec())),
            ]
            .into_iter()
            .collect(),
        ),
        ..Default::default()
    }
}

pub fn ca_secret(ns: &str, name: &str) -> Secret {
    Secret {
        metadata: meta(ns, name),
        data: Some(
            [("ca.crt".to_string(), ByteString(b"ca".to_vec()))]
                .into_iter()
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn ingress(ns: &str, name: &str) -> Ingress {
    Ingress {
        metadata: meta(ns, name),
        ..Default::default()
    }
}

pub fn backend(name: &str, port: i32) -> IngressBackend {
    IngressBackend {
        service: Some(IngressServiceBackend {
            name: name.to_string(),
            port: Some(ServiceBackendPort {
                number: Some(port),
                name: None,
            }),
        }),
        ..Default::default()
    }
}

pub fn named_backend(name: &str, port_name: &str) -> IngressBackend {
    IngressBackend {
        service: Some(IngressServiceBackend {
            name: name.to_string(),
            port: Some(ServiceBackendPort {
                number: None,
                name: Some(port_name.to_string()),
            }),
        }),
        ..Default::default()
    }
}

pub fn ingress_default_backend(ns: &str, name: &str, svc: &str, port: i32) -> Ingress {
    Ingress {
        metadata: meta(ns, name),
        spec: Some(IngressSpec {
            default_backend: Some(backend(svc, port)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn ingress_rule(host: &str, paths: Vec<(&str, IngressBackend)>) -> IngressRule {
    IngressRule {
        host: if host.is_empty() {
            None
        } else {
            Some(host.to_string())
        },
        http: Some(HTTPIngressRuleValue {
            paths: paths
                .into_iter()
                .map(|(path, backend)| HTTPIngressPath {
                    path: if path.is_empty() {
                        None
                    } else {
                        Some(path.to_string())
                    },
                    path_type: "Prefix".to_string(),
                    backend,
                })
                .collect(),
        }),
    }
}

pub fn ingress_with_rules(ns: &str, name: &str, rules: Vec<IngressRule>) -> Ingress {
    Ingress {
        metadata: meta(ns, name),
        spec: Some(IngressSpec {
            rules: Some(rules),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// An ingress whose TLS block references `secret` without declaring any
/// rules; enough for relevance tests.
pub fn ingress_tls(ns: &str, name: &str, secret: &str) -> Ingress {
    Ingress {
        metadata: meta(ns, name),
        spec: Some(IngressSpec {
            tls: Some(vec![IngressTLS {
                hosts: None,
                secret_name: Some(secret.to_string()),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn with_tls(mut ingress: Ingress, host: &str, secret: &str) -> Ingress {
    let spec = ingress.spec.get_or_insert_with(Default::default);
    spec.tls.get_or_insert_with(Vec::new).push(IngressTLS {
        hosts: Some(vec![host.to_string()]),
        secret_name: Some(secret.to_string()),
    });
    ingress
}

pub fn route_service(name: &str, port: i32) -> RouteService {
    RouteService {
        name: name.to_string(),
        port,
        ..Default::default()
    }
}

pub fn ingressroute(ns: &str, name: &str) -> IngressRoute {
    IngressRoute::new(name, ingressroute::IngressRouteSpec {
        virtual_host: None,
        routes: Vec::new(),
        tcp_proxy: None,
    })
    .within(ns)
}

pub fn ir_route(prefix: &str, services: Vec<RouteService>) -> ingressroute::Route {
    ingressroute::Route {
        match_prefix: prefix.to_string(),
        services,
        ..Default::default()
    }
}

pub fn ir_delegate_route(prefix: &str, name: &str, namespace: &str) -> ingressroute::Route {
    ingressroute::Route {
        match_prefix: prefix.to_string(),
        delegate: Some(ingressroute::Delegate {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }),
        ..Default::default()
    }
}

pub fn ingressroute_with(
    ns: &str,
    name: &str,
    vhost: Option<VirtualHost>,
    routes: Vec<ingressroute::Route>,
) -> IngressRoute {
    IngressRoute::new(name, ingressroute::IngressRouteSpec {
        virtual_host: vhost,
        routes,
        tcp_proxy: None,
    })
    .within(ns)
}

pub fn vhost(fqdn: &str) -> Option<VirtualHost> {
    Some(VirtualHost {
        fqdn: fqdn.to_string(),
        tls: None,
    })
}

pub fn vhost_tls(fqdn: &str, secret: &str) -> Option<VirtualHost> {
    Some(VirtualHost {
        fqdn: fqdn.to_string(),
        tls: Some(Tls {
            secret_name: secret.to_string(),
            ..Default::default()
        }),
    })
}

pub fn ingressroute_root(ns: &str, name: &str, fqdn: &str, routes: Vec<ingressroute::Route>) -> IngressRoute {
    ingressroute_with(ns, name, vhost(fqdn), routes)
}

pub fn ingressroute_tls(ns: &str, name: &str, fqdn: &str, secret: &str) -> IngressRoute {
    ingressroute_with(ns, name, vhost_tls(fqdn, secret), Vec::new())
}

pub fn ingressroute_service(ns: &str, name: &str, svc: &str, port: i32) -> IngressRoute {
    ingressroute_with(ns, name, None, vec![ir_route("/", vec![route_service(svc, port)])])
}

pub fn ingressroute_tcpproxy(ns: &str, name: &str, svc: &str, port: i32) -> IngressRoute {
    IngressRoute::new(name, ingressroute::IngressRouteSpec {
        virtual_host: None,
        routes: Vec::new(),
        tcp_proxy: Some(TcpProxy {
            services: vec![route_service(svc, port)],
        }),
    })
    .within(ns)
}

pub fn httpproxy(ns: &str, name: &str) -> HTTPProxy {
    HTTPProxy::new(name, httpproxy::HTTPProxySpec {
        virtual_host: None,
        includes: Vec::new(),
        routes: Vec::new(),
        tcp_proxy: None,
    })
    .within(ns)
}

pub fn proxy_route(prefix: &str, services: Vec<RouteService>) -> httpproxy::Route {
    httpproxy::Route {
        condition: if prefix.is_empty() {
            None
        } else {
            Some(Condition {
                prefix: prefix.to_string(),
            })
        },
        services,
        ..Default::default()
    }
}

pub fn include(name: &str, namespace: &str, prefix: &str) -> Include {
    Include {
        name: name.to_string(),
        namespace: namespace.to_string(),
        condition: Condition {
            prefix: prefix.to_string(),
        },
    }
}

pub fn httpproxy_with(
    ns: &str,
    name: &str,
    vhost: Option<VirtualHost>,
    includes: Vec<Include>,
    routes: Vec<httpproxy::Route>,
) -> HTTPProxy {
    HTTPProxy::new(name, httpproxy::HTTPProxySpec {
        virtual_host: vhost,
        includes,
        routes,
        tcp_proxy: None,
    })
    .within(ns)
}

pub fn httpproxy_tls(ns: &str, name: &str, fqdn: &str, secret: &str) -> HTTPProxy {
    httpproxy_with(ns, name, vhost_tls(fqdn, secret), Vec::new(), Vec::new())
}

pub fn httpproxy_service(ns: &str, name: &str, svc: &str, port: i32) -> HTTPProxy {
    httpproxy_with(
        ns,
        name,
        None,
        Vec::new(),
        vec![proxy_route("", vec![route_service(svc, port)])],
    )
}

pub fn delegation(ns: &str, name: &str, secret: &str, targets: &[&str]) -> TLSCertificateDelegation {
    TLSCertificateDelegation::new(
        name,
        gangway_k8s_api::delegation::TLSCertificateDelegationSpec {
            delegations: vec![CertificateDelegation {
                secret_name: secret.to_string(),
                target_namespaces: targets.iter().map(|s| s.to_string()).collect(),
            }],
        },
    )
    .within(ns)
}

/// Sets the namespace on a CRD object built with `::new`.
pub trait Within: Sized {
    fn within(self, ns: &str) -> Self;
}

impl<T: ResourceExt> Within for T {
    fn within(mut self, ns: &str) -> Self {
        self.meta_mut().namespace = Some(ns.to_string());
        self
    }
}
