#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod delegation;
pub mod httpproxy;
pub mod ingressroute;
pub mod types;

pub use self::delegation::{CertificateDelegation, TLSCertificateDelegation};
pub use self::httpproxy::{Condition, HTTPProxy, Include};
pub use self::ingressroute::{Delegate, IngressRoute};
pub use self::types::{
    HealthCheck, ObjectStatus, RetryPolicy, RouteService, TcpProxy, TimeoutPolicy, Tls,
    UpstreamValidation, VirtualHost,
};

pub use k8s_openapi::{
    api::{
        core::v1::{
            EndpointAddress, EndpointPort, EndpointSubset, Endpoints, Secret, Service,
            ServicePort, ServiceSpec,
        },
        networking::v1::{
            HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
            IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
        },
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
    ByteString,
};
pub use kube::{
    api::{Api, Patch, PatchParams},
    Client, CustomResource, Resource, ResourceExt,
};

/// The well-known TLS secret type and its data keys.
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";
pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";
/// Data key marking a CA-bearing secret.
pub const CA_CERTIFICATE_KEY: &str = "ca.crt";
