#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! The routing graph produced by the build pass and consumed by the
//! projectors. Everything here is a plain value type: a build produces a
//! fresh [`Dag`] from scratch and the previous one is dropped.

pub mod dag;
pub mod names;
pub mod policy;

pub use self::dag::{Dag, Route, Secret, SecureVirtualHost, ServicePort, TcpProxy, VirtualHost};
pub use self::policy::{
    Cluster, CircuitBreakers, HealthCheckPolicy, RetryPolicy, Timeout, TimeoutPolicy, TlsVersion,
    UpstreamProtocol, UpstreamValidation,
};
