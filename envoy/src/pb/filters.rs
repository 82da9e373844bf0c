//! Network, HTTP, listener and access-log filter configurations.

use super::core;
use super::route::RouteConfiguration;

/// `envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpConnectionManager {
    #[prost(string, tag = "2")]
    pub stat_prefix: ::prost::alloc::string::String,
    #[prost(oneof = "http_connection_manager::RouteSpecifier", tags = "3, 4")]
    pub route_specifier: ::core::option::Option<http_connection_manager::RouteSpecifier>,
    #[prost(message, repeated, tag = "5")]
    pub http_filters: ::prost::alloc::vec::Vec<HttpFilter>,
    #[prost(message, optional, tag = "14")]
    pub use_remote_address: ::core::option::Option<bool>,
    #[prost(message, repeated, tag = "37")]
    pub access_log: ::prost::alloc::vec::Vec<AccessLog>,
}

pub mod http_connection_manager {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RouteSpecifier {
        #[prost(message, tag = "3")]
        Rds(super::Rds),
        #[prost(message, tag = "4")]
        RouteConfig(super::RouteConfiguration),
    }
}

/// `envoy.extensions.filters.network.http_connection_manager.v3.Rds`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rds {
    #[prost(message, optional, tag = "1")]
    pub config_source: ::core::option::Option<core::ConfigSource>,
    #[prost(string, tag = "2")]
    pub route_config_name: ::prost::alloc::string::String,
}

/// `envoy.extensions.filters.network.http_connection_manager.v3.HttpFilter`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpFilter {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "http_filter::ConfigType", tags = "4")]
    pub config_type: ::core::option::Option<http_filter::ConfigType>,
}

pub mod http_filter {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}

/// `envoy.extensions.filters.http.router.v3.Router`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Router {}

/// `envoy.config.accesslog.v3.AccessLog`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccessLog {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "access_log::ConfigType", tags = "4")]
    pub config_type: ::core::option::Option<access_log::ConfigType>,
}

pub mod access_log {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}

/// `envoy.extensions.access_loggers.file.v3.FileAccessLog`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileAccessLog {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
}

/// `envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TcpProxy {
    #[prost(string, tag = "1")]
    pub stat_prefix: ::prost::alloc::string::String,
    #[prost(oneof = "tcp_proxy::ClusterSpecifier", tags = "2, 10")]
    pub cluster_specifier: ::core::option::Option<tcp_proxy::ClusterSpecifier>,
    #[prost(message, repeated, tag = "5")]
    pub access_log: ::prost::alloc::vec::Vec<AccessLog>,
    #[prost(message, optional, tag = "8")]
    pub idle_timeout: ::core::option::Option<::prost_types::Duration>,
}

pub mod tcp_proxy {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterSpecifier {
        #[prost(string, tag = "2")]
        Cluster(::prost::alloc::string::String),
        #[prost(message, tag = "10")]
        WeightedClusters(WeightedCluster),
    }

    /// `envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy.WeightedCluster`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct WeightedCluster {
        #[prost(message, repeated, tag = "1")]
        pub clusters: ::prost::alloc::vec::Vec<weighted_cluster::ClusterWeight>,
    }

    pub mod weighted_cluster {
        /// `…TcpProxy.WeightedCluster.ClusterWeight`
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ClusterWeight {
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            #[prost(uint32, tag = "2")]
            pub weight: u32,
        }
    }
}

/// `envoy.extensions.filters.listener.tls_inspector.v3.TlsInspector`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsInspector {}

/// `envoy.extensions.filters.listener.proxy_protocol.v3.ProxyProtocol`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProxyProtocol {}
