//! `envoy.config.cluster.v3`.

use super::core;
use super::endpoint::ClusterLoadAssignment;

/// `envoy.config.cluster.v3.Cluster`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cluster {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "cluster::ClusterDiscoveryType", tags = "2")]
    pub cluster_discovery_type: ::core::option::Option<cluster::ClusterDiscoveryType>,
    #[prost(message, optional, tag = "3")]
    pub eds_cluster_config: ::core::option::Option<cluster::EdsClusterConfig>,
    #[prost(message, optional, tag = "4")]
    pub connect_timeout: ::core::option::Option<::prost_types::Duration>,
    #[prost(enumeration = "cluster::LbPolicy", tag = "6")]
    pub lb_policy: i32,
    #[prost(message, repeated, tag = "8")]
    pub health_checks: ::prost::alloc::vec::Vec<core::HealthCheck>,
    #[prost(message, optional, tag = "10")]
    pub circuit_breakers: ::core::option::Option<CircuitBreakers>,
    #[prost(message, optional, tag = "24")]
    pub transport_socket: ::core::option::Option<core::TransportSocket>,
    #[prost(message, optional, tag = "27")]
    pub common_lb_config: ::core::option::Option<cluster::CommonLbConfig>,
    #[prost(string, tag = "28")]
    pub alt_stat_name: ::prost::alloc::string::String,
    #[prost(bool, tag = "32")]
    pub ignore_health_on_host_removal: bool,
    #[prost(message, optional, tag = "33")]
    pub load_assignment: ::core::option::Option<ClusterLoadAssignment>,
}

pub mod cluster {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum DiscoveryType {
        Static = 0,
        StrictDns = 1,
        LogicalDns = 2,
        Eds = 3,
        OriginalDst = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum LbPolicy {
        RoundRobin = 0,
        LeastRequest = 1,
        RingHash = 2,
        Random = 3,
        Maglev = 5,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterDiscoveryType {
        #[prost(enumeration = "DiscoveryType", tag = "2")]
        Type(i32),
    }

    /// `envoy.config.cluster.v3.Cluster.EdsClusterConfig`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EdsClusterConfig {
        #[prost(message, optional, tag = "1")]
        pub eds_config: ::core::option::Option<super::core::ConfigSource>,
        #[prost(string, tag = "2")]
        pub service_name: ::prost::alloc::string::String,
    }

    /// `envoy.config.cluster.v3.Cluster.CommonLbConfig`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommonLbConfig {
        #[prost(message, optional, tag = "1")]
        pub healthy_panic_threshold: ::core::option::Option<super::core::Percent>,
    }
}

/// `envoy.config.cluster.v3.CircuitBreakers`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CircuitBreakers {
    #[prost(message, repeated, tag = "1")]
    pub thresholds: ::prost::alloc::vec::Vec<circuit_breakers::Thresholds>,
}

pub mod circuit_breakers {
    /// `envoy.config.cluster.v3.CircuitBreakers.Thresholds`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Thresholds {
        #[prost(message, optional, tag = "2")]
        pub max_connections: ::core::option::Option<u32>,
        #[prost(message, optional, tag = "3")]
        pub max_pending_requests: ::core::option::Option<u32>,
        #[prost(message, optional, tag = "4")]
        pub max_requests: ::core::option::Option<u32>,
        #[prost(message, optional, tag = "5")]
        pub max_retries: ::core::option::Option<u32>,
    }
}
