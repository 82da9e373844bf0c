//! `envoy.config.route.v3`.

use super::core;

/// `envoy.config.route.v3.RouteConfiguration`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteConfiguration {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub virtual_hosts: ::prost::alloc::vec::Vec<VirtualHost>,
}

/// `envoy.config.route.v3.VirtualHost`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VirtualHost {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub domains: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "3")]
    pub routes: ::prost::alloc::vec::Vec<Route>,
}

/// `envoy.config.route.v3.Route`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Route {
    #[prost(message, optional, tag = "1")]
    pub r#match: ::core::option::Option<RouteMatch>,
    #[prost(oneof = "route::Action", tags = "2, 3")]
    pub action: ::core::option::Option<route::Action>,
    #[prost(message, repeated, tag = "10")]
    pub response_headers_to_add: ::prost::alloc::vec::Vec<core::HeaderValueOption>,
}

pub mod route {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Action {
        #[prost(message, tag = "2")]
        Route(super::RouteAction),
        #[prost(message, tag = "3")]
        Redirect(super::RedirectAction),
    }
}

/// `envoy.config.route.v3.RouteMatch`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteMatch {
    #[prost(oneof = "route_match::PathSpecifier", tags = "1, 2")]
    pub path_specifier: ::core::option::Option<route_match::PathSpecifier>,
}

pub mod route_match {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PathSpecifier {
        #[prost(string, tag = "1")]
        Prefix(::prost::alloc::string::String),
        #[prost(string, tag = "2")]
        Path(::prost::alloc::string::String),
    }
}

/// `envoy.config.route.v3.RouteAction`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteAction {
    #[prost(oneof = "route_action::ClusterSpecifier", tags = "1, 3")]
    pub cluster_specifier: ::core::option::Option<route_action::ClusterSpecifier>,
    #[prost(string, tag = "5")]
    pub prefix_rewrite: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "8")]
    pub timeout: ::core::option::Option<::prost_types::Duration>,
    #[prost(message, optional, tag = "9")]
    pub retry_policy: ::core::option::Option<RetryPolicy>,
    #[prost(message, repeated, tag = "25")]
    pub upgrade_configs: ::prost::alloc::vec::Vec<route_action::UpgradeConfig>,
}

pub mod route_action {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterSpecifier {
        #[prost(string, tag = "1")]
        Cluster(::prost::alloc::string::String),
        #[prost(message, tag = "3")]
        WeightedClusters(super::WeightedCluster),
    }

    /// `envoy.config.route.v3.RouteAction.UpgradeConfig`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpgradeConfig {
        #[prost(string, tag = "1")]
        pub upgrade_type: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "2")]
        pub enabled: ::core::option::Option<bool>,
    }
}

/// `envoy.config.route.v3.WeightedCluster`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WeightedCluster {
    #[prost(message, repeated, tag = "1")]
    pub clusters: ::prost::alloc::vec::Vec<weighted_cluster::ClusterWeight>,
}

pub mod weighted_cluster {
    /// `envoy.config.route.v3.WeightedCluster.ClusterWeight`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ClusterWeight {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "2")]
        pub weight: ::core::option::Option<u32>,
    }
}

/// `envoy.config.route.v3.RetryPolicy`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RetryPolicy {
    #[prost(string, tag = "1")]
    pub retry_on: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub num_retries: ::core::option::Option<u32>,
    #[prost(message, optional, tag = "3")]
    pub per_try_timeout: ::core::option::Option<::prost_types::Duration>,
}

/// `envoy.config.route.v3.RedirectAction`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RedirectAction {
    #[prost(oneof = "redirect_action::SchemeRewriteSpecifier", tags = "4")]
    pub scheme_rewrite_specifier:
        ::core::option::Option<redirect_action::SchemeRewriteSpecifier>,
}

pub mod redirect_action {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum SchemeRewriteSpecifier {
        #[prost(bool, tag = "4")]
        HttpsRedirect(bool),
    }
}
