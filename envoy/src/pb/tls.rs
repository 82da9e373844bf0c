//! `envoy.extensions.transport_sockets.tls.v3` and the string matcher it
//! relies on.

use super::core::DataSource;

/// `envoy.extensions.transport_sockets.tls.v3.TlsParameters`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsParameters {
    #[prost(enumeration = "tls_parameters::TlsProtocol", tag = "1")]
    pub tls_minimum_protocol_version: i32,
    #[prost(enumeration = "tls_parameters::TlsProtocol", tag = "2")]
    pub tls_maximum_protocol_version: i32,
}

pub mod tls_parameters {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum TlsProtocol {
        TlsAuto = 0,
        TlSv10 = 1,
        TlSv11 = 2,
        TlSv12 = 3,
        TlSv13 = 4,
    }
}

/// `envoy.extensions.transport_sockets.tls.v3.TlsCertificate`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsCertificate {
    #[prost(message, optional, tag = "1")]
    pub certificate_chain: ::core::option::Option<DataSource>,
    #[prost(message, optional, tag = "2")]
    pub private_key: ::core::option::Option<DataSource>,
}

/// `envoy.type.matcher.v3.StringMatcher`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringMatcher {
    #[prost(oneof = "string_matcher::MatchPattern", tags = "1")]
    pub match_pattern: ::core::option::Option<string_matcher::MatchPattern>,
}

pub mod string_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MatchPattern {
        #[prost(string, tag = "1")]
        Exact(::prost::alloc::string::String),
    }
}

/// `envoy.extensions.transport_sockets.tls.v3.CertificateValidationContext`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CertificateValidationContext {
    #[prost(message, optional, tag = "1")]
    pub trusted_ca: ::core::option::Option<DataSource>,
    #[prost(message, repeated, tag = "9")]
    pub match_subject_alt_names: ::prost::alloc::vec::Vec<StringMatcher>,
}

/// `envoy.extensions.transport_sockets.tls.v3.CommonTlsContext`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommonTlsContext {
    #[prost(message, optional, tag = "1")]
    pub tls_params: ::core::option::Option<TlsParameters>,
    #[prost(message, repeated, tag = "2")]
    pub tls_certificates: ::prost::alloc::vec::Vec<TlsCertificate>,
    #[prost(string, repeated, tag = "4")]
    pub alpn_protocols: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(oneof = "common_tls_context::ValidationContextType", tags = "3")]
    pub validation_context_type:
        ::core::option::Option<common_tls_context::ValidationContextType>,
}

pub mod common_tls_context {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ValidationContextType {
        #[prost(message, tag = "3")]
        ValidationContext(super::CertificateValidationContext),
    }
}

/// `envoy.extensions.transport_sockets.tls.v3.DownstreamTlsContext`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownstreamTlsContext {
    #[prost(message, optional, tag = "1")]
    pub common_tls_context: ::core::option::Option<CommonTlsContext>,
}

/// `envoy.extensions.transport_sockets.tls.v3.UpstreamTlsContext`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpstreamTlsContext {
    #[prost(message, optional, tag = "1")]
    pub common_tls_context: ::core::option::Option<CommonTlsContext>,
    #[prost(string, tag = "2")]
    pub sni: ::prost::alloc::string::String,
}

/// `envoy.extensions.transport_sockets.tls.v3.Secret`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Secret {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "secret::Type", tags = "2")]
    pub r#type: ::core::option::Option<secret::Type>,
}

pub mod secret {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "2")]
        TlsCertificate(super::TlsCertificate),
    }
}
